//! Order records and the store interface.

use helpdesk_core::Result;
use serde::{Deserialize, Serialize};

/// Status of a single order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatus {
    pub order_id: String,
    pub status: String,
    pub eta: String,
    pub items: String,
}

impl OrderStatus {
    pub fn new(
        order_id: impl Into<String>,
        status: impl Into<String>,
        eta: impl Into<String>,
        items: impl Into<String>,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            status: status.into(),
            eta: eta.into(),
            items: items.into(),
        }
    }
}

/// Keyed order lookup.
///
/// `Ok(None)` is an unknown order; `Err` means the store itself failed.
pub trait OrderStore: Send + Sync {
    fn get(&self, order_id: &str) -> Result<Option<OrderStatus>>;
}
