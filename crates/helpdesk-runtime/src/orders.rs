//! Order status replies.

use std::sync::Arc;

use helpdesk_core::Result;
use helpdesk_store::OrderStore;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// A standalone run of 4 to 10 digits.
static ORDER_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{4,10})\b").unwrap());

pub const ORDER_ID_PROMPT: &str =
    "Please provide your order ID (e.g. 12345) so I can check the status.";

/// First order id in `text`, if any.
pub fn extract_order_id(text: &str) -> Option<&str> {
    ORDER_ID_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

pub struct OrderHandler {
    store: Arc<dyn OrderStore>,
}

impl OrderHandler {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self { store }
    }

    /// Store failures propagate. An unknown id is a normal reply.
    pub fn reply(&self, text: &str) -> Result<String> {
        let Some(order_id) = extract_order_id(text) else {
            return Ok(ORDER_ID_PROMPT.to_string());
        };
        debug!("Looking up order {}", order_id);

        Ok(match self.store.get(order_id)? {
            Some(order) => format!(
                "Order {}: status={}. Expected delivery: {}. Items: {}.",
                order_id, order.status, order.eta, order.items
            ),
            None => format!("Order {} not found. Please verify your order id.", order_id),
        })
    }
}
