//! Helpdesk Runtime: intent routing and the support agent.
//!
//! Each user message goes through `Start → Intent → Handler → End`: the
//! router classifies it (keywords first, oracle last), exactly one handler
//! produces the reply, and the agent returns it with the chosen intent.

pub mod agent;
pub mod fallback;
pub mod intent;
pub mod orders;
pub mod router;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use agent::SupportAgent;
pub use fallback::FallbackHandler;
pub use intent::{classify_heuristic, parse_label};
pub use orders::{extract_order_id, OrderHandler};
pub use router::IntentRouter;
pub use types::*;
