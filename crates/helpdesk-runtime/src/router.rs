//! Intent router: keyword cascade first, oracle only when no keyword rule matched.

use std::sync::Arc;

use helpdesk_core::{Error, Result};
use helpdesk_llm::Oracle;
use tracing::debug;

use crate::intent::{classification_prompt, classify_heuristic, parse_label};
use crate::types::Intent;

pub struct IntentRouter {
    oracle: Option<Arc<dyn Oracle>>,
}

impl IntentRouter {
    pub fn new(oracle: Option<Arc<dyn Oracle>>) -> Self {
        Self { oracle }
    }

    /// Classify one message. Oracle failures are `Error::Classification`.
    pub async fn classify(&self, text: &str) -> Result<Intent> {
        if let Some(intent) = classify_heuristic(text) {
            debug!("Keyword route: {}", intent);
            return Ok(intent);
        }

        let Some(oracle) = &self.oracle else {
            return Err(Error::Classification(
                "no keyword matched and no LLM provider is configured".into(),
            ));
        };

        let reply = oracle
            .complete(&classification_prompt(text))
            .await
            .map_err(|e| match e {
                Error::Oracle(msg) => Error::Classification(msg),
                other => Error::Classification(other.to_string()),
            })?;
        let intent = parse_label(&reply)?;
        debug!("Oracle route: {} (raw {:?})", intent, reply.trim());
        Ok(intent)
    }
}
