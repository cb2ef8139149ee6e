//! Free-form replies from the generative oracle.

use std::sync::Arc;

use helpdesk_core::{Error, Result};
use helpdesk_llm::Oracle;

pub fn fallback_prompt(text: &str) -> String {
    format!(
        "You are a helpful customer support assistant. Answer concisely.\n\nUser: {}\nAssistant:",
        text
    )
}

pub struct FallbackHandler {
    oracle: Option<Arc<dyn Oracle>>,
}

impl FallbackHandler {
    pub fn new(oracle: Option<Arc<dyn Oracle>>) -> Self {
        Self { oracle }
    }

    /// Trimmed oracle completion. No retry.
    pub async fn generate_fallback_reply(&self, text: &str) -> Result<String> {
        let oracle = self
            .oracle
            .as_ref()
            .ok_or_else(|| Error::Oracle("no LLM provider is configured".into()))?;
        let completion = oracle.complete(&fallback_prompt(text)).await?;
        Ok(completion.trim().to_string())
    }
}
