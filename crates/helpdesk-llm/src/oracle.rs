//! The generative oracle: one prompt in, one completion out.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use helpdesk_core::{ChatMessage, Error, Result};
use reqwest::Client;
use tracing::{info, warn};

use crate::config::{LLMConfig, ResolvedProvider};
use crate::providers::{collect_completion, stream_llm};

/// Opaque text-to-text capability used for intent classification and fallback replies.
pub trait Oracle: Send + Sync {
    /// Complete `prompt`. Network failures, timeouts and provider errors are `Error::Oracle`.
    fn complete<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String>>;

    /// Short `provider/model` label for status output.
    fn label(&self) -> String;
}

/// Oracle backed by one external LLM provider.
pub struct LlmOracle {
    client: Client,
    target: ResolvedProvider,
    temperature: f64,
    max_tokens: usize,
}

impl LlmOracle {
    pub const DEFAULT_MAX_TOKENS: usize = 512;

    pub fn new(target: ResolvedProvider, temperature: f64, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self {
            client,
            target,
            temperature,
            max_tokens: Self::DEFAULT_MAX_TOKENS,
        })
    }
}

impl Oracle for LlmOracle {
    fn complete<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String>> {
        async move {
            let messages = [ChatMessage::user(prompt)];
            let stream = stream_llm(
                &self.client,
                &self.target,
                &messages,
                self.temperature,
                self.max_tokens,
            );
            collect_completion(stream).await.map_err(Error::Oracle)
        }
        .boxed()
    }

    fn label(&self) -> String {
        format!("{}/{}", self.target.provider, self.target.model)
    }
}

/// Build an oracle from the LLM config, or `None` when no provider has credentials.
pub fn create_oracle(config: &LLMConfig, timeout: Duration) -> Option<Arc<dyn Oracle>> {
    let Some(target) = config.resolve_provider() else {
        warn!("No LLM provider configured. Classification beyond keywords and fallback replies are unavailable.");
        return None;
    };

    match LlmOracle::new(target, config.temperature, timeout) {
        Ok(oracle) => {
            info!("Using LLM oracle {}", oracle.label());
            Some(Arc::new(oracle))
        }
        Err(e) => {
            warn!("Failed to build LLM client: {}", e);
            None
        }
    }
}
