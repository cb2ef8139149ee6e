//! Generative oracle backed by external LLM APIs (OpenAI/Anthropic/Groq/Gemini).
//!
//! The helpdesk only needs text in, text out: providers stream tokens over SSE
//! and `LlmOracle` concatenates them into a single completion.

pub mod config;
pub mod oracle;
pub mod providers;
pub mod types;

pub use config::LLMConfig;
pub use oracle::{create_oracle, LlmOracle, Oracle};
pub use types::LLMProvider;
