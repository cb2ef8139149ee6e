//! Helpdesk Core: configuration, error type, chat message model.

pub mod config;
pub mod error;
pub mod message;

pub use config::{DataPaths, EmbedderKind, HelpdeskConfig};
pub use error::{Error, Result};
pub use message::{last_user_text, ChatMessage, Role};
