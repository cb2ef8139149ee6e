//! Error types for the helpdesk workspace.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Corpus error: {0}")]
    Corpus(String),

    #[error("Classification failed: {0}")]
    Classification(String),

    #[error("Oracle error: {0}")]
    Oracle(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(String),
}

impl Error {
    /// Whether the failure came from the external generative oracle.
    pub fn is_oracle_failure(&self) -> bool {
        matches!(self, Error::Classification(_) | Error::Oracle(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
