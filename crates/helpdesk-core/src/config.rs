//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

/// Paths to the helpdesk data files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// FAQ corpus: question phrase → answer (`data/faq.json`).
    pub faq_file: PathBuf,
    /// Product corpus: array of product records (`data/products.json`).
    pub products_file: PathBuf,
    /// Order store directory (`data/orders/`).
    pub orders: PathBuf,
    /// Embedding model directory (`data/models/`).
    pub models: PathBuf,
    /// LLM configuration (`data/llm-config.json`).
    pub llm_config_file: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates the order store directory if needed.
    ///
    /// Corpus files are never created here: a missing corpus must fail at load time.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let paths = Self {
            faq_file: root.join("faq.json"),
            products_file: root.join("products.json"),
            orders: root.join("orders"),
            models: root.join("models"),
            llm_config_file: root.join("llm-config.json"),
            root,
        };
        std::fs::create_dir_all(&paths.orders)?;
        Ok(paths)
    }
}

/// Which embedding backend to start with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedderKind {
    /// ONNX all-MiniLM-L6-v2, falls back to `None` when the model is missing.
    Onnx,
    /// Deterministic hashed bag-of-words vectors.
    Hash,
    /// No embeddings: retrieval runs in keyword mode.
    None,
}

impl EmbedderKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "onnx" => Some(Self::Onnx),
            "hash" => Some(Self::Hash),
            "none" | "off" | "keyword" => Some(Self::None),
            _ => None,
        }
    }
}

impl std::fmt::Display for EmbedderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Onnx => write!(f, "onnx"),
            Self::Hash => write!(f, "hash"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Top-level helpdesk configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelpdeskConfig {
    /// HTTP server port.
    pub port: u16,
    /// Data directory paths.
    pub data_paths: DataPaths,
    /// Embedding backend selection.
    pub embedder: EmbedderKind,
    /// Default number of product suggestions.
    pub default_top_k: usize,
    /// Upper bound on a single oracle call.
    pub oracle_timeout: Duration,
}

impl HelpdeskConfig {
    pub const DEFAULT_PORT: u16 = 3004;
    pub const DEFAULT_TOP_K: usize = 3;

    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(Self::DEFAULT_PORT);

        let embedder = match std::env::var("HELPDESK_EMBEDDER") {
            Ok(v) => EmbedderKind::parse(&v).unwrap_or_else(|| {
                warn!("Unknown HELPDESK_EMBEDDER={:?}, using onnx", v);
                EmbedderKind::Onnx
            }),
            Err(_) => EmbedderKind::Onnx,
        };

        let default_top_k = std::env::var("HELPDESK_TOP_K")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|k: &usize| *k > 0)
            .unwrap_or(Self::DEFAULT_TOP_K);

        let oracle_timeout = std::env::var("HELPDESK_ORACLE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        let data_paths = DataPaths::new(data_dir)?;

        Ok(Self {
            port,
            data_paths,
            embedder,
            default_top_k,
            oracle_timeout,
        })
    }
}
