//! Helpdesk Infer: embedding backends for the retrieval engine.
//!
//! Provides the `EmbedderBackend` trait for generating embeddings.
//! When the `onnx` feature is enabled and model files are present,
//! `OnnxEmbedder` loads all-MiniLM-L6-v2 for 384-dim embeddings.
//! `HashEmbedder` gives deterministic offline vectors. Without either,
//! `NoopEmbedder` is used and retrieval runs in keyword mode.

pub mod embedder;
pub mod hashing;
pub mod onnx_embedder;

pub use embedder::{EmbedderBackend, NoopEmbedder};
pub use hashing::HashEmbedder;

#[cfg(feature = "onnx")]
pub use onnx_embedder::OnnxEmbedder;

use std::path::Path;
use std::sync::Arc;

use helpdesk_core::EmbedderKind;

/// Dimension of all-MiniLM-L6-v2 sentence embeddings.
pub const DEFAULT_DIM: usize = 384;

/// Create the requested embedder.
///
/// `Onnx` tries the model in `model_dir` (if the feature is enabled and the
/// files are present) and falls back to `NoopEmbedder`.
pub fn create_embedder(kind: EmbedderKind, model_dir: &Path) -> Arc<dyn EmbedderBackend> {
    match kind {
        EmbedderKind::Hash => {
            tracing::info!("Using hashed bag-of-words embedder (dim={})", DEFAULT_DIM);
            Arc::new(HashEmbedder::new(DEFAULT_DIM))
        }
        EmbedderKind::None => {
            tracing::info!("Embeddings disabled. Retrieval will use keyword matching.");
            Arc::new(NoopEmbedder::new(DEFAULT_DIM))
        }
        EmbedderKind::Onnx => create_onnx_embedder(model_dir),
    }
}

fn create_onnx_embedder(model_dir: &Path) -> Arc<dyn EmbedderBackend> {
    #[cfg(feature = "onnx")]
    {
        match OnnxEmbedder::load(model_dir) {
            Ok(embedder) => {
                tracing::info!("Using ONNX embedder (dim={})", embedder.dimension());
                return Arc::new(embedder);
            }
            Err(e) => {
                tracing::warn!("ONNX embedder unavailable: {}. Falling back to keyword retrieval.", e);
            }
        }
    }

    #[cfg(not(feature = "onnx"))]
    {
        let _ = model_dir;
        tracing::info!("ONNX feature disabled. Falling back to keyword retrieval.");
    }

    Arc::new(NoopEmbedder::new(DEFAULT_DIM))
}
