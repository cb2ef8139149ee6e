use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use helpdesk_infer::embedder::EmbedderBackend;
use ndarray::Array1;

/// Embedder with hand-picked vectors, for exact score assertions.
/// Texts without a scripted vector fail to embed.
pub struct ScriptedEmbedder {
    dim: usize,
    vectors: HashMap<String, Vec<f32>>,
    batch_calls: AtomicUsize,
}

impl ScriptedEmbedder {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            vectors: HashMap::new(),
            batch_calls: AtomicUsize::new(0),
        }
    }

    pub fn with(mut self, text: &str, vector: &[f32]) -> Self {
        self.vectors.insert(text.to_string(), vector.to_vec());
        self
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }
}

impl EmbedderBackend for ScriptedEmbedder {
    fn embed(&self, text: &str) -> Option<Array1<f32>> {
        self.vectors.get(text).map(|v| Array1::from(v.clone()))
    }

    fn embed_batch(&self, texts: &[&str]) -> Vec<Option<Array1<f32>>> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn is_available(&self) -> bool {
        true
    }
}
