//! Hashed bag-of-words embedder.
//!
//! Each lowercase alphanumeric token is hashed with XxHash64 (seed 0) into one
//! of `dim` buckets and counted. Vectors are deterministic across runs and
//! processes, so an index rebuilt from the same corpus is identical.

use std::hash::Hasher;

use ndarray::Array1;
use twox_hash::XxHash64;

use crate::embedder::EmbedderBackend;

pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    fn bucket(&self, token: &str) -> usize {
        let mut hasher = XxHash64::with_seed(0);
        hasher.write(token.as_bytes());
        (hasher.finish() % self.dim as u64) as usize
    }
}

/// Lowercase alphanumeric tokens of `text`.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

impl EmbedderBackend for HashEmbedder {
    fn embed(&self, text: &str) -> Option<Array1<f32>> {
        let mut v = Array1::zeros(self.dim);
        for token in tokenize(text) {
            v[self.bucket(&token)] += 1.0;
        }
        Some(v)
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn is_available(&self) -> bool {
        true
    }
}
