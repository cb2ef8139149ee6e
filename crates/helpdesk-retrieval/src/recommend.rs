//! Product recommendation: top-k retrieval, no confidence filtering.

use std::sync::Arc;

use helpdesk_infer::EmbedderBackend;
use tracing::debug;

use crate::corpus::{Product, ProductCorpus};
use crate::index::RetrievalIndex;

pub const NO_PRODUCT_MATCH: &str =
    "I couldn't find product matches. Could you share what you want (budget, category)?";

pub struct RecommendationHandler {
    index: RetrievalIndex<Product>,
}

impl RecommendationHandler {
    pub fn build(corpus: Arc<ProductCorpus>, embedder: Arc<dyn EmbedderBackend>) -> Self {
        Self {
            index: RetrievalIndex::build(corpus, embedder),
        }
    }

    /// Up to `top_k` products, best first (corpus order in keyword mode).
    pub fn recommend(&self, query: &str, top_k: usize) -> Vec<&Product> {
        let products: Vec<&Product> = self
            .index
            .query(query, top_k)
            .iter()
            .filter_map(|r| self.index.get(r))
            .map(|e| &e.payload)
            .collect();
        debug!("Recommending {} products", products.len());
        products
    }

    pub fn index(&self) -> &RetrievalIndex<Product> {
        &self.index
    }
}

/// Reply text for a recommendation list.
pub fn format_recommendations(products: &[&Product]) -> String {
    if products.is_empty() {
        return NO_PRODUCT_MATCH.to_string();
    }
    let mut reply = String::from("Here are product suggestions:");
    for p in products {
        reply.push_str(&format!("\n- {}: {}", p.title, p.description));
    }
    reply
}
