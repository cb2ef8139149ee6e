//! Helpdesk Retrieval: one index engine shared by FAQ answering and product
//! recommendation.
//!
//! `RetrievalIndex` embeds a corpus once into a normalized matrix and answers
//! top-k cosine queries. Without a usable embedder it degrades to a keyword
//! scan over the corpus text. `RetrievalService` owns both indexes and builds
//! each at most once.

pub mod corpus;
pub mod faq;
pub mod index;
pub mod recommend;
pub mod service;

#[cfg(test)]
pub(crate) mod test_support;

pub use corpus::{Corpus, CorpusEntry, FaqCorpus, Product, ProductCorpus, ProductId};
pub use faq::{FaqHandler, FaqMatch, FAQ_CONFIDENCE_THRESHOLD, NO_FAQ_MATCH};
pub use index::{RetrievalIndex, RetrievalResult};
pub use recommend::{format_recommendations, RecommendationHandler, NO_PRODUCT_MATCH};
pub use service::RetrievalService;
