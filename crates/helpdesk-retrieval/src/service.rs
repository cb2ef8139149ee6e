//! Owner of both retrieval indexes.

use std::sync::Arc;

use helpdesk_core::{DataPaths, Result};
use helpdesk_infer::EmbedderBackend;
use once_cell::sync::OnceCell;
use tracing::info;

use crate::corpus::{FaqCorpus, ProductCorpus};
use crate::faq::FaqHandler;
use crate::recommend::RecommendationHandler;

/// Corpora plus lazily built handlers. Each handler is built at most once,
/// even when first requested from several threads at the same time.
pub struct RetrievalService {
    embedder: Arc<dyn EmbedderBackend>,
    faq_corpus: Arc<FaqCorpus>,
    product_corpus: Arc<ProductCorpus>,
    faq: OnceCell<FaqHandler>,
    recommender: OnceCell<RecommendationHandler>,
}

impl RetrievalService {
    pub fn new(
        faq_corpus: FaqCorpus,
        product_corpus: ProductCorpus,
        embedder: Arc<dyn EmbedderBackend>,
    ) -> Self {
        Self {
            embedder,
            faq_corpus: Arc::new(faq_corpus),
            product_corpus: Arc::new(product_corpus),
            faq: OnceCell::new(),
            recommender: OnceCell::new(),
        }
    }

    /// Load both corpora from the data directory. Either file missing or malformed is an error.
    pub fn load(paths: &DataPaths, embedder: Arc<dyn EmbedderBackend>) -> Result<Self> {
        let faq = FaqCorpus::load_faq(&paths.faq_file)?;
        let products = ProductCorpus::load_products(&paths.products_file)?;
        Ok(Self::new(faq, products, embedder))
    }

    pub fn faq(&self) -> &FaqHandler {
        self.faq.get_or_init(|| {
            info!("Building FAQ index ({} entries)", self.faq_corpus.len());
            FaqHandler::build(self.faq_corpus.clone(), self.embedder.clone())
        })
    }

    pub fn recommender(&self) -> &RecommendationHandler {
        self.recommender.get_or_init(|| {
            info!("Building product index ({} entries)", self.product_corpus.len());
            RecommendationHandler::build(self.product_corpus.clone(), self.embedder.clone())
        })
    }

    /// Build both indexes now instead of on first use.
    pub fn warm(&self) {
        self.faq();
        self.recommender();
    }

    pub fn embedder_available(&self) -> bool {
        self.embedder.is_available()
    }

    pub fn faq_len(&self) -> usize {
        self.faq_corpus.len()
    }

    pub fn product_len(&self) -> usize {
        self.product_corpus.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Product;
    use crate::test_support::ScriptedEmbedder;
    use helpdesk_core::Error;
    use helpdesk_infer::HashEmbedder;

    #[test]
    fn test_faq_index_built_once_under_contention() {
        let embedder = Arc::new(
            ScriptedEmbedder::new(2)
                .with("return policy", &[1.0, 0.0])
                .with("shipping time", &[0.0, 1.0]),
        );
        let service = Arc::new(RetrievalService::new(
            FaqCorpus::faq([("return policy", "30 days"), ("shipping time", "3-5 days")]),
            ProductCorpus::products(Vec::<Product>::new()),
            embedder.clone(),
        ));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = service.clone();
                std::thread::spawn(move || service.faq().answer("return policy").to_string())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), "30 days");
        }
        assert_eq!(embedder.batch_calls(), 1);

        service.warm();
        assert_eq!(embedder.batch_calls(), 1);
    }

    #[test]
    fn test_load_from_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("faq.json"), r#"{"warranty": "1 year"}"#).unwrap();
        std::fs::write(
            dir.path().join("products.json"),
            r#"[{"title": "Outdoor Speaker", "description": "Rugged"}]"#,
        )
        .unwrap();
        let paths = DataPaths::new(dir.path()).unwrap();

        let service = RetrievalService::load(&paths, Arc::new(HashEmbedder::new(64))).unwrap();
        assert!(service.embedder_available());
        assert_eq!(service.faq_len(), 1);
        assert_eq!(service.product_len(), 1);
        assert_eq!(service.faq().answer("warranty"), "1 year");
        assert_eq!(service.recommender().recommend("speaker", 3).len(), 1);
    }

    #[test]
    fn test_load_missing_corpus_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("faq.json"), r#"{"warranty": "1 year"}"#).unwrap();
        let paths = DataPaths::new(dir.path()).unwrap();
        let err = RetrievalService::load(&paths, Arc::new(HashEmbedder::new(64)))
            .err()
            .unwrap();
        assert!(matches!(err, Error::Corpus(_)));
    }
}
