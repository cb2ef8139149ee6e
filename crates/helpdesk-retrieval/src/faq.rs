//! FAQ answering: semantic match with a confidence threshold, then literal key match.

use std::sync::Arc;

use helpdesk_infer::EmbedderBackend;
use serde::Serialize;
use tracing::debug;

use crate::corpus::FaqCorpus;
use crate::index::RetrievalIndex;

/// Minimum cosine similarity for a semantic FAQ hit.
pub const FAQ_CONFIDENCE_THRESHOLD: f32 = 0.5;

pub const NO_FAQ_MATCH: &str = "I don't have an exact FAQ match for that.";

/// How a query was resolved against the FAQ corpus.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FaqMatch {
    Semantic { index: usize, score: f32 },
    Substring { index: usize },
    NotFound,
}

pub struct FaqHandler {
    index: RetrievalIndex<String>,
}

impl FaqHandler {
    pub fn build(corpus: Arc<FaqCorpus>, embedder: Arc<dyn EmbedderBackend>) -> Self {
        Self {
            index: RetrievalIndex::build(corpus, embedder),
        }
    }

    pub fn lookup(&self, query: &str) -> FaqMatch {
        if let Some(top) = self.index.query(query, 1).first() {
            match top.score {
                Some(score) if score >= FAQ_CONFIDENCE_THRESHOLD => {
                    debug!("FAQ semantic hit {} (score {:.3})", top.corpus_index, score);
                    return FaqMatch::Semantic {
                        index: top.corpus_index,
                        score,
                    };
                }
                Some(score) => debug!("FAQ best score {:.3} below threshold", score),
                None => {}
            }
        }

        let lowered = query.to_lowercase();
        self.index
            .corpus()
            .entries()
            .iter()
            .position(|e| lowered.contains(e.key.as_str()))
            .map_or(FaqMatch::NotFound, |index| FaqMatch::Substring { index })
    }

    /// The answer for `query`, or the fixed no-match reply. Never fails.
    pub fn answer(&self, query: &str) -> &str {
        let index = match self.lookup(query) {
            FaqMatch::Semantic { index, .. } | FaqMatch::Substring { index } => index,
            FaqMatch::NotFound => return NO_FAQ_MATCH,
        };
        self.index
            .corpus()
            .get(index)
            .map_or(NO_FAQ_MATCH, |e| e.payload.as_str())
    }

    pub fn index(&self) -> &RetrievalIndex<String> {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedEmbedder;
    use helpdesk_infer::NoopEmbedder;

    fn faq_corpus() -> Arc<FaqCorpus> {
        Arc::new(FaqCorpus::faq([
            ("return policy", "You can return items within 30 days."),
            ("shipping time", "Orders ship within 3-5 business days."),
        ]))
    }

    fn scripted() -> ScriptedEmbedder {
        ScriptedEmbedder::new(2)
            .with("return policy", &[1.0, 0.0])
            .with("shipping time", &[0.0, 1.0])
    }

    #[test]
    fn test_confident_semantic_match() {
        let embedder = scripted().with("can I send it back", &[0.9, 0.1]);
        let handler = FaqHandler::build(faq_corpus(), Arc::new(embedder));

        match handler.lookup("can I send it back") {
            FaqMatch::Semantic { index, score } => {
                assert_eq!(index, 0);
                assert!(score >= FAQ_CONFIDENCE_THRESHOLD);
            }
            other => panic!("expected semantic match, got {:?}", other),
        }
        assert_eq!(
            handler.answer("can I send it back"),
            "You can return items within 30 days."
        );
    }

    #[test]
    fn test_score_at_threshold_is_accepted() {
        // Normalized query is [0.5, -0.5, 0.5, 0.5]: cosine with "return policy" is exactly 0.5.
        let embedder = ScriptedEmbedder::new(4)
            .with("return policy", &[1.0, 0.0, 0.0, 0.0])
            .with("shipping time", &[0.0, 1.0, 0.0, 0.0])
            .with("can I send it back", &[1.0, -1.0, 1.0, 1.0]);
        let handler = FaqHandler::build(faq_corpus(), Arc::new(embedder));

        assert_eq!(
            handler.lookup("can I send it back"),
            FaqMatch::Semantic {
                index: 0,
                score: FAQ_CONFIDENCE_THRESHOLD
            }
        );
        assert_eq!(
            handler.answer("can I send it back"),
            "You can return items within 30 days."
        );
    }

    #[test]
    fn test_low_score_falls_back_to_key_substring() {
        // Best semantic hit is "shipping time" at ~0.447.
        let embedder = scripted().with("What is your Return Policy?", &[-0.6, 0.3]);
        let handler = FaqHandler::build(faq_corpus(), Arc::new(embedder));

        assert_eq!(
            handler.lookup("What is your Return Policy?"),
            FaqMatch::Substring { index: 0 }
        );
        assert_eq!(
            handler.answer("What is your Return Policy?"),
            "You can return items within 30 days."
        );
    }

    #[test]
    fn test_not_found() {
        let embedder = scripted().with("hello there", &[0.0, 0.0]);
        let handler = FaqHandler::build(faq_corpus(), Arc::new(embedder));
        assert_eq!(handler.lookup("hello there"), FaqMatch::NotFound);
        assert_eq!(handler.answer("hello there"), NO_FAQ_MATCH);
    }

    #[test]
    fn test_degraded_uses_substring_only() {
        let handler = FaqHandler::build(faq_corpus(), Arc::new(NoopEmbedder::new(384)));
        assert!(handler.index().is_degraded());

        assert_eq!(
            handler.lookup("what's the return policy here"),
            FaqMatch::Substring { index: 0 }
        );
        // A keyword hit without a score is never accepted on its own.
        assert_eq!(handler.lookup("shipping"), FaqMatch::NotFound);
        assert_eq!(handler.answer("shipping"), NO_FAQ_MATCH);
    }
}
