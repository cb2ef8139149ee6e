//! Top-k cosine retrieval over a corpus, with a keyword-scan degraded mode.

use std::sync::Arc;

use helpdesk_infer::EmbedderBackend;
use ndarray::{Array1, Array2};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::corpus::{Corpus, CorpusEntry};

/// One hit. `score` is cosine similarity, or `None` when found by keyword scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RetrievalResult {
    pub corpus_index: usize,
    pub score: Option<f32>,
}

enum Mode {
    /// L2-normalized rows in corpus order, shape (N, dim).
    Embedded { matrix: Array2<f32> },
    Keyword,
}

/// Index over one corpus. Immutable after `build`.
pub struct RetrievalIndex<T> {
    corpus: Arc<Corpus<T>>,
    embedder: Arc<dyn EmbedderBackend>,
    mode: Mode,
    /// Lowercased keyword texts, one per entry.
    lowered: Vec<String>,
}

impl<T> RetrievalIndex<T> {
    pub fn build(corpus: Arc<Corpus<T>>, embedder: Arc<dyn EmbedderBackend>) -> Self {
        let lowered = corpus
            .entries()
            .iter()
            .map(|e| e.keyword_text.to_lowercase())
            .collect();
        let mode = embed_corpus(&corpus, embedder.as_ref());

        match &mode {
            Mode::Embedded { matrix } => info!(
                "Built retrieval index: {} entries, dim={}",
                matrix.nrows(),
                matrix.ncols()
            ),
            Mode::Keyword => warn!(
                "Retrieval index for {} entries is in keyword mode (no usable embeddings)",
                corpus.len()
            ),
        }

        Self {
            corpus,
            embedder,
            mode,
            lowered,
        }
    }

    /// Top `k` entries for `text`. Ties keep corpus order.
    pub fn query(&self, text: &str, k: usize) -> Vec<RetrievalResult> {
        if k == 0 || self.corpus.is_empty() {
            return Vec::new();
        }

        match &self.mode {
            Mode::Embedded { matrix } => match self.embedder.embed(text) {
                Some(q) if q.len() == matrix.ncols() => rank(matrix, &q, k),
                Some(q) => {
                    warn!(
                        "Query embedding has dim {} but index has {}; using keyword scan",
                        q.len(),
                        matrix.ncols()
                    );
                    self.keyword_scan(text, k)
                }
                None => {
                    warn!("Query embedding failed; using keyword scan");
                    self.keyword_scan(text, k)
                }
            },
            Mode::Keyword => self.keyword_scan(text, k),
        }
    }

    fn keyword_scan(&self, text: &str, k: usize) -> Vec<RetrievalResult> {
        let tokens: Vec<String> = text.split_whitespace().map(str::to_lowercase).collect();
        if tokens.is_empty() {
            return Vec::new();
        }

        let results: Vec<RetrievalResult> = self
            .lowered
            .iter()
            .enumerate()
            .filter(|(_, t)| tokens.iter().any(|tok| t.contains(tok.as_str())))
            .take(k)
            .map(|(i, _)| RetrievalResult {
                corpus_index: i,
                score: None,
            })
            .collect();
        debug!("Keyword scan matched {} entries", results.len());
        results
    }

    pub fn get(&self, result: &RetrievalResult) -> Option<&CorpusEntry<T>> {
        self.corpus.get(result.corpus_index)
    }

    pub fn corpus(&self) -> &Arc<Corpus<T>> {
        &self.corpus
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.mode, Mode::Keyword)
    }

    pub fn len(&self) -> usize {
        self.corpus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corpus.is_empty()
    }
}

fn embed_corpus<T>(corpus: &Corpus<T>, embedder: &dyn EmbedderBackend) -> Mode {
    if !embedder.is_available() {
        return Mode::Keyword;
    }

    let dim = embedder.dimension();
    if corpus.is_empty() {
        return Mode::Embedded {
            matrix: Array2::zeros((0, dim)),
        };
    }

    let texts = corpus.search_texts();
    let vectors = embedder.embed_batch(&texts);
    if vectors.len() != texts.len() {
        warn!(
            "Embedder returned {} vectors for {} texts",
            vectors.len(),
            texts.len()
        );
        return Mode::Keyword;
    }

    let mut matrix = Array2::<f32>::zeros((texts.len(), dim));
    for (i, vector) in vectors.into_iter().enumerate() {
        let Some(v) = vector else {
            warn!("No embedding for corpus entry {}", i);
            return Mode::Keyword;
        };
        if v.len() != dim {
            warn!("Corpus entry {} has dim {}, expected {}", i, v.len(), dim);
            return Mode::Keyword;
        }
        let norm = v.dot(&v).sqrt();
        if norm > 1e-9 {
            matrix.row_mut(i).assign(&(&v / norm));
        }
    }
    Mode::Embedded { matrix }
}

fn rank(matrix: &Array2<f32>, query: &Array1<f32>, k: usize) -> Vec<RetrievalResult> {
    // A zero query scores 0 against everything.
    let q_norm = query.dot(query).sqrt();
    let similarities = if q_norm < 1e-9 {
        Array1::zeros(matrix.nrows())
    } else {
        matrix.dot(&(query / q_norm))
    };

    let mut indexed: Vec<(usize, f32)> = similarities.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    indexed.truncate(k);

    indexed
        .into_iter()
        .map(|(i, s)| RetrievalResult {
            corpus_index: i,
            score: Some(s.clamp(-1.0, 1.0)),
        })
        .collect()
}
