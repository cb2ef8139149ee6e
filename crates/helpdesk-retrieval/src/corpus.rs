//! Corpus documents: FAQ (question phrase → answer) and products.
//!
//! Corpora are loaded once at startup. A missing or malformed file is a
//! configuration error and must stop the process, never become an empty corpus.

use std::path::Path;

use helpdesk_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// One retrievable item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusEntry<T> {
    /// FAQ question phrase, or product id/title.
    pub key: String,
    /// Text that is embedded.
    pub search_text: String,
    /// Text the degraded keyword scan matches against.
    pub keyword_text: String,
    pub payload: T,
}

pub type FaqCorpus = Corpus<String>;
pub type ProductCorpus = Corpus<Product>;

/// Ordered, read-only sequence of entries. Positions are stable.
#[derive(Debug, Clone, PartialEq)]
pub struct Corpus<T> {
    entries: Vec<CorpusEntry<T>>,
}

impl<T> Corpus<T> {
    pub fn new(entries: Vec<CorpusEntry<T>>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CorpusEntry<T>] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&CorpusEntry<T>> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn search_texts(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.search_text.as_str()).collect()
    }
}

impl Corpus<String> {
    /// FAQ corpus from `(question phrase, answer)` pairs, in order.
    pub fn faq<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(k, v)| {
                    let key = k.into();
                    CorpusEntry {
                        search_text: key.clone(),
                        keyword_text: key.clone(),
                        key,
                        payload: v.into(),
                    }
                })
                .collect(),
        )
    }

    /// Parse a JSON object of question phrase → answer, keeping file order.
    pub fn parse_faq_json(json: &str) -> Result<Self> {
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)
            .map_err(|e| Error::Corpus(format!("FAQ corpus is not a JSON object: {}", e)))?;

        let mut pairs = Vec::with_capacity(map.len());
        for (question, answer) in map {
            match answer {
                serde_json::Value::String(a) => pairs.push((question, a)),
                other => {
                    return Err(Error::Corpus(format!(
                        "FAQ answer for {:?} must be a string, got {}",
                        question, other
                    )))
                }
            }
        }
        Ok(Self::faq(pairs))
    }

    pub fn load_faq(path: &Path) -> Result<Self> {
        let corpus = Self::parse_faq_json(&read_corpus_file(path)?)
            .map_err(|e| Error::Corpus(format!("{}: {}", path.display(), e)))?;
        info!("Loaded {} FAQ entries from {}", corpus.len(), path.display());
        Ok(corpus)
    }
}

/// Product identifier as written in the corpus file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductId::Number(n) => write!(f, "{}", n),
            ProductId::Text(s) => f.write_str(s),
        }
    }
}

/// A product record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl Product {
    /// `"{title}. {description}"`, or the bare title. This is what gets embedded.
    pub fn search_text(&self) -> String {
        if self.description.is_empty() {
            self.title.clone()
        } else {
            format!("{}. {}", self.title, self.description)
        }
    }

    /// Title and description joined with no separator, for the keyword scan.
    pub fn keyword_text(&self) -> String {
        format!("{}{}", self.title, self.description)
    }
}

impl Corpus<Product> {
    pub fn products(products: impl IntoIterator<Item = Product>) -> Self {
        Self::new(
            products
                .into_iter()
                .map(|p| CorpusEntry {
                    key: p
                        .id
                        .as_ref()
                        .map(ToString::to_string)
                        .unwrap_or_else(|| p.title.clone()),
                    search_text: p.search_text(),
                    keyword_text: p.keyword_text(),
                    payload: p,
                })
                .collect(),
        )
    }

    /// Parse a JSON array of `{title, description?, id?}` records.
    pub fn parse_products_json(json: &str) -> Result<Self> {
        let products: Vec<Product> = serde_json::from_str(json)
            .map_err(|e| Error::Corpus(format!("product corpus is malformed: {}", e)))?;
        Ok(Self::products(products))
    }

    pub fn load_products(path: &Path) -> Result<Self> {
        let corpus = Self::parse_products_json(&read_corpus_file(path)?)
            .map_err(|e| Error::Corpus(format!("{}: {}", path.display(), e)))?;
        info!("Loaded {} products from {}", corpus.len(), path.display());
        Ok(corpus)
    }
}

fn read_corpus_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| Error::Corpus(format!("cannot read {}: {}", path.display(), e)))
}
