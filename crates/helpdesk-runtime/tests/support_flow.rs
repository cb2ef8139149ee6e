//! End-to-end routing against the sample corpus in `data/`.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use helpdesk_core::Result;
use helpdesk_infer::{EmbedderBackend, HashEmbedder, NoopEmbedder, DEFAULT_DIM};
use helpdesk_llm::Oracle;
use helpdesk_retrieval::{FaqCorpus, ProductCorpus, RetrievalService};
use helpdesk_runtime::orders::ORDER_ID_PROMPT;
use helpdesk_runtime::{Intent, SupportAgent};
use helpdesk_store::SqliteOrderStore;
use tempfile::TempDir;

struct CountingOracle {
    calls: AtomicUsize,
}

impl Oracle for CountingOracle {
    fn complete<'a>(&'a self, _prompt: &'a str) -> BoxFuture<'a, Result<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        async { Ok("fallback".to_string()) }.boxed()
    }

    fn label(&self) -> String {
        "counting/test".into()
    }
}

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data")
}

fn setup(embedder: Arc<dyn EmbedderBackend>) -> (SupportAgent, Arc<CountingOracle>, TempDir) {
    let data = data_dir();
    let retrieval = RetrievalService::new(
        FaqCorpus::load_faq(&data.join("faq.json")).unwrap(),
        ProductCorpus::load_products(&data.join("products.json")).unwrap(),
        embedder,
    );
    retrieval.warm();

    let dir = tempfile::tempdir().unwrap();
    let store = SqliteOrderStore::open(dir.path()).unwrap();
    store.seed_example_orders().unwrap();

    let oracle = Arc::new(CountingOracle {
        calls: AtomicUsize::new(0),
    });
    let agent = SupportAgent::new(
        Arc::new(retrieval),
        Arc::new(store),
        Some(oracle.clone() as Arc<dyn Oracle>),
    );
    (agent, oracle, dir)
}

fn embedders() -> Vec<Arc<dyn EmbedderBackend>> {
    vec![
        Arc::new(HashEmbedder::new(DEFAULT_DIM)),
        Arc::new(NoopEmbedder::new(DEFAULT_DIM)),
    ]
}

#[tokio::test]
async fn test_return_policy_faq() {
    for embedder in embedders() {
        let (agent, oracle, _dir) = setup(embedder);
        let reply = agent.ask("What is your return policy?").await.unwrap();
        assert_eq!(reply.intent, Intent::Faq);
        assert!(reply.reply.starts_with("You can return any unused item within 30 days"));
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn test_track_order() {
    let (agent, _oracle, _dir) = setup(Arc::new(HashEmbedder::new(DEFAULT_DIM)));
    let reply = agent.ask("Track order 12345").await.unwrap();
    assert_eq!(reply.intent, Intent::Order);
    assert!(reply.reply.contains("12345"));
    assert!(reply.reply.contains("shipped"));

    let reply = agent.ask("Where is my order?").await.unwrap();
    assert_eq!(reply.intent, Intent::Order);
    assert_eq!(reply.reply, ORDER_ID_PROMPT);

    let reply = agent.ask("any news on 98765").await.unwrap();
    assert_eq!(reply.intent, Intent::Order);
    assert!(reply.reply.contains("status=processing"));

    let reply = agent.ask("I want a refund for order 44444").await.unwrap();
    assert_eq!(reply.intent, Intent::Order);
    assert_eq!(reply.reply, "Order 44444 not found. Please verify your order id.");
}

#[tokio::test]
async fn test_outdoor_speaker_recommendation() {
    for embedder in embedders() {
        let (agent, oracle, _dir) = setup(embedder);
        let reply = agent
            .ask("Can you recommend speakers for outdoor use?")
            .await
            .unwrap();
        assert_eq!(reply.intent, Intent::Recommendation);
        let suggestions: Vec<&str> = reply.reply.lines().skip(1).collect();
        assert!(!suggestions.is_empty() && suggestions.len() <= 3);
        assert!(suggestions
            .iter()
            .any(|l| l.starts_with("- Outdoor Bluetooth Speaker:")));
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn test_unmatched_text_goes_to_oracle() {
    let (agent, oracle, _dir) = setup(Arc::new(HashEmbedder::new(DEFAULT_DIM)));
    let reply = agent.ask("Hello, how are you?").await.unwrap();
    assert_eq!(reply.intent, Intent::Fallback);
    assert_eq!(oracle.calls.load(Ordering::SeqCst), 2);
}
