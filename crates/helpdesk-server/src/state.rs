//! Shared application state.

use std::sync::Arc;

use helpdesk_core::{HelpdeskConfig, Result};
use helpdesk_llm::{create_oracle, LLMConfig};
use helpdesk_retrieval::RetrievalService;
use helpdesk_runtime::SupportAgent;
use helpdesk_store::SqliteOrderStore;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: HelpdeskConfig,
    pub agent: SupportAgent,
}

impl AppState {
    pub fn new(config: HelpdeskConfig, agent: SupportAgent) -> Self {
        Self { config, agent }
    }

    /// Wire the agent from configuration: corpora, embedder, order store, oracle.
    /// A missing or malformed corpus fails here.
    pub fn load(config: HelpdeskConfig) -> Result<Self> {
        let paths = &config.data_paths;

        let embedder = helpdesk_infer::create_embedder(config.embedder, &paths.models);
        let retrieval = Arc::new(RetrievalService::load(paths, embedder)?);
        let store = Arc::new(SqliteOrderStore::open(&paths.orders)?);

        let llm_config = LLMConfig::load(&paths.llm_config_file);
        let oracle = create_oracle(&llm_config, config.oracle_timeout);

        let agent = SupportAgent::new(retrieval, store, oracle)
            .with_default_top_k(config.default_top_k);
        Ok(Self::new(config, agent))
    }
}
