//! Support agent: one user message in, one routed reply out.

use std::sync::Arc;

use helpdesk_core::{last_user_text, ChatMessage, HelpdeskConfig, Result};
use helpdesk_llm::Oracle;
use helpdesk_retrieval::{format_recommendations, RetrievalService};
use helpdesk_store::OrderStore;
use tracing::{debug, info};

use crate::fallback::FallbackHandler;
use crate::orders::OrderHandler;
use crate::router::IntentRouter;
use crate::types::{Intent, RouteState, SupportReply};

pub struct SupportAgent {
    router: IntentRouter,
    retrieval: Arc<RetrievalService>,
    orders: OrderHandler,
    fallback: FallbackHandler,
    oracle_label: Option<String>,
    default_top_k: usize,
}

impl SupportAgent {
    pub fn new(
        retrieval: Arc<RetrievalService>,
        store: Arc<dyn OrderStore>,
        oracle: Option<Arc<dyn Oracle>>,
    ) -> Self {
        Self {
            router: IntentRouter::new(oracle.clone()),
            retrieval,
            orders: OrderHandler::new(store),
            oracle_label: oracle.as_ref().map(|o| o.label()),
            fallback: FallbackHandler::new(oracle),
            default_top_k: HelpdeskConfig::DEFAULT_TOP_K,
        }
    }

    /// Number of products suggested when a request does not say.
    pub fn with_default_top_k(mut self, top_k: usize) -> Self {
        self.default_top_k = top_k.max(1);
        self
    }

    /// Route the latest user message of `messages` and produce the reply.
    pub async fn respond(
        &self,
        messages: &[ChatMessage],
        top_k: Option<usize>,
    ) -> Result<SupportReply> {
        let text = last_user_text(messages);
        let top_k = top_k.unwrap_or(self.default_top_k);

        let mut state = RouteState::Start;
        loop {
            state = match state {
                RouteState::Start => RouteState::Intent,
                RouteState::Intent => RouteState::Handler(self.router.classify(text).await?),
                RouteState::Handler(intent) => RouteState::End(SupportReply {
                    intent,
                    reply: self.handle(intent, text, top_k).await?,
                }),
                RouteState::End(reply) => {
                    info!("Routed message to {}", reply.intent);
                    return Ok(reply);
                }
            };
            debug!("Route state: {:?}", state);
        }
    }

    /// Reply to a single message with no prior conversation.
    pub async fn ask(&self, text: &str) -> Result<SupportReply> {
        self.respond(&[ChatMessage::user(text)], None).await
    }

    async fn handle(&self, intent: Intent, text: &str, top_k: usize) -> Result<String> {
        match intent {
            Intent::Faq => Ok(self.retrieval.faq().answer(text).to_string()),
            Intent::Order => self.orders.reply(text),
            Intent::Recommendation => Ok(format_recommendations(
                &self.retrieval.recommender().recommend(text, top_k),
            )),
            Intent::Fallback => self.fallback.generate_fallback_reply(text).await,
        }
    }

    pub fn retrieval(&self) -> &Arc<RetrievalService> {
        &self.retrieval
    }

    /// `provider/model` of the oracle, if one is configured.
    pub fn oracle_label(&self) -> Option<&str> {
        self.oracle_label.as_deref()
    }
}
