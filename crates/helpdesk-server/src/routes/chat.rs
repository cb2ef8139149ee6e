//! Chat routes: one message in, one routed reply out.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use helpdesk_core::ChatMessage;
use serde::Deserialize;
use tracing::error;

use crate::state::AppState;

/// Chat request from the client.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default, rename = "conversationHistory")]
    pub conversation_history: Vec<ChatMessage>,
    #[serde(default, rename = "topK")]
    pub top_k: Option<usize>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chat/status", get(get_status))
        .route("/chat", post(chat))
}

async fn get_status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let retrieval = state.agent.retrieval();
    let label = state.agent.oracle_label();

    Json(serde_json::json!({
        "llmAvailable": label.is_some(),
        "llmProvider": label,
        "embedder": state.config.embedder.to_string(),
        "embedderAvailable": retrieval.embedder_available(),
        "faqEntries": retrieval.faq_len(),
        "productEntries": retrieval.product_len(),
    }))
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> impl IntoResponse {
    let start = Instant::now();

    if req.message.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "message is required" })),
        );
    }

    let mut messages = req.conversation_history;
    messages.push(ChatMessage::user(req.message));
    let top_k = req.top_k.filter(|k| *k > 0);

    match state.agent.respond(&messages, top_k).await {
        Ok(reply) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "reply": reply.reply,
                "intent": reply.intent,
                "duration": start.elapsed().as_millis() as u64,
            })),
        ),
        Err(e) => {
            error!("Chat request failed: {}", e);
            let status = if e.is_oracle_failure() {
                StatusCode::BAD_GATEWAY
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, Json(serde_json::json!({ "error": e.to_string() })))
        }
    }
}
