//! API route handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use council_providers::UsageSnapshot;
use serde::Deserialize;

use crate::server::AppState;

/// Body of `POST /api/chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

type ApiError = (StatusCode, Json<serde_json::Value>);

fn bad_request(msg: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": msg.into() })),
    )
}

/// Health check endpoint.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "council-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}

/// Cumulative model usage since startup.
pub async fn usage_stats(State(state): State<Arc<AppState>>) -> Json<UsageSnapshot> {
    Json(state.stats.snapshot())
}

/// Answer one question through the orchestrator.
///
/// Model failures never surface as HTTP errors: the orchestrator degrades to
/// a fallback answer instead.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(request) = payload.map_err(|e| bad_request(e.body_text()))?;
    let question = request.message.trim();
    if question.is_empty() {
        return Err(bad_request("Empty message"));
    }

    let outcome = state.orchestrator.respond(question).await;
    tracing::info!(
        specialist = %outcome.specialist,
        rewritten = outcome.rewritten,
        "answered via gateway"
    );
    Ok(Json(serde_json::json!({ "answer": outcome.answer })))
}
