//! HTTP server implementation using Axum.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::response::Html;
use axum::routing::{get, post};
use council_agent::{Council, Orchestrator};
use council_core::config::GatewayConfig;
use council_providers::UsageStats;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared state for the gateway server.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub stats: Arc<UsageStats>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(orchestrator: Arc<Orchestrator>, stats: Arc<UsageStats>) -> Self {
        Self {
            orchestrator,
            stats,
            start_time: Instant::now(),
        }
    }
}

impl From<Council> for AppState {
    fn from(council: Council) -> Self {
        Self::new(council.orchestrator, council.stats)
    }
}

async fn chat_page() -> Html<&'static str> {
    Html(super::page::chat_page_html())
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(chat_page))
        .route("/health", get(super::routes::health_check))
        .route("/api/chat", post(super::routes::chat))
        .route("/api/stats", get(super::routes::usage_stats))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(Arc::new(state))
}

/// Start the HTTP server.
pub async fn start(config: &GatewayConfig, state: AppState) -> anyhow::Result<()> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Gateway server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
