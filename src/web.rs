use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;

use crate::api::{self, AppState};
use crate::config::EcoVoyageConfig;
use crate::search::SearchGateway;

const MAX_BODY_BYTES: usize = 16 * 1024;

/// API under `/api`, anything else is served from `static_dir`
pub fn app(state: Arc<AppState>, static_dir: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api::router(state))
        .fallback_service(ServeDir::new(static_dir))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors)
}

pub async fn run(config: &EcoVoyageConfig, port: u16) -> Result<()> {
    let gateway = Arc::new(SearchGateway::from_config(config)?);
    let state = Arc::new(
        AppState::new(gateway, config.autocomplete.clone())
            .with_max_conversations(config.server.max_conversations),
    );
    let app = app(state, &config.server.static_dir);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://localhost:{}", port);
    axum::serve(listener, app)
        .await
        .context("Web server stopped unexpectedly")
}
