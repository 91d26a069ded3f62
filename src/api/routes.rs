//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::chat::Dispatcher;
use crate::config::Config;
use crate::llm::{LlmClient, OpenRouterClient};
use crate::store::Store;

use super::types::*;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub dispatcher: Dispatcher,
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let store = Arc::new(Store::open(&config.database_path)?);
    tracing::info!("Database ready at {}", config.database_path.display());

    let api_key = config.openrouter_api_key.clone().unwrap_or_else(|| {
        tracing::warn!("OPENROUTER_API_KEY not set; conversation fallback will fail");
        String::new()
    });
    let llm: Arc<dyn LlmClient> = Arc::new(OpenRouterClient::new(api_key));
    let dispatcher = Dispatcher::new(store, llm, config.model.clone());

    let state = Arc::new(AppState {
        config: config.clone(),
        dispatcher,
    });

    let index = ServeFile::new(config.static_dir.join("index.html"));
    let assets = ServeDir::new(&config.static_dir);

    let app = Router::new()
        .route("/chat", post(chat))
        .route("/api/health", get(health))
        .route_service("/", index)
        .nest_service("/static", assets)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::clone(&state));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Health check endpoint.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle one chat message.
async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatReply>, (StatusCode, String)> {
    let session_id = req
        .session_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let response = state
        .dispatcher
        .handle(&session_id, &req.message)
        .await
        .map_err(|e| {
            tracing::error!("chat dispatch failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "something went wrong saving that".to_string(),
            )
        })?;

    Ok(Json(ChatReply {
        response,
        session_id,
    }))
}
