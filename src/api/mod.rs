// ============================================================
// Layer 1 — HTTP Serving Layer (axum)
// ============================================================
// Serves the promoted model over HTTP:
//
//   state.rs    — write-once model slot (Unloaded / Ready / Failed)
//   handlers.rs — /predict and /health
//   error.rs    — status-code mapping for request failures
//
// `serve` binds first and starts answering immediately; the model
// is loaded on a blocking task and published to the slot when
// done. Until then /predict answers 503.

pub mod error;
pub mod handlers;
pub mod state;

use std::net::SocketAddr;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;

use crate::error::Result;
use crate::ml::inferencer::SentimentPredictor;
use state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/predict", post(handlers::predict))
        .route("/health", get(handlers::health))
        .with_state(state)
}

/// Bind `addr`, start serving, and load the model in the background.
pub async fn serve<F>(addr: SocketAddr, loader: F) -> Result<()>
where
    F: FnOnce() -> Result<SentimentPredictor> + Send + 'static,
{
    let state    = AppState::new();
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    let loading = state.clone();
    tokio::task::spawn_blocking(move || loading.finish_loading(loader()));

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Could not listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
