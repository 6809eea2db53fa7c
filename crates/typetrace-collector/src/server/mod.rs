//! HTTP surface for the collector.

pub mod handlers;
mod state;

use axum::routing::{get, post};
use axum::Router;

pub use state::AppState;

/// Build the collector router with all nine endpoints mounted.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/stats", get(handlers::stats))
        .route("/ingest", post(handlers::ingest))
        .route("/entities", get(handlers::entities))
        .route("/calls", get(handlers::calls))
        .route("/location", get(handlers::location))
        .route("/shapes", get(handlers::shapes))
        .route("/enums", get(handlers::enums))
        .route("/annotations", get(handlers::annotations))
        .route("/query", post(handlers::adhoc))
        .with_state(state)
}

/// Bind and serve until the process terminates.
pub async fn serve(state: AppState, bind: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(bind, "collector listening");
    axum::serve(listener, router(state)).await
}
