//! HTTP endpoints. Thin shells over the core library.

mod extract;
mod monitor;
mod upload;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::state::AppState;

/// Assemble the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/monitor", post(monitor::start_monitor))
        .route("/extract_invoice", post(extract::extract_invoice))
        .route("/upload_regions", post(upload::upload_regions))
        .route("/upload_image", post(upload::upload_image))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}
