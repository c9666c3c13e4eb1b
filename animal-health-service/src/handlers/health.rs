use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::services::get_metrics;
use crate::startup::AppState;

/// Liveness probe. Reports which generation path is active.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "animal-health-service",
        "version": env!("CARGO_PKG_VERSION"),
        "generation": state.dispatcher.source().as_str()
    }))
}

/// Readiness probe. The fallback path needs nothing external, so the
/// service can always serve.
pub async fn readiness_check() -> impl IntoResponse {
    StatusCode::OK
}

pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}
