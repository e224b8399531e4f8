use crate::services::get_metrics;
use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use service_core::error::AppError;

/// Liveness. A process whose cold start failed is alive but degraded.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let model_loaded = state.model.is_ready();
    let status = if model_loaded { "ok" } else { "degraded" };
    Json(json!({
        "status": status,
        "service": "inference-service",
        "version": env!("CARGO_PKG_VERSION"),
        "model_loaded": model_loaded
    }))
}

pub async fn readiness_check(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    if state.model.is_ready() {
        Ok(StatusCode::OK)
    } else {
        Err(AppError::ServiceUnavailable)
    }
}

pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}
