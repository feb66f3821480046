use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Root liveness probe; the original service answered `GET /` with a string.
pub async fn liveness() -> impl IntoResponse {
    "diagnostic-service is running"
}

/// Reports whether the chat provider is reachable.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.provider.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "service": "diagnostic-service",
                "version": env!("CARGO_PKG_VERSION")
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "service": "diagnostic-service",
                "error": e.to_string()
            })),
        ),
    }
}
