//! Health check endpoint.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::AppState;

/// `GET /health`: liveness for load balancers.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "ok": true,
        "env": state.settings.env,
    }))
}
