//! Read-only tunables and rewards-table reload.

use axum::extract::State;
use axum::Json;

use keel_core::RemoteConfig;

use crate::error::ApiError;
use crate::AppState;

/// `GET /v1/config`: tunables the client needs to mirror server behavior.
pub async fn get_config(State(state): State<AppState>) -> Json<RemoteConfig> {
    Json(RemoteConfig {
        rewards_version: state.rewards.version().await,
        model_version: state.settings.model_version.clone(),
        min_confidence: state.settings.min_confidence,
        radius: state.settings.places_radius_m,
    })
}

/// `POST /v1/config/reload`: re-read the rewards table from its source.
pub async fn reload_rewards(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let version = state.rewards.reload().await?;
    Ok(Json(serde_json::json!({ "rewards_version": version })))
}
