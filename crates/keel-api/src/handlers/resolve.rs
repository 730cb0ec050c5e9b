//! Merchant resolution endpoint.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use keel_core::MerchantResolution;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    pub lat: f64,
    pub lon: f64,
}

/// `GET /v1/merchant/resolve?lat=..&lon=..`
///
/// 404 `NO_MERCHANTS_FOUND` when the location has no candidates; 400
/// `INVALID_COORDINATES` before any upstream call for out-of-range input.
pub async fn resolve_merchant(
    State(state): State<AppState>,
    Query(query): Query<ResolveQuery>,
) -> Result<Json<MerchantResolution>, ApiError> {
    let resolution = state.resolver.resolve(query.lat, query.lon).await?;
    Ok(Json(resolution))
}
