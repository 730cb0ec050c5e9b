//! Visit-event ingestion endpoint.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use keel_core::{Error, VisitEventBody, VisitResponse};

use crate::error::ApiError;
use crate::AppState;

/// `POST /v1/events/visit`, header `Idempotency-Key` required.
///
/// Returns `{"status":"accepted"}` the first time a key is seen and
/// `{"status":"duplicate"}` for every resubmission inside the retention
/// window. A missing header is 400 `MISSING_IDEMPOTENCY_KEY` and creates
/// no record.
pub async fn process_visit_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(event): Json<VisitEventBody>,
) -> Result<Json<VisitResponse>, ApiError> {
    let key = headers
        .get("Idempotency-Key")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or(Error::MissingIdempotencyKey)?;

    let status = state.intake.submit(key, &event).await?;
    Ok(Json(VisitResponse { status }))
}
