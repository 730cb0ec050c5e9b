//! HTTP error mapping.
//!
//! Every handler returns `Result<_, ApiError>`; the conversion below is the
//! single place domain errors become wire responses, so all non-2xx bodies
//! carry the same `{"error":{"code","message","retryable"}}` envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use keel_core::{Error, ErrorEnvelope};

/// Wrapper turning a domain error into an enveloped HTTP response.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::InvalidCoordinates { .. } | Error::MissingIdempotencyKey => {
                StatusCode::BAD_REQUEST
            }
            Error::NoMerchantsFound | Error::NoRecommendation(_) => StatusCode::NOT_FOUND,
            Error::Upstream(_) => StatusCode::BAD_GATEWAY,
            Error::Store(_)
            | Error::Config(_)
            | Error::Serialization(_)
            | Error::Request(_)
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(ErrorEnvelope::from_error(&self.0))).into_response()
    }
}
