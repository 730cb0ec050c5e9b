//! Error types for keel.
//!
//! Every variant maps to a wire code and a retryability flag (the
//! `{"error":{"code","message","retryable"}}` envelope). Validation and
//! business errors are never retryable; store and transport errors are.

use thiserror::Error;

/// Result type alias using keel's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for keel operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Latitude/longitude outside the valid range; rejected before any
    /// upstream call.
    #[error("Invalid coordinates: lat={lat}, lon={lon}")]
    InvalidCoordinates { lat: f64, lon: f64 },

    /// Visit event submitted without the required Idempotency-Key header.
    #[error("Idempotency-Key header is required")]
    MissingIdempotencyKey,

    /// No merchant candidates at the given location.
    #[error("No merchants found at the specified location")]
    NoMerchantsFound,

    /// The degraded fallback path also failed; terminal for this visit.
    #[error("No recommendation available: {0}")]
    NoRecommendation(String),

    /// Places upstream unavailable after exhausting the retry budget.
    #[error("Places upstream error: {0}")]
    Upstream(String),

    /// Idempotency store operation failed.
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration error (bad rewards table, malformed setting).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// HTTP/network request failed.
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Wire error code carried in the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidCoordinates { .. } => "INVALID_COORDINATES",
            Error::MissingIdempotencyKey => "MISSING_IDEMPOTENCY_KEY",
            Error::NoMerchantsFound => "NO_MERCHANTS_FOUND",
            Error::NoRecommendation(_) => "NO_RECOMMENDATION",
            Error::Upstream(_) => "PLACES_UPSTREAM",
            Error::Store(_) => "STORE_ERROR",
            Error::Config(_) => "CONFIG_ERROR",
            Error::Serialization(_) => "SERIALIZATION_ERROR",
            Error::Request(_) => "REQUEST_ERROR",
            Error::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether a caller should retry the failed call.
    ///
    /// Upstream errors are already retried server-side, so they surface as
    /// terminal. Store errors are safe to retry because the idempotency
    /// check-and-set is atomic.
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            Error::Store(_) | Error::Request(_) | Error::Internal(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
