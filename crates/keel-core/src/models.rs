//! Boundary models shared by the server and the consumer client.
//!
//! All request/response payloads are strict serde schemas; optional fields
//! are `Option<T>`, never ad hoc JSON maps. Validation happens here at the
//! boundary, not inside the business logic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Reject coordinates outside the valid WGS-84 range.
///
/// Invalid values must never reach the places upstream.
pub fn validate_coordinates(lat: f64, lon: f64) -> Result<()> {
    // NaN fails both range checks, so it is rejected too.
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(Error::InvalidCoordinates { lat, lon });
    }
    Ok(())
}

/// Signals describing one detected location visit.
///
/// Ephemeral: produced once per detected visit and consumed by the
/// confidence scorer. `hour_of_day` is the local hour at arrival.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitSignal {
    pub latitude: f64,
    pub longitude: f64,
    pub arrival_time: DateTime<Utc>,
    /// Distance from the matched point of interest, when known.
    pub distance_meters: Option<f64>,
    /// Minutes the user has remained at the location so far.
    pub dwell_minutes: Option<f64>,
    /// Completed prior visits to this merchant.
    pub prior_visits: u32,
    /// Local hour at arrival, 0..=23.
    pub hour_of_day: u8,
}

/// A merchant identity resolved from coordinates.
///
/// `merchant` is `None` on the category-only fallback path, where the
/// category can still drive ranking without a merchant identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerchantResolution {
    pub merchant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mcc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub confidence: f64,
}

/// A card in the user's active wallet, supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardCandidate {
    pub name: String,
}

impl CardCandidate {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One ranked card with the rule that produced its score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardRecommendation {
    pub card: String,
    pub score: f64,
    pub reason: String,
}

/// Request body for `POST /v1/score`. All fields optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mcc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cards: Option<Vec<String>>,
}

/// Response body for `POST /v1/score`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub top: Vec<CardRecommendation>,
    pub used_rules_version: String,
}

/// Request body for `POST /v1/events/visit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitEventBody {
    pub lat: f64,
    pub lon: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Outcome of a visit-event submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisitStatus {
    Accepted,
    Duplicate,
}

/// Response body for `POST /v1/events/visit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitResponse {
    pub status: VisitStatus,
}

/// Read-only tunables exposed at `GET /v1/config`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub rewards_version: String,
    pub model_version: String,
    pub min_confidence: f64,
    /// Merchant search radius in meters.
    pub radius: u32,
}

/// A nearby place candidate returned by the places upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub types: Vec<String>,
}

/// Wire error detail inside the envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub retryable: bool,
}

/// Standard error envelope for all non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorDetail,
}

impl ErrorEnvelope {
    pub fn from_error(err: &Error) -> Self {
        Self {
            error: ErrorDetail {
                code: err.code().to_string(),
                message: err.to_string(),
                retryable: err.retryable(),
            },
        }
    }
}
