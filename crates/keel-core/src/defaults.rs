//! Centralized default constants for the keel system.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates reference these constants instead of defining their own magic
//! numbers.

// =============================================================================
// CONFIDENCE
// =============================================================================

/// Confidence a visit must reach before the resolve→rank pipeline runs.
pub const RECOMMEND_GATE: f64 = 0.6;

/// Minimum merchant-resolution confidence; below this the category-only
/// fallback path is taken.
pub const MIN_CONFIDENCE: f64 = 0.5;

/// Resolution confidence when an MCC mapping was found for the top place.
pub const CONFIDENCE_WITH_MCC: f64 = 0.8;

// =============================================================================
// PLACES UPSTREAM
// =============================================================================

/// Merchant search radius in meters.
pub const PLACES_RADIUS_M: u32 = 100;

/// Per-request timeout for the places upstream (seconds).
pub const PLACES_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// RETRY / BACKOFF
// =============================================================================

/// Maximum attempts for a retryable remote call, including the first.
pub const RETRY_MAX_ATTEMPTS: u32 = 3;

/// Initial backoff before the second attempt (milliseconds). Doubles per
/// attempt.
pub const RETRY_INITIAL_BACKOFF_MS: u64 = 500;

/// Consumer-side connect timeout (seconds).
pub const CLIENT_CONNECT_TIMEOUT_SECS: u64 = 2;

/// Consumer-side per-request timeout (milliseconds).
pub const CLIENT_REQUEST_TIMEOUT_MS: u64 = 1500;

// =============================================================================
// EVENT INTAKE
// =============================================================================

/// Retention window for idempotency records (seconds). A resubmission after
/// expiry is treated as a fresh event.
pub const IDEMPOTENCY_TTL_SECS: u64 = 86_400;

/// Key prefix for idempotency records in the shared store.
pub const IDEMPOTENCY_PREFIX: &str = "keel:idem:";

// =============================================================================
// SCORING
// =============================================================================

/// Reward multiplier for cards absent from the rules table.
pub const DEFAULT_BASE_MULTIPLIER: f64 = 1.0;

/// Number of recommendations returned by the score endpoint.
pub const MAX_TOP: usize = 3;

/// Version reported for the (future) ML model.
pub const MODEL_VERSION: &str = "1.0";
