//! Environment-derived server settings.
//!
//! Parsed once at startup into an explicit struct that is injected through
//! `AppState`; nothing reads the process environment after boot.

use std::path::PathBuf;

use keel_core::defaults;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// Deployment environment label reported by the health check.
    pub env: String,

    pub redis_enabled: bool,
    pub redis_url: String,

    pub google_places_api_key: String,
    /// Places API base URL override (tests point this at a mock server).
    pub places_base_url: Option<String>,
    pub places_radius_m: u32,
    pub places_timeout_secs: u64,

    /// Minimum merchant-resolution confidence before the fallback path runs.
    pub min_confidence: f64,
    pub model_version: String,
    /// Rewards table file; the embedded default table is used when unset.
    pub rewards_path: Option<PathBuf>,

    /// Retention window for idempotency records.
    pub idempotency_ttl_secs: u64,

    pub allowed_origins: Vec<String>,

    pub rate_limit_enabled: bool,
    pub rate_limit_requests: u32,
    pub rate_limit_period_secs: u64,
}

impl Settings {
    /// Load settings from environment variables, with defaults suitable for
    /// local development.
    pub fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0"),
            port: env_parsed("PORT", 8000),
            env: env_or("KEEL_ENV", "development"),

            redis_enabled: env_flag("REDIS_ENABLED", true),
            redis_url: env_or("REDIS_URL", "redis://localhost:6379"),

            google_places_api_key: env_or("GOOGLE_PLACES_API_KEY", ""),
            places_base_url: std::env::var("PLACES_BASE_URL").ok(),
            places_radius_m: env_parsed("PLACES_RADIUS_M", defaults::PLACES_RADIUS_M),
            places_timeout_secs: env_parsed("PLACES_TIMEOUT_SECS", defaults::PLACES_TIMEOUT_SECS),

            min_confidence: env_parsed("MIN_CONFIDENCE", defaults::MIN_CONFIDENCE),
            model_version: env_or("MODEL_VERSION", defaults::MODEL_VERSION),
            rewards_path: std::env::var("REWARDS_PATH").ok().map(PathBuf::from),

            idempotency_ttl_secs: env_parsed("IDEMPOTENCY_TTL_SECS", defaults::IDEMPOTENCY_TTL_SECS),

            allowed_origins: env_or("ALLOWED_ORIGINS", "http://localhost:3000")
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),

            rate_limit_enabled: env_flag("RATE_LIMIT_ENABLED", true),
            rate_limit_requests: env_parsed("RATE_LIMIT_REQUESTS", 100),
            rate_limit_period_secs: env_parsed("RATE_LIMIT_PERIOD_SECS", 60),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(default)
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
