//! Google Places Nearby Search client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use keel_core::{defaults, Error, Place, PlacesLookup, Result};

/// Default Places API endpoint.
pub const DEFAULT_PLACES_URL: &str = "https://maps.googleapis.com/maps/api/place";

/// Configuration for the Google Places client.
#[derive(Debug, Clone)]
pub struct GooglePlacesConfig {
    /// API base URL (overridable for tests).
    pub base_url: String,
    pub api_key: String,
    /// Search radius in meters.
    pub radius_m: u32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Retry budget for transient failures, including the first attempt.
    pub max_attempts: u32,
    /// Backoff before the second attempt; doubles per attempt.
    pub initial_backoff: Duration,
}

impl Default for GooglePlacesConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PLACES_URL.to_string(),
            api_key: String::new(),
            radius_m: defaults::PLACES_RADIUS_M,
            timeout_secs: defaults::PLACES_TIMEOUT_SECS,
            max_attempts: defaults::RETRY_MAX_ATTEMPTS,
            initial_backoff: Duration::from_millis(defaults::RETRY_INITIAL_BACKOFF_MS),
        }
    }
}

/// Places lookup backed by the Google Places Nearby Search API.
pub struct GooglePlacesClient {
    client: Client,
    config: GooglePlacesConfig,
}

#[derive(Debug, Deserialize)]
struct NearbyResponse {
    status: String,
    #[serde(default)]
    results: Vec<NearbyPlace>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NearbyPlace {
    name: Option<String>,
    #[serde(default)]
    types: Vec<String>,
}

/// Outcome of a single upstream attempt: either places, or a failure with
/// its retry classification.
enum Attempt {
    Ok(Vec<Place>),
    Retryable(String),
    Terminal(String),
}

impl GooglePlacesClient {
    /// Create a client with explicit configuration.
    pub fn new(config: GooglePlacesConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// Create from environment variables.
    ///
    /// Reads `GOOGLE_PLACES_API_KEY`, `PLACES_BASE_URL`, `PLACES_RADIUS_M`,
    /// and `PLACES_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let mut config = GooglePlacesConfig {
            api_key: std::env::var("GOOGLE_PLACES_API_KEY").unwrap_or_default(),
            ..GooglePlacesConfig::default()
        };
        if let Ok(url) = std::env::var("PLACES_BASE_URL") {
            config.base_url = url;
        }
        if let Some(radius) = std::env::var("PLACES_RADIUS_M")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.radius_m = radius;
        }
        if let Some(timeout) = std::env::var("PLACES_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.timeout_secs = timeout;
        }
        Self::new(config)
    }

    /// Search radius this client queries with.
    pub fn radius_m(&self) -> u32 {
        self.config.radius_m
    }

    async fn attempt_nearby(&self, lat: f64, lon: f64) -> Attempt {
        let url = format!("{}/nearbysearch/json", self.config.base_url);
        let location = format!("{},{}", lat, lon);
        let radius = self.config.radius_m.to_string();

        let response = match self
            .client
            .get(&url)
            .query(&[
                ("location", location.as_str()),
                ("radius", radius.as_str()),
                ("type", "establishment"),
                ("key", self.config.api_key.as_str()),
            ])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return Attempt::Retryable(format!("transport: {}", e)),
        };

        let status = response.status();
        if status.is_server_error() {
            return Attempt::Retryable(format!("HTTP {}", status));
        }
        if !status.is_success() {
            return Attempt::Terminal(format!("HTTP {}", status));
        }

        let body: NearbyResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => return Attempt::Retryable(format!("bad response body: {}", e)),
        };

        match body.status.as_str() {
            "OK" => {
                let places = body
                    .results
                    .into_iter()
                    .map(|p| Place {
                        name: p.name.unwrap_or_else(|| "Unknown Merchant".to_string()),
                        types: p.types,
                    })
                    .collect();
                Attempt::Ok(places)
            }
            "ZERO_RESULTS" => Attempt::Ok(Vec::new()),
            // Quota and transient upstream conditions are worth another try.
            "OVER_QUERY_LIMIT" | "UNKNOWN_ERROR" => Attempt::Retryable(describe(&body)),
            _ => Attempt::Terminal(describe(&body)),
        }
    }
}

fn describe(body: &NearbyResponse) -> String {
    match &body.error_message {
        Some(msg) => format!("{}: {}", body.status, msg),
        None => body.status.clone(),
    }
}

#[async_trait]
impl PlacesLookup for GooglePlacesClient {
    async fn nearby(&self, lat: f64, lon: f64) -> Result<Vec<Place>> {
        let mut backoff = self.config.initial_backoff;

        for attempt in 1..=self.config.max_attempts {
            match self.attempt_nearby(lat, lon).await {
                Attempt::Ok(places) => {
                    debug!(
                        candidates = places.len(),
                        attempt, "places nearby search complete"
                    );
                    return Ok(places);
                }
                Attempt::Terminal(msg) => {
                    warn!(attempt, error = %msg, "places nearby search failed");
                    return Err(Error::Upstream(msg));
                }
                Attempt::Retryable(msg) if attempt < self.config.max_attempts => {
                    warn!(attempt, error = %msg, backoff_ms = backoff.as_millis() as u64, "places nearby search failed, retrying");
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
                Attempt::Retryable(msg) => {
                    return Err(Error::Upstream(format!(
                        "{} (after {} attempts)",
                        msg, self.config.max_attempts
                    )));
                }
            }
        }

        unreachable!("retry loop always returns")
    }
}
