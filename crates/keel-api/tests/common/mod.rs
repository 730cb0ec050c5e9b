//! Shared fixtures for router-level tests.
//!
//! Tests run against the in-process `Router` with an in-memory idempotency
//! store and a scripted places backend, so no network or Redis is needed.

// Each test binary uses a different subset of these fixtures.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Response;
use axum::Router;

use keel_api::services::{MemoryIdempotencyStore, RewardsStore};
use keel_api::settings::Settings;
use keel_api::{build_router, AppState};
use keel_core::{Error, Place, PlacesLookup, Result};

/// Places backend returning a fixed candidate list, counting upstream calls.
pub struct StaticPlaces {
    places: Vec<Place>,
    fail_with: Option<String>,
    pub calls: AtomicUsize,
}

impl StaticPlaces {
    pub fn returning(places: Vec<Place>) -> Self {
        Self {
            places,
            fail_with: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            places: Vec::new(),
            fail_with: Some(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlacesLookup for StaticPlaces {
    async fn nearby(&self, _lat: f64, _lon: f64) -> Result<Vec<Place>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(message) => Err(Error::Upstream(message.clone())),
            None => Ok(self.places.clone()),
        }
    }
}

pub fn place(name: &str, types: &[&str]) -> Place {
    Place {
        name: name.to_string(),
        types: types.iter().map(|t| t.to_string()).collect(),
    }
}

/// Settings for tests: rate limiting off, Redis off.
pub fn test_settings() -> Settings {
    Settings {
        host: "127.0.0.1".to_string(),
        port: 0,
        env: "test".to_string(),
        redis_enabled: false,
        redis_url: String::new(),
        google_places_api_key: String::new(),
        places_base_url: None,
        places_radius_m: 100,
        places_timeout_secs: 2,
        min_confidence: 0.5,
        model_version: "1.0".to_string(),
        rewards_path: None,
        idempotency_ttl_secs: 3600,
        allowed_origins: vec!["http://localhost:3000".to_string()],
        rate_limit_enabled: false,
        rate_limit_requests: 100,
        rate_limit_period_secs: 60,
    }
}

/// Router over the embedded rewards table and a one-hour retention window.
pub async fn test_app(places: Arc<dyn PlacesLookup>) -> Router {
    test_app_with_ttl(places, Duration::from_secs(3600)).await
}

pub async fn test_app_with_ttl(places: Arc<dyn PlacesLookup>, ttl: Duration) -> Router {
    let rewards = RewardsStore::load(None).await.unwrap();
    let store = Arc::new(MemoryIdempotencyStore::new(ttl));
    build_router(AppState::new(
        Arc::new(test_settings()),
        rewards,
        places,
        store,
    ))
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
