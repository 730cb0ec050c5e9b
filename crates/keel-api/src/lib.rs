//! keel-api - HTTP API server for keel.
//!
//! Exposes the `/v1` recommendation surface: merchant resolution, card
//! scoring, idempotent visit-event intake, and read-only config. The
//! router is built from an [`AppState`] holding explicit dependencies
//! (rewards table handle, idempotency store, places backend) injected at
//! construction; there are no process-wide singletons.

pub mod error;
pub mod handlers;
pub mod services;
pub mod settings;

pub use error::ApiError;

use std::num::NonZeroU32;
use std::sync::Arc;

use axum::http::{HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use governor::{Quota, RateLimiter};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use keel_core::{IdempotencyStore, PlacesLookup};

use services::{EventIntake, MerchantResolver, RewardsStore};
use settings::Settings;

/// Generates time-ordered UUIDv7 request correlation IDs.
///
/// UUIDv7 embeds a Unix timestamp, so IDs sort chronologically across log
/// streams.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Global rate limiter type (direct quota, no keyed bucketing).
pub type GlobalRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    /// Hot-reloadable rewards rule table.
    pub rewards: RewardsStore,
    pub resolver: Arc<MerchantResolver>,
    pub intake: Arc<EventIntake>,
    /// Global rate limiter (None if rate limiting is disabled).
    pub rate_limiter: Option<Arc<GlobalRateLimiter>>,
}

impl AppState {
    /// Wire up the service graph from its injected backends.
    pub fn new(
        settings: Arc<Settings>,
        rewards: RewardsStore,
        places: Arc<dyn PlacesLookup>,
        store: Arc<dyn IdempotencyStore>,
    ) -> Self {
        let resolver = Arc::new(MerchantResolver::new(places, settings.min_confidence));
        let intake = Arc::new(EventIntake::new(store, resolver.clone(), rewards.clone()));

        let rate_limiter = if settings.rate_limit_enabled {
            let burst = NonZeroU32::new(settings.rate_limit_requests.max(1))
                .expect("burst is at least one");
            let quota = Quota::with_period(std::time::Duration::from_secs(
                settings.rate_limit_period_secs.max(1),
            ))
            .expect("rate limit period must be non-zero")
            .allow_burst(burst);
            Some(Arc::new(RateLimiter::direct(quota)))
        } else {
            None
        };

        Self {
            settings,
            rewards,
            resolver,
            intake,
            rate_limiter,
        }
    }
}

async fn rate_limit_middleware(
    axum::extract::State(state): axum::extract::State<AppState>,
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<axum::response::Response, (StatusCode, Json<serde_json::Value>)> {
    if let Some(limiter) = &state.rate_limiter {
        if limiter.check().is_err() {
            tracing::warn!("rate limit exceeded");
            return Err((
                StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({
                    "error": {
                        "code": "RATE_LIMITED",
                        "message": "Too many requests. Please wait before retrying.",
                        "retryable": true,
                    }
                })),
            ));
        }
    }
    Ok(next.run(request).await)
}

/// Parse the configured CORS origins, dropping unparsable entries.
fn parse_allowed_origins(origins: &[String]) -> Vec<HeaderValue> {
    origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("Invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect()
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(parse_allowed_origins(
            &state.settings.allowed_origins,
        )))
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/v1/config", get(handlers::config::get_config))
        .route("/v1/config/reload", post(handlers::config::reload_rewards))
        .route("/v1/merchant/resolve", get(handlers::resolve::resolve_merchant))
        .route("/v1/score", post(handlers::score::score_cards))
        .route("/v1/events/visit", post(handlers::events::process_visit_event))
        .fallback(not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(RequestBodyLimitLayer::new(32 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(cors)
        .with_state(state)
}

/// 404 fallback kept JSON-shaped for API consumers.
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": {
                "code": "NOT_FOUND",
                "message": "No such route",
                "retryable": false,
            }
        })),
    )
}
