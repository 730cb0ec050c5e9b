//! keel-api server binary.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use keel_api::services::{store_from_settings, RewardsStore};
use keel_api::settings::Settings;
use keel_api::{build_router, AppState};
use keel_core::PlacesLookup;
use keel_places::{GooglePlacesClient, GooglePlacesConfig, DEFAULT_PLACES_URL};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   RUST_LOG    - standard env filter (default: "keel_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "keel_api=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("keel-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false),
                )
                .init();
        }
        Some(guard)
    } else if log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
        None
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    let settings = Settings::from_env();

    // Rewards rule table (embedded default unless REWARDS_PATH is set)
    let rewards = RewardsStore::load(settings.rewards_path.clone()).await?;

    // Places upstream
    let places: Arc<dyn PlacesLookup> = Arc::new(GooglePlacesClient::new(GooglePlacesConfig {
        base_url: settings
            .places_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_PLACES_URL.to_string()),
        api_key: settings.google_places_api_key.clone(),
        radius_m: settings.places_radius_m,
        timeout_secs: settings.places_timeout_secs,
        ..GooglePlacesConfig::default()
    }));

    // Idempotency store (Redis, or in-memory fallback)
    let store = store_from_settings(&settings).await;

    let addr = format!("{}:{}", settings.host, settings.port);
    let state = AppState::new(Arc::new(settings), rewards, places, store);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("keel-api listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
