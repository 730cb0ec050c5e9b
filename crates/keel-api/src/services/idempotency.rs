//! Idempotency stores.
//!
//! The production store is Redis, using `SET key v NX EX ttl` as the atomic
//! check-and-set so two near-simultaneous submissions of one key cannot
//! both observe "unseen". The in-memory store provides the same semantics
//! for a single process and is used in tests and when Redis is disabled.
//!
//! A store failure is surfaced, never treated as "unseen": silently
//! degrading would let duplicate events re-run the pipeline.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tokio::sync::Mutex;
use tracing::{info, warn};

use keel_core::{defaults, Error, IdempotencyStore, Result};

use crate::settings::Settings;

/// Redis-backed idempotency store.
pub struct RedisIdempotencyStore {
    connection: ConnectionManager,
    ttl_seconds: u64,
    prefix: String,
}

impl RedisIdempotencyStore {
    /// Connect to Redis; fails fast when the server is unreachable so the
    /// caller can decide whether to fall back.
    pub async fn connect(url: &str, ttl_seconds: u64) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| Error::Store(format!("invalid Redis URL: {}", e)))?;
        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| Error::Store(format!("Redis connection failed: {}", e)))?;

        Ok(Self {
            connection,
            ttl_seconds,
            prefix: defaults::IDEMPOTENCY_PREFIX.to_string(),
        })
    }
}

#[async_trait]
impl IdempotencyStore for RedisIdempotencyStore {
    async fn put_if_absent(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection.clone();
        let namespaced = format!("{}{}", self.prefix, key);

        // SET NX EX returns OK when the key was newly set, nil otherwise.
        let created: Option<String> = redis::cmd("SET")
            .arg(&namespaced)
            .arg("1")
            .arg("NX")
            .arg("EX")
            .arg(self.ttl_seconds)
            .query_async(&mut conn)
            .await
            .map_err(|e| Error::Store(format!("Redis SET error: {}", e)))?;

        Ok(created.is_some())
    }
}

/// In-process idempotency store with per-entry expiry.
pub struct MemoryIdempotencyStore {
    entries: Mutex<HashMap<String, Instant>>,
    ttl: Duration,
}

impl MemoryIdempotencyStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }
}

impl Default for MemoryIdempotencyStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(defaults::IDEMPOTENCY_TTL_SECS))
    }
}

#[async_trait]
impl IdempotencyStore for MemoryIdempotencyStore {
    async fn put_if_absent(&self, key: &str) -> Result<bool> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;

        // Expired entries count as unseen; drop them as they are touched.
        if let Some(expires_at) = entries.get(key) {
            if *expires_at > now {
                return Ok(false);
            }
            entries.remove(key);
        }

        if entries.len() > 100_000 {
            entries.retain(|_, expires_at| *expires_at > now);
        }

        entries.insert(key.to_string(), now + self.ttl);
        Ok(true)
    }
}

/// Build the idempotency store the settings ask for, falling back to the
/// in-memory store with a warning when Redis is unreachable.
pub async fn store_from_settings(settings: &Settings) -> Arc<dyn IdempotencyStore> {
    let ttl = settings.idempotency_ttl_secs;

    if !settings.redis_enabled {
        info!("Redis disabled; using in-memory idempotency store");
        return Arc::new(MemoryIdempotencyStore::new(Duration::from_secs(ttl)));
    }

    match RedisIdempotencyStore::connect(&settings.redis_url, ttl).await {
        Ok(store) => {
            info!(ttl_secs = ttl, "Redis idempotency store connected");
            Arc::new(store)
        }
        Err(e) => {
            warn!("Redis unavailable, using in-memory idempotency store: {}", e);
            Arc::new(MemoryIdempotencyStore::new(Duration::from_secs(ttl)))
        }
    }
}
