//! Trait seams for pluggable backends.
//!
//! Concrete implementations live in `keel-places` (Google Places) and
//! `keel-api` (Redis / in-memory idempotency stores); tests substitute
//! their own.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Place;

/// Lookup of nearby merchant candidates for a coordinate pair.
///
/// Implementations own their timeout/retry behavior; callers treat a
/// returned error as already-retried and terminal.
#[async_trait]
pub trait PlacesLookup: Send + Sync {
    /// Return nearby place candidates, best match first. An empty vec means
    /// the location resolved cleanly to no merchants (not an error).
    async fn nearby(&self, lat: f64, lon: f64) -> Result<Vec<Place>>;
}

/// Shared idempotency store with TTL semantics.
#[async_trait]
pub trait IdempotencyStore: Send + Sync {
    /// Record `key` if unseen. Returns `true` when this call created the
    /// record, `false` when the key was already present.
    ///
    /// Must be atomic with respect to concurrent calls for the same key:
    /// exactly one concurrent caller observes `true`.
    async fn put_if_absent(&self, key: &str) -> Result<bool>;
}
