//! Idempotent visit-event intake.
//!
//! Per idempotency key the state machine is Unseen → Accepted; the atomic
//! check-and-set in the store guarantees the resolve→rank pipeline runs at
//! most once per key, even under concurrent submissions. Records expire
//! after the retention window, after which a resubmission counts as a
//! fresh event.

use std::sync::Arc;

use tracing::{debug, info, warn};

use keel_core::{
    validate_coordinates, CardRecommendation, IdempotencyStore, MerchantResolution, Result,
    VisitEventBody, VisitStatus,
};

use super::resolver::MerchantResolver;
use super::rewards_store::RewardsStore;

/// Accepts visit events and drives the recommendation pipeline exactly once
/// per unique event.
pub struct EventIntake {
    store: Arc<dyn IdempotencyStore>,
    resolver: Arc<MerchantResolver>,
    rewards: RewardsStore,
}

impl EventIntake {
    pub fn new(
        store: Arc<dyn IdempotencyStore>,
        resolver: Arc<MerchantResolver>,
        rewards: RewardsStore,
    ) -> Self {
        Self {
            store,
            resolver,
            rewards,
        }
    }

    /// Submit one visit event under an idempotency key.
    ///
    /// Validation failures create no record. A key that loses the
    /// check-and-set returns `Duplicate` without touching the upstream. A
    /// pipeline failure after acceptance is logged, not surfaced: the event
    /// itself was accepted.
    pub async fn submit(&self, key: &str, event: &VisitEventBody) -> Result<VisitStatus> {
        validate_coordinates(event.lat, event.lon)?;

        if !self.store.put_if_absent(key).await? {
            debug!(idempotency_key = key, "duplicate visit event");
            return Ok(VisitStatus::Duplicate);
        }

        match self.run_pipeline(event).await {
            Ok((resolution, ranked)) => {
                info!(
                    idempotency_key = key,
                    merchant = resolution.merchant.as_deref().unwrap_or("-"),
                    category = resolution.category.as_deref().unwrap_or("-"),
                    top_card = ranked.first().map(|r| r.card.as_str()).unwrap_or("-"),
                    "visit accepted"
                );
            }
            Err(e) => {
                warn!(
                    idempotency_key = key,
                    error = %e,
                    "visit accepted but no recommendation available"
                );
            }
        }

        Ok(VisitStatus::Accepted)
    }

    async fn run_pipeline(
        &self,
        event: &VisitEventBody,
    ) -> Result<(MerchantResolution, Vec<CardRecommendation>)> {
        let resolution = self
            .resolver
            .resolve_or_fallback(event.lat, event.lon)
            .await?;

        let table = self.rewards.current().await;
        let ranked = table.rank(
            resolution.category.as_deref(),
            resolution.mcc.as_deref(),
            &table.all_candidates(),
        );

        Ok((resolution, ranked))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::idempotency::MemoryIdempotencyStore;
    use async_trait::async_trait;
    use chrono::Utc;
    use keel_core::{Place, PlacesLookup, RewardsTable};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingPlaces {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PlacesLookup for CountingPlaces {
        async fn nearby(&self, _lat: f64, _lon: f64) -> Result<Vec<Place>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Place {
                name: "Luigi's".to_string(),
                types: vec!["restaurant".to_string()],
            }])
        }
    }

    fn table() -> RewardsTable {
        RewardsTable::from_json(
            r#"{"version":"1.0","cards":{"Amex Gold":{"base":1.0,"categories":{"dining":4.0}}}}"#,
        )
        .unwrap()
    }

    fn event() -> VisitEventBody {
        VisitEventBody {
            lat: 37.7749,
            lon: -122.4194,
            timestamp: Utc::now(),
            user_id: Some("user-1".to_string()),
        }
    }

    fn intake_with(places: Arc<CountingPlaces>) -> EventIntake {
        EventIntake::new(
            Arc::new(MemoryIdempotencyStore::default()),
            Arc::new(MerchantResolver::new(places, 0.5)),
            RewardsStore::from_table(table()),
        )
    }

    #[tokio::test]
    async fn test_first_submission_accepted_second_duplicate() {
        let places = Arc::new(CountingPlaces {
            calls: AtomicUsize::new(0),
        });
        let intake = intake_with(places.clone());

        assert_eq!(
            intake.submit("evt-1", &event()).await.unwrap(),
            VisitStatus::Accepted
        );
        assert_eq!(
            intake.submit("evt-1", &event()).await.unwrap(),
            VisitStatus::Duplicate
        );

        // The pipeline ran once; the duplicate never reached the upstream.
        assert_eq!(places.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_coordinates_create_no_record() {
        let places = Arc::new(CountingPlaces {
            calls: AtomicUsize::new(0),
        });
        let intake = intake_with(places.clone());

        let bad = VisitEventBody {
            lat: 91.0,
            ..event()
        };
        assert!(intake.submit("evt-1", &bad).await.is_err());

        // The key is still unseen: a valid retry with the same key is
        // accepted, not a duplicate.
        assert_eq!(
            intake.submit("evt-1", &event()).await.unwrap(),
            VisitStatus::Accepted
        );
    }

    #[tokio::test]
    async fn test_concurrent_same_key_runs_pipeline_once() {
        let places = Arc::new(CountingPlaces {
            calls: AtomicUsize::new(0),
        });
        let intake = Arc::new(intake_with(places.clone()));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let intake = intake.clone();
            handles.push(tokio::spawn(async move {
                intake.submit("evt-race", &event()).await.unwrap()
            }));
        }

        let mut accepted = 0;
        let mut duplicate = 0;
        for handle in handles {
            match handle.await.unwrap() {
                VisitStatus::Accepted => accepted += 1,
                VisitStatus::Duplicate => duplicate += 1,
            }
        }

        assert_eq!(accepted, 1);
        assert_eq!(duplicate, 7);
        assert_eq!(places.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_pipeline_failure_still_accepts_event() {
        struct DownPlaces;

        #[async_trait]
        impl PlacesLookup for DownPlaces {
            async fn nearby(&self, _lat: f64, _lon: f64) -> Result<Vec<Place>> {
                Err(keel_core::Error::Upstream("places down".to_string()))
            }
        }

        let intake = EventIntake::new(
            Arc::new(MemoryIdempotencyStore::default()),
            Arc::new(MerchantResolver::new(Arc::new(DownPlaces), 0.5)),
            RewardsStore::from_table(table()),
        );

        assert_eq!(
            intake.submit("evt-1", &event()).await.unwrap(),
            VisitStatus::Accepted
        );
    }
}
