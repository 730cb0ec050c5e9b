//! Merchant resolution with a category-only fallback chain.

use std::sync::Arc;

use tracing::{debug, warn};

use keel_core::{
    defaults, validate_coordinates, Error, MerchantResolution, PlacesLookup, Result,
};
use keel_places::map_types_to_mcc_category;

/// Resolves coordinates to a merchant identity via the places upstream.
pub struct MerchantResolver {
    places: Arc<dyn PlacesLookup>,
    min_confidence: f64,
}

impl MerchantResolver {
    pub fn new(places: Arc<dyn PlacesLookup>, min_confidence: f64) -> Self {
        Self {
            places,
            min_confidence,
        }
    }

    /// Resolve coordinates to the closest merchant.
    ///
    /// Coordinates are validated before any upstream call. Returns
    /// `NoMerchantsFound` when the location has no candidates.
    pub async fn resolve(&self, lat: f64, lon: f64) -> Result<MerchantResolution> {
        validate_coordinates(lat, lon)?;

        let candidates = self.places.nearby(lat, lon).await?;
        let top = candidates.first().ok_or(Error::NoMerchantsFound)?;

        let (mcc, category) = map_types_to_mcc_category(&top.types);
        let confidence = if mcc.is_some() {
            defaults::CONFIDENCE_WITH_MCC
        } else {
            self.min_confidence
        };

        debug!(
            merchant = %top.name,
            category = category.as_deref().unwrap_or("-"),
            confidence,
            "merchant resolved"
        );

        Ok(MerchantResolution {
            merchant: Some(top.name.clone()),
            mcc,
            category,
            confidence,
        })
    }

    /// Resolve with the degraded fallback path of the pipeline.
    ///
    /// When resolution finds no merchant or its confidence is below the
    /// configured minimum, a single category-only lookup runs instead. The
    /// fallback is never retried: a second failure is the terminal
    /// "no recommendation available" outcome.
    pub async fn resolve_or_fallback(&self, lat: f64, lon: f64) -> Result<MerchantResolution> {
        match self.resolve(lat, lon).await {
            Ok(resolution) if resolution.confidence >= self.min_confidence => Ok(resolution),
            Ok(resolution) => {
                debug!(
                    confidence = resolution.confidence,
                    min = self.min_confidence,
                    "resolution below minimum confidence, trying category fallback"
                );
                self.category_fallback(lat, lon).await
            }
            Err(Error::NoMerchantsFound) => self.category_fallback(lat, lon).await,
            Err(e) => Err(e),
        }
    }

    /// Category-only lookup: same upstream, no merchant identity.
    async fn category_fallback(&self, lat: f64, lon: f64) -> Result<MerchantResolution> {
        let candidates = self
            .places
            .nearby(lat, lon)
            .await
            .map_err(|e| {
                warn!("category fallback failed: {}", e);
                Error::NoRecommendation(e.to_string())
            })?;

        let mapped = candidates
            .iter()
            .map(|place| map_types_to_mcc_category(&place.types))
            .find(|(_, category)| category.is_some());

        match mapped {
            Some((mcc, category)) => Ok(MerchantResolution {
                merchant: None,
                mcc,
                category,
                confidence: self.min_confidence,
            }),
            None => Err(Error::NoRecommendation(
                "no spending category at location".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use keel_core::Place;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Places stub returning a fixed candidate list and counting calls.
    struct StaticPlaces {
        places: Vec<Place>,
        calls: AtomicUsize,
    }

    impl StaticPlaces {
        fn new(places: Vec<Place>) -> Self {
            Self {
                places,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PlacesLookup for StaticPlaces {
        async fn nearby(&self, _lat: f64, _lon: f64) -> Result<Vec<Place>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.places.clone())
        }
    }

    struct FailingPlaces;

    #[async_trait]
    impl PlacesLookup for FailingPlaces {
        async fn nearby(&self, _lat: f64, _lon: f64) -> Result<Vec<Place>> {
            Err(Error::Upstream("places down".to_string()))
        }
    }

    fn place(name: &str, types: &[&str]) -> Place {
        Place {
            name: name.to_string(),
            types: types.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_resolves_top_candidate_with_mcc_confidence() {
        let places = Arc::new(StaticPlaces::new(vec![
            place("Luigi's", &["restaurant", "establishment"]),
            place("Corner Mart", &["convenience_store"]),
        ]));
        let resolver = MerchantResolver::new(places, 0.5);

        let res = resolver.resolve(37.0, -122.0).await.unwrap();
        assert_eq!(res.merchant.as_deref(), Some("Luigi's"));
        assert_eq!(res.mcc.as_deref(), Some("5812"));
        assert_eq!(res.category.as_deref(), Some("dining"));
        assert_eq!(res.confidence, 0.8);
    }

    #[tokio::test]
    async fn test_unmapped_types_get_minimum_confidence() {
        let places = Arc::new(StaticPlaces::new(vec![place(
            "Mystery Spot",
            &["tourist_attraction"],
        )]));
        let resolver = MerchantResolver::new(places, 0.5);

        let res = resolver.resolve(37.0, -122.0).await.unwrap();
        assert!(res.mcc.is_none());
        assert_eq!(res.confidence, 0.5);
    }

    #[tokio::test]
    async fn test_invalid_coordinates_never_reach_upstream() {
        let places = Arc::new(StaticPlaces::new(vec![]));
        let resolver = MerchantResolver::new(places.clone(), 0.5);

        let err = resolver.resolve(90.000001, 0.0).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_COORDINATES");
        assert_eq!(places.calls.load(Ordering::SeqCst), 0);

        let err = resolver.resolve(0.0, -180.000001).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_COORDINATES");
        assert_eq!(places.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_candidates_is_not_found() {
        let resolver = MerchantResolver::new(Arc::new(StaticPlaces::new(vec![])), 0.5);
        let err = resolver.resolve(37.0, -122.0).await.unwrap_err();
        assert_eq!(err.code(), "NO_MERCHANTS_FOUND");
    }

    #[tokio::test]
    async fn test_fallback_yields_category_without_merchant() {
        // The top candidate carries no merchant mapping, but a later one
        // has a usable category; the fallback keeps the category and drops
        // the merchant identity.
        let places = Arc::new(StaticPlaces::new(vec![
            place("Unnamed Kiosk", &["point_of_interest"]),
            place("Shell", &["gas_station"]),
        ]));
        let resolver = MerchantResolver::new(places, 0.75);

        let res = resolver.resolve_or_fallback(37.0, -122.0).await.unwrap();
        assert!(res.merchant.is_none());
        assert_eq!(res.category.as_deref(), Some("gas"));
    }

    #[tokio::test]
    async fn test_confident_resolution_skips_fallback() {
        let places = Arc::new(StaticPlaces::new(vec![place("Luigi's", &["restaurant"])]));
        let resolver = MerchantResolver::new(places.clone(), 0.5);

        let res = resolver.resolve_or_fallback(37.0, -122.0).await.unwrap();
        assert_eq!(res.merchant.as_deref(), Some("Luigi's"));
        assert_eq!(places.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fallback_failure_is_terminal() {
        let resolver = MerchantResolver::new(Arc::new(FailingPlaces), 0.5);
        let err = resolver.resolve_or_fallback(37.0, -122.0).await.unwrap_err();
        // The primary lookup failed before any fallback; the upstream error
        // propagates untouched.
        assert_eq!(err.code(), "PLACES_UPSTREAM");
    }

    #[tokio::test]
    async fn test_no_category_anywhere_is_no_recommendation() {
        let places = Arc::new(StaticPlaces::new(vec![place(
            "Unnamed Kiosk",
            &["point_of_interest"],
        )]));
        let resolver = MerchantResolver::new(places, 0.9);

        let err = resolver.resolve_or_fallback(37.0, -122.0).await.unwrap_err();
        assert_eq!(err.code(), "NO_RECOMMENDATION");
        assert!(!err.retryable());
    }
}
