//! Google Places lookup backend for keel.
//!
//! Implements the [`keel_core::PlacesLookup`] seam against the Places
//! Nearby Search API, with bounded timeouts and a bounded retry budget for
//! transient failures. Also hosts the place-type → MCC/category mapping.

mod google;
mod mapping;

pub use google::{GooglePlacesClient, GooglePlacesConfig, DEFAULT_PLACES_URL};
pub use mapping::map_types_to_mcc_category;
