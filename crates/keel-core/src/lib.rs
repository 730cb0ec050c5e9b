//! Core types, traits, and decision logic for keel.
//!
//! This crate holds everything shared between the HTTP server and the
//! consumer client: the domain models, the error taxonomy with its wire
//! codes, the confidence scorer, the rewards ranking engine, and the trait
//! seams behind which storage and the places upstream are plugged in.

pub mod confidence;
pub mod defaults;
pub mod error;
pub mod models;
pub mod rewards;
pub mod traits;

pub use confidence::{score, ConfidenceResult, RECOMMEND_GATE};
pub use error::{Error, Result};
pub use models::{
    validate_coordinates, CardCandidate, CardRecommendation, ErrorDetail, ErrorEnvelope,
    MerchantResolution, Place, RemoteConfig, ScoreRequest, ScoreResponse, VisitEventBody,
    VisitResponse, VisitSignal, VisitStatus,
};
pub use rewards::{RewardRule, RewardsTable};
pub use traits::{IdempotencyStore, PlacesLookup};
