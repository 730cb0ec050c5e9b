//! Consumer client for the keel API.
//!
//! [`KeelClient`] wraps the remote `/v1` surface with the bounded
//! retry/backoff policy: retry only on transport failures or errors the
//! server marks `retryable:true`, never on 4xx business errors.
//! [`Recommender`] composes the calls into the confidence-gated visit
//! pipeline. Dropping its future abandons the consumer call only; the
//! server-side record and any in-flight upstream work are unaffected.

mod client;
mod error;
mod recommend;
mod retry;

pub use client::KeelClient;
pub use error::ClientError;
pub use recommend::{Outcome, Recommender};
pub use retry::RetryPolicy;
