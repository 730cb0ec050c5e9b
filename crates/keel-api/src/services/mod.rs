//! Service layer: merchant resolution, event intake, and the stores they
//! depend on.

pub mod idempotency;
pub mod intake;
pub mod resolver;
pub mod rewards_store;

pub use idempotency::{store_from_settings, MemoryIdempotencyStore, RedisIdempotencyStore};
pub use intake::EventIntake;
pub use resolver::MerchantResolver;
pub use rewards_store::RewardsStore;
