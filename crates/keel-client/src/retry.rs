//! Retry/backoff policy for remote calls.

use std::time::Duration;

use keel_core::defaults;

/// Bounded retry policy: exponential backoff, capped attempts, per-call
/// timeouts so a hung upstream cannot stall the pipeline.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Backoff before the second attempt; doubles each attempt.
    pub initial_backoff: Duration,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: defaults::RETRY_MAX_ATTEMPTS,
            initial_backoff: Duration::from_millis(defaults::RETRY_INITIAL_BACKOFF_MS),
            connect_timeout: Duration::from_secs(defaults::CLIENT_CONNECT_TIMEOUT_SECS),
            request_timeout: Duration::from_millis(defaults::CLIENT_REQUEST_TIMEOUT_MS),
        }
    }
}

impl RetryPolicy {
    /// Backoff to sleep after a failed `attempt` (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.initial_backoff * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}
