//! Retry policy for throttled sends: exponential backoff with a ceiling.
//!
//! The endpoint's throttle response names its own minimum delay; the policy
//! doubles it per retry and never waits less than the endpoint asked for.

use std::time::Duration;

/// Doubling stops here; beyond it the shift would overflow long before the
/// retry ceiling ever allows that many attempts.
const MAX_BACKOFF_SHIFT: u32 = 20;

/// Backoff schedule for throttled sends.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Throttled attempts allowed per item before giving up.
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 5 }
    }
}

impl RetryPolicy {
    /// Wait before retry number `retry_count` (0-based):
    /// `max(retry_after * 2^retry_count, retry_after)`.
    pub fn backoff(&self, retry_after: Duration, retry_count: u32) -> Duration {
        let factor = 1u32 << retry_count.min(MAX_BACKOFF_SHIFT);
        retry_after.saturating_mul(factor).max(retry_after)
    }

    /// True once `retry_count` throttled attempts have been spent.
    pub fn exhausted(&self, retry_count: u32) -> bool {
        retry_count >= self.max_retries
    }
}
