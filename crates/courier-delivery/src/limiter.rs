//! Request pacing: a shared minimum interval between outbound requests.
//!
//! The endpoint applies a global rate limit per webhook, so every worker
//! sends through one limiter. Spacing request *starts* keeps a burst of
//! workers from tripping the endpoint's throttle in the first place.

use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// Enforces a minimum interval between the starts of outbound requests.
///
/// The wait and the timestamp update happen under a single lock, held
/// across the sleep. Concurrent callers therefore serialize: each interval
/// slot is claimed by exactly one caller, and the first caller never waits.
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// `requests_per_second` must be positive and finite, with a reciprocal
    /// that fits a `Duration`; the config layer validates this before a
    /// limiter is built.
    pub fn new(requests_per_second: f64) -> Self {
        Self {
            min_interval: Duration::from_secs_f64(1.0 / requests_per_second),
            last_request: Mutex::new(None),
        }
    }

    /// Block until a new request may start, then claim the slot.
    pub async fn wait_for_next_request(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                tracing::debug!(wait_ms = wait.as_millis() as u64, "pacing outbound request");
                tokio::time::sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}
