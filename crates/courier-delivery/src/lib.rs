//! courier-delivery: rate-limited webhook transport.
//!
//! Payloads flow: shaping (courier-core) → [`Dispatcher`] worker pool →
//! [`Uploader`] → endpoint, with every request paced by one shared
//! [`RateLimiter`] and throttled sends retried per [`RetryPolicy`].

pub mod dispatch;
pub mod limiter;
pub mod retry;
pub mod webhook;

pub use dispatch::{BatchSummary, Dispatcher};
pub use limiter::RateLimiter;
pub use retry::RetryPolicy;
pub use webhook::{ChunkOutcome, DeliveryError, FileOutcome, Uploader};
