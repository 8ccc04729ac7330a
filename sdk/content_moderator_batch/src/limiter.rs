//! Rate limiters that pace calls to stay inside a subscription's quota.
//!
//! Every moderation request in a batch passes through a [`RateLimiter`]
//! before it is sent. [`FixedDelay`] enforces a minimum spacing between
//! consecutive requests, which matches the one-request-per-second quota of
//! free-tier subscriptions. [`TokenBucket`] allows short bursts while
//! keeping the same average rate, which suits paid tiers with higher
//! per-second quotas.

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::{BatchError, BatchResult};

/// Admission control for outbound moderation requests.
///
/// `acquire` returns once the caller may send a request; it never fails,
/// it only waits.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn acquire(&self);
}

/// Enforces a minimum spacing between consecutive acquisitions.
///
/// The first acquisition never waits. A spacing of [`Duration::ZERO`]
/// disables pacing entirely.
#[derive(Debug)]
pub struct FixedDelay {
    spacing: Duration,
    last: Mutex<Option<Instant>>,
}

impl FixedDelay {
    pub fn new(spacing: Duration) -> Self {
        Self {
            spacing,
            last: Mutex::new(None),
        }
    }
}

#[async_trait]
impl RateLimiter for FixedDelay {
    async fn acquire(&self) {
        if self.spacing.is_zero() {
            return;
        }

        // Reserve the next send slot under the lock, then sleep outside it
        // so a long wait does not block other acquirers from reserving.
        let wait = {
            let mut last = self.last.lock().await;
            let now = Instant::now();
            let ready_at = match *last {
                Some(previous) => (previous + self.spacing).max(now),
                None => now,
            };
            *last = Some(ready_at);
            ready_at.saturating_duration_since(now)
        };

        if !wait.is_zero() {
            tracing::trace!(wait_ms = wait.as_millis() as u64, "pacing request");
            tokio::time::sleep(wait).await;
        }
    }
}

/// Token-bucket limiter allowing bursts up to `burst` requests while
/// holding an average of `rate_per_sec` requests per second.
#[derive(Debug)]
pub struct TokenBucket {
    rate_per_sec: f64,
    burst: f64,
    state: Mutex<BucketState>,
}

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    refilled_at: Instant,
}

impl TokenBucket {
    /// Creates a bucket that starts full.
    ///
    /// Fails if `rate_per_sec` is not a positive finite number or `burst`
    /// is zero.
    pub fn new(rate_per_sec: f64, burst: u32) -> BatchResult<Self> {
        if !rate_per_sec.is_finite() || rate_per_sec <= 0.0 {
            return Err(BatchError::Builder(format!(
                "rate_per_sec must be a positive finite number, got {rate_per_sec}"
            )));
        }
        if burst == 0 {
            return Err(BatchError::Builder(
                "burst must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            rate_per_sec,
            burst: f64::from(burst),
            state: Mutex::new(BucketState {
                tokens: f64::from(burst),
                refilled_at: Instant::now(),
            }),
        })
    }
}

#[async_trait]
impl RateLimiter for TokenBucket {
    async fn acquire(&self) {
        // Take a token immediately, going negative if the bucket is empty.
        // The debt determines how long this acquirer waits, so concurrent
        // acquirers queue up with increasing waits instead of stampeding.
        let wait = {
            let mut state = self.state.lock().await;
            let now = Instant::now();
            let elapsed = now.saturating_duration_since(state.refilled_at);
            state.tokens =
                (state.tokens + elapsed.as_secs_f64() * self.rate_per_sec).min(self.burst);
            state.refilled_at = now;
            state.tokens -= 1.0;

            if state.tokens >= 0.0 {
                Duration::ZERO
            } else {
                Duration::from_secs_f64(-state.tokens / self.rate_per_sec)
            }
        };

        if !wait.is_zero() {
            tracing::trace!(wait_ms = wait.as_millis() as u64, "bucket empty, waiting");
            tokio::time::sleep(wait).await;
        }
    }
}
