//! # Token Bucket Limiter
//!
//! Non-blocking admission primitive: holds up to `burst` tokens, earns one
//! token per `refill_interval`, and each admitted request spends one.
//!
//! ## Accounting
//!
//! Credit is tracked in whole nanoseconds instead of fractional tokens. One
//! token costs exactly `refill_interval`, so waiting one full interval after
//! draining the bucket always earns exactly one token, with no floating-point
//! drift.

use std::time::{Duration, Instant};

/// Smallest refill interval a limiter will accept.
pub const MIN_REFILL_INTERVAL: Duration = Duration::from_millis(1);

/// Token bucket rate limiter.
///
/// Not internally synchronized: the owning [`ClientRecord`](super::record::ClientRecord)
/// serializes access through its own lock.
#[derive(Debug, Clone)]
pub struct TokenBucketLimiter {
    /// Time needed to earn one token.
    refill_interval: Duration,
    /// Maximum tokens held.
    burst: u32,
    /// Accrued credit, in nanoseconds.
    credit_nanos: u128,
    /// Last time credit was brought up to date.
    last_update: Instant,
}

impl TokenBucketLimiter {
    /// Create a full bucket, anchored at the current instant.
    ///
    /// # Parameters
    ///
    /// - `refill_interval`: time per token, clamped to [`MIN_REFILL_INTERVAL`]
    /// - `burst`: maximum tokens held, clamped to at least 1
    pub fn new(refill_interval: Duration, burst: u32) -> Self {
        Self::new_at(refill_interval, burst, Instant::now())
    }

    /// Create a full bucket anchored at `now`.
    pub fn new_at(refill_interval: Duration, burst: u32, now: Instant) -> Self {
        let refill_interval = refill_interval.max(MIN_REFILL_INTERVAL);
        let burst = burst.max(1);
        Self {
            refill_interval,
            burst,
            credit_nanos: refill_interval.as_nanos() * u128::from(burst),
            last_update: now,
        }
    }

    /// Try to take one token right now.
    ///
    /// Returns `true` if the request is admitted, `false` if rate limited.
    pub fn try_consume(&mut self) -> bool {
        self.try_consume_at(Instant::now())
    }

    /// Try to take one token at `now`.
    ///
    /// Consumes nothing on failure.
    pub fn try_consume_at(&mut self, now: Instant) -> bool {
        self.refill(now);

        let cost = self.refill_interval.as_nanos();
        if self.credit_nanos >= cost {
            self.credit_nanos -= cost;
            true
        } else {
            false
        }
    }

    /// Whole tokens available as of `now`, without consuming any.
    pub fn available_at(&self, now: Instant) -> u32 {
        let elapsed = now.saturating_duration_since(self.last_update).as_nanos();
        let credit = (self.credit_nanos + elapsed).min(self.capacity_nanos());
        // Bounded by `burst`, so the narrowing cannot truncate.
        (credit / self.refill_interval.as_nanos()) as u32
    }

    /// Time per token.
    pub fn refill_interval(&self) -> Duration {
        self.refill_interval
    }

    /// Maximum tokens held.
    pub fn burst(&self) -> u32 {
        self.burst
    }

    fn capacity_nanos(&self) -> u128 {
        self.refill_interval.as_nanos() * u128::from(self.burst)
    }

    /// Bring credit up to date. A `now` earlier than the last update earns nothing.
    fn refill(&mut self, now: Instant) {
        if now <= self.last_update {
            return;
        }
        let elapsed = now.duration_since(self.last_update).as_nanos();
        self.credit_nanos = (self.credit_nanos + elapsed).min(self.capacity_nanos());
        self.last_update = now;
    }
}
