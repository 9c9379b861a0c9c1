//! # Trust Policy
//!
//! Pure rules governing how a client's trust score and limiter evolve. The
//! registry applies them under the record lock; nothing here touches shared
//! state.
//!
//! ## Rules
//!
//! - Fresh client: sensitive first request starts at score 2 with one token per
//!   200ms, otherwise score 0 with one token per 100ms. Burst 5 either way.
//! - Each sensitive revisit adds one point. When the new score is a multiple
//!   of 10 the limiter is rebuilt with interval `timeframe / trust`, where
//!   `trust = 10 / score` and `timeframe` is one hour. Once `trust` rounds down
//!   to zero the timeframe drops to five minutes and `trust` is pinned to 1.
//! - A score at or above 50 is banned.
//! - Every sweep removes 5 points, never going below zero.

use crate::domain::config::AdmissionConfig;
use crate::domain::limiter::TokenBucketLimiter;
use std::time::{Duration, Instant};

/// Limiter parameters chosen by the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimiterSpec {
    /// Time per token
    pub refill_interval: Duration,
    /// Maximum tokens held
    pub burst: u32,
}

impl LimiterSpec {
    /// Build a full limiter with these parameters, anchored at `now`.
    pub fn build(self, now: Instant) -> TokenBucketLimiter {
        TokenBucketLimiter::new_at(self.refill_interval, self.burst, now)
    }
}

/// Trust-scoring policy
#[derive(Debug, Clone)]
pub struct TrustPolicy {
    config: AdmissionConfig,
}

impl TrustPolicy {
    pub fn new(config: AdmissionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AdmissionConfig {
        &self.config
    }

    /// Initial score and limiter for a never-seen client.
    pub fn fresh(&self, is_sensitive: bool) -> (u32, LimiterSpec) {
        if is_sensitive {
            (
                self.config.sensitive_start_score,
                LimiterSpec {
                    refill_interval: self.config.sensitive_start_interval,
                    burst: self.config.start_burst,
                },
            )
        } else {
            (
                0,
                LimiterSpec {
                    refill_interval: self.config.neutral_start_interval,
                    burst: self.config.start_burst,
                },
            )
        }
    }

    /// Limiter to install after a score increment, if `score` lands on a
    /// recalibration step.
    pub fn recalibration(&self, score: u32) -> Option<LimiterSpec> {
        if score == 0 || score % self.config.recalibration_step != 0 {
            return None;
        }

        let (timeframe, trust) = match self.config.trust_numerator / score {
            0 => (self.config.floor_timeframe, 1),
            trust => (self.config.base_timeframe, trust),
        };

        Some(LimiterSpec {
            refill_interval: timeframe / trust,
            burst: self.config.recalibrated_burst,
        })
    }

    /// Trust factor that produced a recalibration, for logging.
    pub fn trust_factor(&self, score: u32) -> u32 {
        match score {
            0 => self.config.trust_numerator,
            s => (self.config.trust_numerator / s).max(1),
        }
    }

    /// Score after one sweep.
    pub fn decay(&self, score: u32) -> u32 {
        score.saturating_sub(self.config.decay_per_sweep)
    }

    pub fn is_banned(&self, score: u32) -> bool {
        score >= self.config.ban_threshold
    }

    /// Whether a client last seen at `last_seen` should be forgotten at `now`.
    pub fn is_idle(&self, last_seen: Instant, now: Instant) -> bool {
        now.saturating_duration_since(last_seen) >= self.config.idle_ttl
    }
}

impl Default for TrustPolicy {
    fn default() -> Self {
        Self::new(AdmissionConfig::default())
    }
}
