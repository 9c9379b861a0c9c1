//! Per-client admission state.

use crate::domain::decision::AdmissionDecision;
use crate::domain::limiter::TokenBucketLimiter;
use crate::domain::policy::{LimiterSpec, TrustPolicy};
use std::time::{Duration, Instant};

/// Limiter and trust state for one client key.
///
/// Owned by the registry behind a per-record lock; every method assumes the
/// caller holds it.
#[derive(Debug)]
pub struct ClientRecord {
    key: String,
    limiter: TokenBucketLimiter,
    created_at: Instant,
    last_seen: Instant,
    trust_score: u32,
}

impl ClientRecord {
    /// Record for a client seen for the first time at `now`.
    pub fn fresh(key: impl Into<String>, is_sensitive: bool, policy: &TrustPolicy, now: Instant) -> Self {
        let (trust_score, spec) = policy.fresh(is_sensitive);
        Self {
            key: key.into(),
            limiter: spec.build(now),
            created_at: now,
            last_seen: now,
            trust_score,
        }
    }

    /// Apply the trust-adjustment rule for a repeat visit and touch `last_seen`.
    ///
    /// Returns the new limiter parameters when the visit triggered a
    /// recalibration.
    pub fn revisit(&mut self, is_sensitive: bool, policy: &TrustPolicy, now: Instant) -> Option<LimiterSpec> {
        let mut recalibrated = None;
        if is_sensitive {
            self.trust_score = self.trust_score.saturating_add(1);
            if let Some(spec) = policy.recalibration(self.trust_score) {
                self.limiter = spec.build(now);
                recalibrated = Some(spec);
            }
        }
        if now > self.last_seen {
            self.last_seen = now;
        }
        recalibrated
    }

    /// Ban check, then one token from the current limiter.
    pub fn admit(&mut self, policy: &TrustPolicy, now: Instant) -> AdmissionDecision {
        if policy.is_banned(self.trust_score) {
            return AdmissionDecision::Banned;
        }
        if self.limiter.try_consume_at(now) {
            AdmissionDecision::Allowed
        } else {
            AdmissionDecision::RateLimited
        }
    }

    /// One sweep's worth of forgiveness.
    pub fn decay(&mut self, policy: &TrustPolicy) {
        self.trust_score = policy.decay(self.trust_score);
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn trust_score(&self) -> u32 {
        self.trust_score
    }

    pub fn last_seen(&self) -> Instant {
        self.last_seen
    }

    pub fn limiter(&self) -> &TokenBucketLimiter {
        &self.limiter
    }

    pub fn snapshot(&self) -> ClientSnapshot {
        ClientSnapshot {
            key: self.key.clone(),
            trust_score: self.trust_score,
            refill_interval: self.limiter.refill_interval(),
            burst: self.limiter.burst(),
            created_at: self.created_at,
            last_seen: self.last_seen,
        }
    }
}

/// Point-in-time copy of a [`ClientRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSnapshot {
    pub key: String,
    pub trust_score: u32,
    pub refill_interval: Duration,
    pub burst: u32,
    pub created_at: Instant,
    pub last_seen: Instant,
}
