//! Admission counters.

use crate::domain::decision::AdmissionDecision;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Registry-wide counters, updated lock-free from the hot path.
#[derive(Debug, Default)]
pub struct AdmissionStats {
    pub allowed: AtomicU64,
    pub rate_limited: AtomicU64,
    pub banned: AtomicU64,
    pub recalibrations: AtomicU64,
    pub evictions: AtomicU64,
    pub sweeps: AtomicU64,
}

impl AdmissionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a decision
    pub fn record_decision(&self, decision: AdmissionDecision) {
        let counter = match decision {
            AdmissionDecision::Allowed => &self.allowed,
            AdmissionDecision::RateLimited => &self.rate_limited,
            AdmissionDecision::Banned => &self.banned,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_recalibration(&self) {
        self.recalibrations.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a completed sweep and how many clients it forgot
    pub fn record_sweep(&self, evicted: u64) {
        self.sweeps.fetch_add(1, Ordering::Relaxed);
        self.evictions.fetch_add(evicted, Ordering::Relaxed);
    }

    /// Copy the counters, pairing them with the live client count.
    pub fn snapshot(&self, tracked_clients: usize) -> StatsSnapshot {
        StatsSnapshot {
            tracked_clients,
            allowed: self.allowed.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
            banned: self.banned.load(Ordering::Relaxed),
            recalibrations: self.recalibrations.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            sweeps: self.sweeps.load(Ordering::Relaxed),
        }
    }
}

/// Serializable copy of [`AdmissionStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub tracked_clients: usize,
    pub allowed: u64,
    pub rate_limited: u64,
    pub banned: u64,
    pub recalibrations: u64,
    pub evictions: u64,
    pub sweeps: u64,
}

impl StatsSnapshot {
    /// Total decisions handed out
    pub fn decisions(&self) -> u64 {
        self.allowed + self.rate_limited + self.banned
    }
}
