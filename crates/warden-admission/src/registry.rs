//! # Client Registry
//!
//! Concurrent map from client key to [`ClientRecord`], and the two operations
//! that drive it: [`ClientRegistry::visit`] on every request and
//! [`ClientRegistry::sweep`] on a timer.
//!
//! ## Locking
//!
//! The map is a sharded `DashMap`; each shard lock only guards insertion,
//! removal and iteration of its keys. Each record sits behind its own mutex.
//!
//! - `visit` clones the record handle and releases the shard before locking
//!   the record, so visits to different keys never wait on each other's
//!   records.
//! - `sweep` holds a shard lock while locking each of its records in turn.
//!
//! A shard lock may be taken before a record lock, never after. A visit that
//! raced an eviction still completes against the detached record; the next
//! visit from that client starts fresh.

use crate::domain::config::AdmissionConfig;
use crate::domain::decision::AdmissionDecision;
use crate::domain::error::ConfigError;
use crate::domain::policy::TrustPolicy;
use crate::domain::record::{ClientRecord, ClientSnapshot};
use crate::domain::stats::{AdmissionStats, StatsSnapshot};
use crate::ports::outbound::{SystemTimeSource, TimeSource};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

type SharedRecord = Arc<Mutex<ClientRecord>>;

/// Outcome of one sweep pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Records whose score was decayed
    pub decayed: usize,
    /// Idle records removed
    pub evicted: usize,
}

/// Registry of per-client admission state
pub struct ClientRegistry {
    records: DashMap<String, SharedRecord>,
    policy: TrustPolicy,
    time_source: Arc<dyn TimeSource>,
    stats: AdmissionStats,
}

impl ClientRegistry {
    /// Create a registry on the system clock.
    pub fn new(config: AdmissionConfig) -> Result<Self, ConfigError> {
        Self::with_time_source(config, Arc::new(SystemTimeSource))
    }

    /// Create a registry reading time from `time_source`.
    pub fn with_time_source(
        config: AdmissionConfig,
        time_source: Arc<dyn TimeSource>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            records: DashMap::new(),
            policy: TrustPolicy::new(config),
            time_source,
            stats: AdmissionStats::new(),
        })
    }

    /// Admit or reject one request from `key`.
    ///
    /// Creates the record on first sight, applies the trust-adjustment rule on
    /// sensitive revisits, then checks the ban threshold and the limiter. The
    /// whole sequence runs under the record's lock.
    pub fn visit(&self, key: &str, is_sensitive: bool) -> AdmissionDecision {
        let now = self.time_source.now();
        let (record, fresh) = self.lookup_or_insert(key, is_sensitive, now);

        let mut record = record.lock();
        let recalibrated = if fresh {
            None
        } else {
            record.revisit(is_sensitive, &self.policy, now)
        };
        let decision = record.admit(&self.policy, now);
        let trust_score = record.trust_score();
        drop(record);

        // Logging happens after the record lock is released.
        if let Some(spec) = recalibrated {
            self.stats.record_recalibration();
            info!(
                client = key,
                trust_score = trust_score,
                trust = self.policy.trust_factor(trust_score),
                refill_interval_ms = spec.refill_interval.as_millis() as u64,
                "Recalibrated client limiter"
            );
        }
        self.stats.record_decision(decision);
        debug!(
            client = key,
            sensitive = is_sensitive,
            fresh = fresh,
            trust_score = trust_score,
            decision = %decision,
            "Client visit"
        );
        decision
    }

    /// Decay every score and forget idle clients.
    pub fn sweep(&self) -> SweepReport {
        let now = self.time_source.now();
        let mut report = SweepReport::default();

        self.records.retain(|key, record| {
            let mut record = record.lock();
            record.decay(&self.policy);
            report.decayed += 1;

            if self.policy.is_idle(record.last_seen(), now) {
                debug!(client = %key, "Evicting idle client");
                report.evicted += 1;
                false
            } else {
                true
            }
        });

        self.stats.record_sweep(report.evicted as u64);
        debug!(
            decayed = report.decayed,
            evicted = report.evicted,
            remaining = self.records.len(),
            "Sweep complete"
        );
        report
    }

    /// Copy of the record for `key`, if tracked.
    pub fn snapshot(&self, key: &str) -> Option<ClientSnapshot> {
        let record = self.records.get(key).map(|r| Arc::clone(r.value()))?;
        let snapshot = record.lock().snapshot();
        Some(snapshot)
    }

    /// Drop the record for `key`. Returns whether it was tracked.
    pub fn forget(&self, key: &str) -> bool {
        let removed = self.records.remove(key).is_some();
        if removed {
            info!(client = key, "Client record removed");
        }
        removed
    }

    pub fn contains(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    /// Number of tracked clients
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot(self.records.len())
    }

    pub fn config(&self) -> &AdmissionConfig {
        self.policy.config()
    }

    /// Existing record for `key`, or a freshly inserted one. The flag is true
    /// when this call created it.
    fn lookup_or_insert(&self, key: &str, is_sensitive: bool, now: Instant) -> (SharedRecord, bool) {
        if let Some(existing) = self.records.get(key) {
            return (Arc::clone(existing.value()), false);
        }

        match self.records.entry(key.to_string()) {
            Entry::Occupied(entry) => (Arc::clone(entry.get()), false),
            Entry::Vacant(entry) => {
                let record = Arc::new(Mutex::new(ClientRecord::fresh(
                    key,
                    is_sensitive,
                    &self.policy,
                    now,
                )));
                entry.insert(Arc::clone(&record));
                (record, true)
            }
        }
    }
}

impl std::fmt::Debug for ClientRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientRegistry")
            .field("clients", &self.records.len())
            .field("policy", &self.policy)
            .finish()
    }
}
