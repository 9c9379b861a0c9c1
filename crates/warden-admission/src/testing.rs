//! Test utilities shared by unit and integration tests.

use crate::ports::outbound::TimeSource;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Clock that only moves when told to.
///
/// Clones share the same offset, so a test can keep one handle and give
/// another to the registry.
#[derive(Debug, Clone)]
pub struct ManualTimeSource {
    origin: Instant,
    offset_nanos: Arc<AtomicU64>,
}

impl ManualTimeSource {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset_nanos: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let nanos = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.offset_nanos.fetch_add(nanos, Ordering::SeqCst);
    }

    /// Time elapsed since the clock was created.
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.offset_nanos.load(Ordering::SeqCst))
    }
}

impl Default for ManualTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }
}
