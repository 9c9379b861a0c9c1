//! Outbound ports for the admission registry.

use std::time::Instant;

/// Time source trait for testability
pub trait TimeSource: Send + Sync {
    fn now(&self) -> Instant;
}

/// System monotonic clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
