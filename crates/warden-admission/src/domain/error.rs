//! Configuration errors.
//!
//! Admission itself never fails: every visit yields a decision. The only
//! error surface is rejecting a configuration that would build a degenerate
//! policy.

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A burst capacity of zero would reject every request
    #[error("invalid burst: {0}")]
    InvalidBurst(String),
    /// A zero refill interval or timeframe
    #[error("invalid interval: {0}")]
    InvalidInterval(String),
    /// Sweep period and idle TTL do not fit together
    #[error("invalid sweep schedule: {0}")]
    InvalidSweep(String),
    /// Trust policy thresholds that cannot be evaluated
    #[error("invalid trust policy: {0}")]
    InvalidPolicy(String),
}
