//! Admission configuration with validation.
//!
//! Defaults reproduce the stock trust policy: ban at 50, recalibrate every 10
//! points, decay 5 points per one-minute sweep, forget clients idle for five
//! minutes.

use crate::domain::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Admission control configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdmissionConfig {
    /// Score at or above which a client is rejected outright
    pub ban_threshold: u32,
    /// Recalibrate the limiter whenever the score is a multiple of this
    pub recalibration_step: u32,
    /// Numerator of the trust factor (`trust = numerator / score`)
    pub trust_numerator: u32,
    /// Timeframe divided by the trust factor
    #[serde(with = "humantime_serde")]
    pub base_timeframe: Duration,
    /// Timeframe used once the trust factor rounds down to zero
    #[serde(with = "humantime_serde")]
    pub floor_timeframe: Duration,
    /// Burst capacity of recalibrated limiters
    pub recalibrated_burst: u32,
    /// Initial score of a client whose first request is sensitive
    pub sensitive_start_score: u32,
    /// Initial refill interval of a client whose first request is sensitive
    #[serde(with = "humantime_serde")]
    pub sensitive_start_interval: Duration,
    /// Initial refill interval of a client whose first request is ordinary
    #[serde(with = "humantime_serde")]
    pub neutral_start_interval: Duration,
    /// Burst capacity of a fresh client's limiter
    pub start_burst: u32,
    /// Points removed from every score per sweep
    pub decay_per_sweep: u32,
    /// Time between sweeps
    #[serde(with = "humantime_serde")]
    pub sweep_period: Duration,
    /// Clients idle at least this long are forgotten by the next sweep
    #[serde(with = "humantime_serde")]
    pub idle_ttl: Duration,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            ban_threshold: 50,
            recalibration_step: 10,
            trust_numerator: 10,
            base_timeframe: Duration::from_secs(60 * 60),
            floor_timeframe: Duration::from_secs(60 * 60 / 12),
            recalibrated_burst: 5,
            sensitive_start_score: 2,
            sensitive_start_interval: Duration::from_secs(1) / 5,
            neutral_start_interval: Duration::from_secs(1) / 10,
            start_burst: 5,
            decay_per_sweep: 5,
            sweep_period: Duration::from_secs(60),
            idle_ttl: Duration::from_secs(5 * 60),
        }
    }
}

impl AdmissionConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_burst == 0 {
            return Err(ConfigError::InvalidBurst("start_burst cannot be 0".into()));
        }
        if self.recalibrated_burst == 0 {
            return Err(ConfigError::InvalidBurst(
                "recalibrated_burst cannot be 0".into(),
            ));
        }

        let intervals = [
            ("sensitive_start_interval", self.sensitive_start_interval),
            ("neutral_start_interval", self.neutral_start_interval),
            ("base_timeframe", self.base_timeframe),
            ("floor_timeframe", self.floor_timeframe),
        ];
        for (name, value) in intervals {
            if value.is_zero() {
                return Err(ConfigError::InvalidInterval(format!("{} cannot be 0", name)));
            }
        }

        if self.sweep_period.is_zero() {
            return Err(ConfigError::InvalidSweep("sweep_period cannot be 0".into()));
        }
        if self.idle_ttl < self.sweep_period {
            return Err(ConfigError::InvalidSweep(format!(
                "idle_ttl ({:?}) is shorter than sweep_period ({:?})",
                self.idle_ttl, self.sweep_period
            )));
        }

        if self.ban_threshold == 0 {
            return Err(ConfigError::InvalidPolicy("ban_threshold cannot be 0".into()));
        }
        if self.recalibration_step == 0 {
            return Err(ConfigError::InvalidPolicy(
                "recalibration_step cannot be 0".into(),
            ));
        }
        if self.trust_numerator == 0 {
            return Err(ConfigError::InvalidPolicy(
                "trust_numerator cannot be 0".into(),
            ));
        }

        Ok(())
    }
}

/// Humanized `Duration` serialization: `"200ms"`, `"60s"`, `"5m"`, `"1h"`.
///
/// Sub-millisecond values are written in `us` or `ns` so nothing is lost.
pub mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Largest unit that represents the value exactly.
        let text = match duration.subsec_nanos() {
            0 => format!("{}s", duration.as_secs()),
            n if n % 1_000_000 == 0 => format!("{}ms", duration.as_millis()),
            n if n % 1_000 == 0 => format!("{}us", duration.as_micros()),
            _ => format!("{}ns", duration.as_nanos()),
        };
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    /// Parse a humanized duration. A bare number is taken as seconds.
    pub fn parse_duration(s: &str) -> Result<Duration, &'static str> {
        let s = s.trim();
        // Two-letter suffixes before "s"
        if let Some(ns) = s.strip_suffix("ns") {
            ns.trim()
                .parse::<u64>()
                .map(Duration::from_nanos)
                .map_err(|_| "invalid nanoseconds")
        } else if let Some(us) = s.strip_suffix("us") {
            us.trim()
                .parse::<u64>()
                .map(Duration::from_micros)
                .map_err(|_| "invalid microseconds")
        } else if let Some(ms) = s.strip_suffix("ms") {
            ms.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| "invalid milliseconds")
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid seconds")
        } else if let Some(mins) = s.strip_suffix('m') {
            mins.trim()
                .parse::<u64>()
                .ok()
                .and_then(|m| m.checked_mul(60))
                .map(Duration::from_secs)
                .ok_or("invalid minutes")
        } else if let Some(hours) = s.strip_suffix('h') {
            hours
                .trim()
                .parse::<u64>()
                .ok()
                .and_then(|h| h.checked_mul(3600))
                .map(Duration::from_secs)
                .ok_or("invalid hours")
        } else {
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid duration format")
        }
    }
}
