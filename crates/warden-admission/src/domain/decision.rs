//! Admission decision returned by [`ClientRegistry::visit`](crate::ClientRegistry::visit).

use std::fmt;

/// Outcome of offering one request to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdmissionDecision {
    /// Proceed to routing.
    Allowed,
    /// The client's limiter is out of tokens.
    RateLimited,
    /// The client's trust score is at or above the ban threshold.
    Banned,
}

impl AdmissionDecision {
    /// True only for [`AdmissionDecision::Allowed`].
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Stable lowercase label, used in logs and stats.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allowed => "allowed",
            Self::RateLimited => "rate_limited",
            Self::Banned => "banned",
        }
    }
}

impl fmt::Display for AdmissionDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
