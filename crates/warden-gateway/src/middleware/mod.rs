//! Tower middleware for the gateway.

pub mod admission;
pub mod classify;
pub mod client_ip;

pub use admission::{AdmissionLayer, AdmissionService};
pub use classify::SensitivityClassifier;
pub use client_ip::ClientIpResolver;
