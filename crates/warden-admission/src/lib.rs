//! # Warden Admission - adaptive per-client admission control.
//!
//! Every inbound request is offered to the [`ClientRegistry`] before it reaches
//! application logic. The registry keeps one [`ClientRecord`] per client key:
//! a token-bucket limiter plus a trust score that grows with sensitive traffic,
//! tightens the limiter in discrete steps, bans the client past a threshold and
//! decays back down on a periodic sweep.
//!
//! ## Architecture
//!
//! ```text
//!   dispatcher ──visit(key, sensitive)──→ ClientRegistry ──→ AdmissionDecision
//!                                              │
//!                         ┌────────────────────┼─────────────────────┐
//!                         ▼                    ▼                     ▼
//!                  DashMap<key, record>   TrustPolicy          TimeSource
//!                         │               (pure rules)         (port)
//!                         ▼
//!              Mutex<ClientRecord> ──→ TokenBucketLimiter
//!
//!   Sweeper (tokio task) ──every period──→ ClientRegistry::sweep()
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use warden_admission::{AdmissionConfig, AdmissionDecision, ClientRegistry, Sweeper};
//!
//! let config = AdmissionConfig::default();
//! let registry = Arc::new(ClientRegistry::new(config.clone())?);
//! let sweeper = Sweeper::spawn(Arc::clone(&registry), config.sweep_period);
//!
//! match registry.visit("10.0.0.1", false) {
//!     AdmissionDecision::Allowed => { /* route the request */ }
//!     AdmissionDecision::RateLimited => { /* 429 */ }
//!     AdmissionDecision::Banned => { /* 403 */ }
//! }
//!
//! sweeper.shutdown().await;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod domain;
pub mod ports;
pub mod registry;
pub mod sweeper;
pub mod testing;

pub use domain::config::AdmissionConfig;
pub use domain::decision::AdmissionDecision;
pub use domain::error::ConfigError;
pub use domain::limiter::TokenBucketLimiter;
pub use domain::policy::TrustPolicy;
pub use domain::record::{ClientRecord, ClientSnapshot};
pub use domain::stats::{AdmissionStats, StatsSnapshot};
pub use ports::outbound::{SystemTimeSource, TimeSource};
pub use registry::{ClientRegistry, SweepReport};
pub use sweeper::{Sweeper, SweeperHandle};
