//! Warden gateway - HTTP front door for the admission registry.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     warden-gateway                        │
//! ├──────────────────────────────────────────────────────────┤
//! │  /health  /stats  (ungated)        static dir (optional)  │
//! │                                                           │
//! │  /api/v1/* ──→ AdmissionLayer ──→ application router      │
//! │                  │                                        │
//! │                  ├─ ClientIpResolver (peer / trusted XFF) │
//! │                  ├─ SensitivityClassifier (path markers)  │
//! │                  └─ ClientRegistry::visit                 │
//! │                        Allowed → forward                  │
//! │                        RateLimited → 429                  │
//! │                        Banned → 403                       │
//! │                                                           │
//! │  Sweeper task: decay + idle eviction every sweep_period   │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use warden_gateway::{GatewayConfig, GatewayService};
//!
//! let config = GatewayConfig::load(None)?;
//! let service = GatewayService::new(config)?;
//! service.run(GatewayService::default_api(), async {
//!     let _ = tokio::signal::ctrl_c().await;
//! }).await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod service;

pub use config::{DispatchConfig, GatewayConfig, HttpConfig, LogConfig, ProxyConfig};
pub use error::GatewayError;
pub use logging::init_tracing;
pub use middleware::{AdmissionLayer, AdmissionService, ClientIpResolver, SensitivityClassifier};
pub use service::{GatewayHandle, GatewayService};
