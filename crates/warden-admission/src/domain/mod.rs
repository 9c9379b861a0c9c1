//! Domain layer: the limiter primitive, the trust policy and the per-client record.

pub mod config;
pub mod decision;
pub mod error;
pub mod limiter;
pub mod policy;
pub mod record;
pub mod stats;
