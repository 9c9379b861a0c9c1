//! Cross-crate integration flows.

pub mod flows;
pub mod gateway_e2e;
