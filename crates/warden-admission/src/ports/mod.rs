//! Ports: interfaces the registry depends on.

pub mod outbound;
