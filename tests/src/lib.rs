//! # Warden Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/
//! │   ├── flows.rs         # registry + sweeper + gateway router, manual clock
//! │   └── gateway_e2e.rs   # real listener, real HTTP client
//! └── benches/
//!     └── visit_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p warden-tests
//! cargo bench -p warden-tests
//! ```

pub mod integration;
