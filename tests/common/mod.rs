//! Shared test infrastructure for daenet integration tests.
//!
//! Provides FakeDevice (an in-process DAEnetIP2 SNMP agent) and fixtures.

// Allow dead code and unused imports since not all test files use all utilities
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod agent;
pub mod fixtures;

pub use agent::FakeDevice;
pub use fixtures::*;

/// Route `daenet` logs to the test output. Set `RUST_LOG` to see them.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
