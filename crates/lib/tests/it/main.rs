//! Integration test suite.
//!
//! Organized as a single integration-test binary: each area of the public
//! API gets its own module, sharing the factories in `helpers`.

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("watchtree=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod bridge;
mod helpers;
mod store;
