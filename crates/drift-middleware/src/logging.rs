//! Tracing setup for reconciliation runs
//!
//! Stage decisions (drops, expansions, id rewrites) are emitted at `debug`
//! by this workspace's crates. Dependencies stay at `warn` unless `RUST_LOG`
//! says otherwise.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const WORKSPACE_TARGETS: [&str; 2] = ["drift_middleware", "drift_resource"];

/// Filter directive raising the workspace crates to `level`.
pub fn directive_for(level: &str) -> String {
    WORKSPACE_TARGETS
        .iter()
        .fold(String::from("warn"), |acc, target| format!("{acc},{target}={level}"))
}

/// Install the global subscriber at `info`.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_with_default("info")
}

/// Install the global subscriber, using `level` for the workspace crates
/// when `RUST_LOG` is unset. Output goes to stderr.
pub fn init_with_default(level: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(directive_for(level))?,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init()?;

    Ok(())
}
