//! Logging setup
//!
//! The library only emits `tracing` events; binaries decide where they go.

use crate::{Error, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Build the filter: `RUST_LOG` wins, then `fallback`
pub fn env_filter(fallback: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(fallback)
            .map_err(|e| Error::Config(format!("Invalid log filter '{}': {}", fallback, e))),
    }
}

/// Install a stderr subscriber for the process
///
/// Calling this more than once is harmless; later calls keep the first
/// subscriber.
pub fn init(fallback: &str) -> Result<()> {
    let filter = env_filter(fallback)?;
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    // try_init fails only when a global subscriber already exists
    let _ = Registry::default().with(filter).with(layer).try_init();
    Ok(())
}
