//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::error::{CliError, Result};

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Install a human-readable subscriber writing to standard error.
///
/// Standard output is reserved for the merged stream.
///
/// # Errors
///
/// Returns [`CliError::Logging`] if a global subscriber is already set.
pub fn init() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(CliError::Logging)
}
