//! Tracing setup

use lumen_core::{LumenError, Result};

/// Install a fmt subscriber at `level`. Returns `false` when a global
/// subscriber was already installed, in which case nothing changes.
pub fn init_tracing(level: &str) -> Result<bool> {
    let level = level
        .parse::<tracing::Level>()
        .map_err(|_| LumenError::Config(format!("unknown log level '{}'", level)))?;

    Ok(tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(true)
        .try_init()
        .is_ok())
}
