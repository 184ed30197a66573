//! Subcommand implementations

pub mod migrate;
pub mod serve;

pub use migrate::run_migrate;
pub use serve::run_serve;

use std::path::Path;

use anyhow::{Context, Result};
use clubhouse_server::SiteConfig;

/// Layer the optional config file and environment over the defaults.
pub(crate) fn load_config(path: Option<&Path>) -> Result<SiteConfig> {
    let config = SiteConfig::load(path).context("Failed to load configuration")?;
    if let Some(path) = path {
        tracing::info!(path = %path.display(), "Configuration file loaded");
    }
    Ok(config)
}
