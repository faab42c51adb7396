//! CLI subcommands

pub mod dbinit;
pub mod server;
pub mod sim;
pub mod snapshot;

use std::path::PathBuf;

use anyhow::{Context, Result};
use counterd_config::Config;

/// Load configuration from the given path, or defaults when omitted
pub fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to load configuration file {}", path.display())),
        None => Ok(Config::default()),
    }
}
