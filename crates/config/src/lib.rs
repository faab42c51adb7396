//! counterd configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! A missing section yields a working local configuration - only specify
//! what you need to change.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use counterd_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("listen_address = \"0.0.0.0:8001\"").unwrap();
//! ```
//!
//! # Example Full Config
//!
//! ```toml
//! listen_address = "127.0.0.1:8001"
//! redis_address = "redis://127.0.0.1:6379"
//! postgresql_address = "postgres://postgres@localhost/postgres?sslmode=disable"
//!
//! [snapshot]
//! cron = "0 0 * * * *"
//! update_threshold = "3h"
//! delete_threshold = "2232h"
//!
//! [auth]
//! required = true
//! tokens = ["1234", "2345"]
//!
//! [attributes]
//! whitelist = ["name", "color"]
//! blacklist = ["src", "ip"]
//! ```

mod attributes;
mod auth;
mod error;
mod snapshot;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use attributes::AttributesConfig;
pub use auth::AuthConfig;
pub use error::{ConfigError, Result};
pub use snapshot::SnapshotConfig;

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP listener address
    /// Default: "127.0.0.1:8001"
    pub listen_address: String,

    /// Address of the redis server
    /// Default: "redis://127.0.0.1:6379"
    pub redis_address: String,

    /// Address of the postgresql server
    /// Default: "postgres://postgres@localhost/postgres?sslmode=disable"
    pub postgresql_address: String,

    /// Snapshot scheduling and retention
    pub snapshot: SnapshotConfig,

    /// Bearer-token authentication
    pub auth: AuthConfig,

    /// Attribute whitelist/blacklist filtering
    pub attributes: AttributesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_address: "127.0.0.1:8001".to_string(),
            redis_address: "redis://127.0.0.1:6379".to_string(),
            postgresql_address: "postgres://postgres@localhost/postgres?sslmode=disable"
                .to_string(),
            snapshot: SnapshotConfig::default(),
            auth: AuthConfig::default(),
            attributes: AttributesConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, contains invalid TOML, or
    /// fails validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    ///
    /// Prefer using the `FromStr` trait implementation.
    fn parse(s: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(s).map_err(ConfigError::Parse)?;

        // The attribute lists are kept sorted for deterministic presentation
        config.attributes.whitelist.sort();
        config.attributes.blacklist.sort();

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        self.snapshot.validate()?;
        self.auth.validate()?;
        Ok(())
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
