//! Snapshot scheduling and retention configuration

use std::str::FromStr;
use std::time::Duration;

use cron::Schedule;
use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// Snapshot configuration
///
/// Controls when snapshots run and how long counter keys are retained in
/// the approximate store.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Cron expression driving scheduled snapshots.
    /// Empty disables scheduling; snapshots can still be run manually.
    pub cron: String,

    /// Keys whose interval may still receive events within this window are
    /// re-read and written to the database on each snapshot.
    /// Default: 3h
    #[serde(with = "humantime_serde")]
    pub update_threshold: Duration,

    /// Keys older than this are deleted from the approximate store.
    /// Default: 2232h (3 * 31 days)
    #[serde(with = "humantime_serde")]
    pub delete_threshold: Duration,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            cron: String::new(),
            update_threshold: Duration::from_secs(3 * 3600),
            delete_threshold: Duration::from_secs(3 * 31 * 24 * 3600),
        }
    }
}

impl SnapshotConfig {
    /// Whether scheduled snapshots are enabled
    pub fn scheduled(&self) -> bool {
        !self.cron.is_empty()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.cron.is_empty() {
            Schedule::from_str(&self.cron).map_err(|e| ConfigError::InvalidValue {
                field: "snapshot.cron",
                message: e.to_string(),
            })?;
        }

        if self.update_threshold.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "snapshot.update_threshold",
                message: "must be non-zero".to_string(),
            });
        }
        if self.delete_threshold.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "snapshot.delete_threshold",
                message: "must be non-zero".to_string(),
            });
        }
        if self.update_threshold > self.delete_threshold {
            return Err(ConfigError::InvalidValue {
                field: "snapshot.update_threshold",
                message: "must not exceed snapshot.delete_threshold".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SnapshotConfig::default();
        assert!(!config.scheduled());
        assert_eq!(config.update_threshold, Duration::from_secs(3 * 3600));
        assert_eq!(
            config.delete_threshold,
            Duration::from_secs(3 * 31 * 24 * 3600)
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_valid_cron() {
        let config = SnapshotConfig {
            cron: "0 0 * * * *".to_string(),
            ..Default::default()
        };
        assert!(config.scheduled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_cron() {
        let config = SnapshotConfig {
            cron: "every hour".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_threshold() {
        let config = SnapshotConfig {
            update_threshold: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_update_exceeds_delete() {
        let config = SnapshotConfig {
            update_threshold: Duration::from_secs(100),
            delete_threshold: Duration::from_secs(10),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
