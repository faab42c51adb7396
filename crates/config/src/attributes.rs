//! Attribute filtering configuration

use serde::Deserialize;

/// Attribute filtering configuration
///
/// A non-empty whitelist keeps only the listed attribute keys; a non-empty
/// blacklist then drops the listed keys. Both lists are sorted by the
/// loader.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AttributesConfig {
    /// Attribute keys to keep; empty keeps everything
    pub whitelist: Vec<String>,

    /// Attribute keys to drop
    pub blacklist: Vec<String>,
}
