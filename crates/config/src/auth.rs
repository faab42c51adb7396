//! Bearer-token authentication configuration

use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// Authentication configuration
///
/// When `required` is set, every HTTP request must carry
/// `Authorization: Bearer <token>` with a token from `tokens`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Whether requests must be authenticated
    /// Default: false
    pub required: bool,

    /// Accepted bearer tokens
    pub tokens: Vec<String>,
}

impl AuthConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.required && self.tokens.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "auth.tokens",
                message: "at least one token is required when auth.required is set".to_string(),
            });
        }
        Ok(())
    }
}
