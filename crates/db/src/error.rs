//! Database error types

use thiserror::Error;

/// Errors from the relational writer
#[derive(Debug, Error)]
pub enum DbError {
    /// Connection, statement, or transaction failure
    #[error("postgresql error: {0}")]
    Sql(#[from] sqlx::Error),

    /// Counter attributes could not be encoded as JSON
    #[error("failed to encode attributes: {0}")]
    Encode(#[from] serde_json::Error),
}
