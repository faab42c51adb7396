//! Snapshot error types

use counterd_db::DbError;
use counterd_store::StoreError;
use thiserror::Error;

/// Errors that abort a snapshot run
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Approximate store failure; fatal on this path, unlike ingress
    #[error("approximate store error: {0}")]
    Store(#[from] StoreError),

    /// Relational writer failure
    #[error("database error: {0}")]
    Db(#[from] DbError),

    /// The store returned a different number of counts than keys requested.
    /// Indicates corruption or a scan/count disagreement we refuse to
    /// paper over.
    #[error("count length mismatch: requested {expected}, received {actual}")]
    CountMismatch { expected: usize, actual: usize },

    /// The cron expression did not parse
    #[error("invalid snapshot schedule {expression:?}: {message}")]
    InvalidSchedule { expression: String, message: String },
}
