//! Store error types

use thiserror::Error;

/// Errors from the approximate store
///
/// All variants wrap their source unchanged; callers decide whether a
/// failure is fatal (snapshot path) or logged and swallowed (ingress path).
#[derive(Debug, Error)]
pub enum StoreError {
    /// Pool construction failed (bad address, unsupported scheme)
    #[error("failed to create redis pool: {0}")]
    CreatePool(#[from] deadpool_redis::CreatePoolError),

    /// Could not check a connection out of the pool
    #[error("failed to acquire redis connection: {0}")]
    Pool(#[from] deadpool_redis::PoolError),

    /// Command or protocol failure
    #[error("redis error: {0}")]
    Redis(#[from] deadpool_redis::redis::RedisError),
}
