//! Approximate distinct-count store
//!
//! Counter keys live in redis as HyperLogLogs: adding an event ID to a key
//! is `PFADD`, reading the estimated distinct count is `PFCOUNT`. Estimates
//! carry the usual HLL relative error (~0.8%) in fixed space, which is the
//! point - the service never stores raw events.
//!
//! The [`CounterStore`] trait is the seam between the ingress/snapshot
//! paths and redis; [`test_utils::MemoryStore`] substitutes an exact
//! in-memory fake for tests.
//!
//! All keys are namespaced with [`KEY_PREFIX`] at rest. The prefix is an
//! implementation detail of this crate: callers pass unprefixed keys and
//! receive unprefixed keys back.

mod error;
mod redis_store;
pub mod test_utils;

pub use error::StoreError;
pub use redis_store::{RedisStore, KEY_PREFIX};

use async_trait::async_trait;

/// Operations the counting service needs from the approximate store
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Add `id` to the HyperLogLog of every key, atomically
    async fn update_keys(&self, keys: &[String], id: &str) -> Result<(), StoreError>;

    /// List every counter key, deduplicated, sorted, and unprefixed
    async fn list_keys(&self) -> Result<Vec<String>, StoreError>;

    /// Estimated distinct counts for `keys`, ordered to match the input
    async fn get_counts(&self, keys: &[String]) -> Result<Vec<i64>, StoreError>;

    /// Delete a set of keys
    async fn delete_keys(&self, keys: &[String]) -> Result<(), StoreError>;
}
