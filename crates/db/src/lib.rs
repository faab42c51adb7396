//! Relational writer
//!
//! Snapshots land in two postgresql tables: `attributes_domain`, the set of
//! every attribute/value pair ever observed (for UI enumeration), and
//! `counters`, one row per (interval, date, attributes) bucket holding the
//! estimated distinct count.
//!
//! Both writes are idempotent and chunked. Counter rows are monotonic: the
//! upsert takes `GREATEST(existing, incoming)`, so an estimate read from a
//! racing snapshot can never regress a persisted count. Two bounded recency
//! caches elide rows the database already holds, damping write
//! amplification across snapshot runs.
//!
//! The [`CounterWriter`] trait is the seam used by the snapshotter;
//! [`test_utils::MemoryWriter`] substitutes an in-memory fake.

mod cache;
mod error;
mod postgres;
pub mod test_utils;

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use counterd_keys::ParsedKey;

pub use error::DbError;
pub use postgres::PgDatabase;

/// Union of observed attribute values, keyed by attribute
pub type DomainMap = BTreeMap<String, BTreeSet<String>>;

/// Operations the snapshotter needs from the relational store
#[async_trait]
pub trait CounterWriter: Send + Sync {
    /// Register every attribute/value pair in `domain`
    async fn upsert_domain(&self, domain: &DomainMap) -> Result<(), DbError>;

    /// Persist counter values, monotonically updating existing rows
    async fn upsert_counters(&self, counters: &[ParsedKey]) -> Result<(), DbError>;
}
