//! Snapshot pipeline
//!
//! A snapshot is one pass that materializes the approximate store's current
//! estimates into the relational store and garbage-collects aged keys:
//!
//! 1. Scan the keyspace and parse each key into structured form; invalid
//!    keys are logged and excluded.
//! 2. Partition by age into update / ignore / delete sets.
//! 3. Delete aged keys, then read counts for the update set.
//! 4. Upsert the counters and the attribute domain.
//!
//! Deletion runs before the database writes so a mid-run crash cannot
//! persist a count for a key whose deletion later fails; counts already in
//! the database are authoritative.
//!
//! At most one snapshot runs per process: [`SnapshotSchedule`] serializes
//! cron fires and an overlapping fire returns immediately instead of
//! queueing. There is no coordination with ingress - a key's count read
//! here may under-report events that arrived after the scan, which is why
//! `update_threshold` should exceed the snapshot period.

mod error;
mod scheduler;


use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use counterd_config::SnapshotConfig;
use counterd_db::{CounterWriter, DomainMap};
use counterd_keys::{parse_key_list, raw_keys, ParsedKey};
use counterd_store::CounterStore;
use tracing::{debug, info, warn};

pub use error::SnapshotError;
pub use scheduler::SnapshotSchedule;

/// Orchestrates one snapshot pass over the approximate store
pub struct Snapshotter {
    config: SnapshotConfig,
    store: Arc<dyn CounterStore>,
    db: Arc<dyn CounterWriter>,
}

impl Snapshotter {
    pub fn new(
        config: SnapshotConfig,
        store: Arc<dyn CounterStore>,
        db: Arc<dyn CounterWriter>,
    ) -> Self {
        Self { config, store, db }
    }

    /// Snapshot new data and delete old data, evaluated against `now`
    pub async fn run(&self, now: DateTime<Utc>) -> Result<(), SnapshotError> {
        let start = Instant::now();

        let keys = self.store.list_keys().await?;

        let (parsed, invalid) = parse_key_list(keys);
        if !invalid.is_empty() {
            warn!(keys = ?invalid, "found invalid keys");
        }
        debug!(keys = parsed.len(), "found valid keys");

        let update_threshold = now - self.config.update_threshold;
        let delete_threshold = now - self.config.delete_threshold;
        info!(update = %update_threshold, delete = %delete_threshold, "determined thresholds");

        let partition = partition_keys(parsed, update_threshold, delete_threshold);
        info!(
            update = partition.update.len(),
            ignore = partition.ignore.len(),
            delete = partition.delete.len(),
            "partitioned keys"
        );

        // Garbage-collect before any database write
        self.store.delete_keys(&raw_keys(&partition.delete)).await?;

        let mut update = partition.update;
        let counts = self.store.get_counts(&raw_keys(&update)).await?;
        if counts.len() != update.len() {
            return Err(SnapshotError::CountMismatch {
                expected: update.len(),
                actual: counts.len(),
            });
        }
        for (key, count) in update.iter_mut().zip(counts) {
            key.count = count;
        }

        self.db.upsert_counters(&update).await?;
        self.db.upsert_domain(&collect_domain(&update)).await?;

        info!(duration = ?start.elapsed(), "snapshot complete");
        Ok(())
    }
}

/// Result of splitting parsed keys by age
///
/// The three sets are disjoint and cover the input.
#[derive(Debug, Default)]
pub struct Partition {
    /// Could still be receiving events; re-read and persist
    pub update: Vec<ParsedKey>,
    /// Stable historical values, already persisted
    pub ignore: Vec<ParsedKey>,
    /// Older than the retention window; remove from the store
    pub delete: Vec<ParsedKey>,
}

/// Sort keys into update, ignore, and delete sets.
///
/// A key is deleted when its date predates `delete_threshold`, updated when
/// its date plus the interval lifetime is still past `update_threshold`,
/// and ignored otherwise.
pub fn partition_keys(
    keys: Vec<ParsedKey>,
    update_threshold: DateTime<Utc>,
    delete_threshold: DateTime<Utc>,
) -> Partition {
    let mut partition = Partition::default();
    for key in keys {
        if key.date < delete_threshold {
            partition.delete.push(key);
        } else if key.date + key.interval.lifetime() > update_threshold {
            partition.update.push(key);
        } else {
            partition.ignore.push(key);
        }
    }
    partition
}

/// Union the attribute/value pairs across `keys`
pub fn collect_domain(keys: &[ParsedKey]) -> DomainMap {
    let mut domain = DomainMap::new();
    for key in keys {
        for (attribute, value) in &key.attributes {
            domain
                .entry(attribute.clone())
                .or_default()
                .insert(value.clone());
        }
    }
    domain
}
