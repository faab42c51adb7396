//! In-memory store fake for tests
//!
//! Holds exact ID sets instead of HyperLogLogs, so counts are exact and
//! assertions deterministic.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::StoreError;
use crate::CounterStore;

/// Exact in-memory implementation of [`CounterStore`]
#[derive(Default)]
pub struct MemoryStore {
    counters: Mutex<BTreeMap<String, HashSet<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// IDs recorded under `key`, if any
    pub fn ids(&self, key: &str) -> Option<HashSet<String>> {
        self.counters.lock().get(key).cloned()
    }

    /// Whether `key` exists
    pub fn contains(&self, key: &str) -> bool {
        self.counters.lock().contains_key(key)
    }

    /// Number of keys currently held
    pub fn len(&self) -> usize {
        self.counters.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.lock().is_empty()
    }
}

#[async_trait]
impl CounterStore for MemoryStore {
    async fn update_keys(&self, keys: &[String], id: &str) -> Result<(), StoreError> {
        let mut counters = self.counters.lock();
        for key in keys {
            counters.entry(key.clone()).or_default().insert(id.to_string());
        }
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.counters.lock().keys().cloned().collect())
    }

    async fn get_counts(&self, keys: &[String]) -> Result<Vec<i64>, StoreError> {
        let counters = self.counters.lock();
        Ok(keys
            .iter()
            .map(|key| counters.get(key).map_or(0, |ids| ids.len() as i64))
            .collect())
    }

    async fn delete_keys(&self, keys: &[String]) -> Result<(), StoreError> {
        let mut counters = self.counters.lock();
        for key in keys {
            counters.remove(key);
        }
        Ok(())
    }
}
