//! In-memory writer fake for tests
//!
//! Mirrors the relational semantics: domain merge is a set union, counter
//! upserts are monotonic on (interval, date, attributes).

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use counterd_keys::{Interval, ParsedKey};
use parking_lot::Mutex;

use crate::error::DbError;
use crate::{CounterWriter, DomainMap};

/// One persisted counter row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryCounter {
    pub interval: Interval,
    pub date: DateTime<Utc>,
    pub attributes: BTreeMap<String, String>,
    pub count: i64,
}

impl MemoryCounter {
    fn matches(&self, other: &MemoryCounter) -> bool {
        self.interval == other.interval
            && self.date == other.date
            && self.attributes == other.attributes
    }
}

/// In-memory implementation of [`CounterWriter`]
#[derive(Default)]
pub struct MemoryWriter {
    domain: Mutex<DomainMap>,
    counters: Mutex<Vec<MemoryCounter>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current domain contents
    pub fn domain(&self) -> DomainMap {
        self.domain.lock().clone()
    }

    /// Current counter rows
    pub fn counters(&self) -> Vec<MemoryCounter> {
        self.counters.lock().clone()
    }

    /// The persisted count for a raw key's bucket, if any
    pub fn count_for(&self, key: &ParsedKey) -> Option<i64> {
        let probe = MemoryCounter {
            interval: key.interval,
            date: key.date,
            attributes: key.attributes.clone(),
            count: 0,
        };
        self.counters
            .lock()
            .iter()
            .find(|existing| existing.matches(&probe))
            .map(|existing| existing.count)
    }
}

#[async_trait]
impl CounterWriter for MemoryWriter {
    async fn upsert_domain(&self, domain: &DomainMap) -> Result<(), DbError> {
        let mut existing = self.domain.lock();
        for (attribute, values) in domain {
            existing
                .entry(attribute.clone())
                .or_default()
                .extend(values.iter().cloned());
        }
        Ok(())
    }

    async fn upsert_counters(&self, counters: &[ParsedKey]) -> Result<(), DbError> {
        let mut existing = self.counters.lock();
        'outer: for key in counters {
            let incoming = MemoryCounter {
                interval: key.interval,
                date: key.date,
                attributes: key.attributes.clone(),
                count: key.count,
            };

            for row in existing.iter_mut() {
                if row.matches(&incoming) {
                    // Monotonic update only
                    if incoming.count > row.count {
                        row.count = incoming.count;
                    }
                    continue 'outer;
                }
            }
            existing.push(incoming);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use counterd_keys::parse_key;

    #[tokio::test]
    async fn test_counter_upsert_is_monotonic() {
        let writer = MemoryWriter::new();

        let mut key = parse_key("day:2017-01-18:foo:bar").unwrap();
        key.count = 10;
        writer.upsert_counters(std::slice::from_ref(&key)).await.unwrap();
        assert_eq!(writer.count_for(&key), Some(10));

        // A lower estimate must not regress the row
        key.count = 5;
        writer.upsert_counters(std::slice::from_ref(&key)).await.unwrap();
        assert_eq!(writer.count_for(&key), Some(10));

        key.count = 15;
        writer.upsert_counters(std::slice::from_ref(&key)).await.unwrap();
        assert_eq!(writer.count_for(&key), Some(15));
        assert_eq!(writer.counters().len(), 1);
    }

    #[tokio::test]
    async fn test_domain_upsert_is_idempotent() {
        let writer = MemoryWriter::new();

        let mut domain = DomainMap::new();
        domain
            .entry("foo".to_string())
            .or_default()
            .extend(["bar".to_string(), "baz".to_string()]);
        domain.entry("zip".to_string()).or_default().insert("zap".to_string());

        writer.upsert_domain(&domain).await.unwrap();
        let first = writer.domain();
        writer.upsert_domain(&domain).await.unwrap();
        assert_eq!(writer.domain(), first);

        assert_eq!(first["foo"].len(), 2);
        assert_eq!(first["zip"].len(), 1);
    }
}
