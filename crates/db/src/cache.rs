//! Bounded recency cache for already-written rows

use std::hash::Hash;
use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

/// Thread-safe bounded LRU keyed by row identity, valued by what was last
/// written.
///
/// A hit on an equal value means the database already holds the row and
/// the write can be skipped. Entries are only admitted after their chunk
/// commits, so a cache hit never hides an unwritten row.
pub struct RecencyCache<K, V> {
    inner: Mutex<LruCache<K, V>>,
}

impl<K: Hash + Eq, V: PartialEq> RecencyCache<K, V> {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Whether the cache holds `key` with a value equal to `value`
    pub fn hit(&self, key: &K, value: &V) -> bool {
        self.inner.lock().get(key) == Some(value)
    }

    /// Record `value` as written for `key`
    pub fn put(&self, key: K, value: V) {
        self.inner.lock().put(key, value);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(capacity: usize) -> RecencyCache<String, i64> {
        RecencyCache::new(NonZeroUsize::new(capacity).unwrap())
    }

    #[test]
    fn test_hit_requires_equal_value() {
        let cache = cache(8);
        let key = "day:2017-01-18:foo:bar".to_string();

        assert!(!cache.hit(&key, &10));
        cache.put(key.clone(), 10);
        assert!(cache.hit(&key, &10));
        // A changed count must be rewritten
        assert!(!cache.hit(&key, &11));
    }

    #[test]
    fn test_bounded_eviction() {
        let cache = cache(2);
        cache.put("a".to_string(), 1);
        cache.put("b".to_string(), 2);
        cache.put("c".to_string(), 3);

        assert_eq!(cache.len(), 2);
        // "a" was least recently used
        assert!(!cache.hit(&"a".to_string(), &1));
        assert!(cache.hit(&"c".to_string(), &3));
    }
}
