//! Redis-backed store over a bounded connection pool

use std::collections::HashSet;

use async_trait::async_trait;
use deadpool_redis::redis;
use deadpool_redis::{Config, Pool, PoolConfig, Runtime, Timeouts};

use crate::error::StoreError;
use crate::CounterStore;

/// Namespace prefix applied to every key at rest
pub const KEY_PREFIX: &str = "counterd:";

/// Entries requested per SCAN page
const SCAN_COUNT: usize = 100;

/// Upper bound on pooled connections
const POOL_MAX_SIZE: usize = 3;

/// How long a caller waits for a pooled connection before giving up
const POOL_WAIT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Redis store using a bounded connection pool
///
/// Every operation checks a connection out of the pool and returns it on
/// all exit paths. Batched operations run as a single MULTI/EXEC pipeline
/// so one event's key fan-out is applied atomically.
pub struct RedisStore {
    pool: Pool,
}

impl RedisStore {
    /// Create a store for the redis server at `addr` (a `redis://` URL)
    pub fn connect(addr: &str) -> Result<Self, StoreError> {
        let mut cfg = Config::from_url(addr);
        cfg.pool = Some(PoolConfig {
            max_size: POOL_MAX_SIZE,
            timeouts: Timeouts {
                wait: Some(POOL_WAIT_TIMEOUT),
                ..Timeouts::default()
            },
            ..PoolConfig::default()
        });
        let pool = cfg.create_pool(Some(Runtime::Tokio1))?;
        Ok(Self { pool })
    }

    fn prefixed(key: &str) -> String {
        format!("{KEY_PREFIX}{key}")
    }
}

#[async_trait]
impl CounterStore for RedisStore {
    async fn update_keys(&self, keys: &[String], id: &str) -> Result<(), StoreError> {
        // Fast path on no-op
        if keys.is_empty() {
            return Ok(());
        }

        let mut conn = self.pool.get().await?;

        // Add the ID to every key in one transaction
        let mut pipe = redis::pipe();
        pipe.atomic();
        for key in keys {
            pipe.cmd("PFADD").arg(Self::prefixed(key)).arg(id).ignore();
        }
        pipe.query_async::<()>(&mut conn).await?;
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>, StoreError> {
        let mut conn = self.pool.get().await?;

        // Redis may return duplicates across SCAN pages
        let mut seen: HashSet<String> = HashSet::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, page): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(format!("{KEY_PREFIX}*"))
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut conn)
                .await?;
            seen.extend(page);

            cursor = next;
            if cursor == 0 {
                break;
            }
        }

        let mut keys: Vec<String> = seen
            .into_iter()
            .map(|key| key.strip_prefix(KEY_PREFIX).map(str::to_string).unwrap_or(key))
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn get_counts(&self, keys: &[String]) -> Result<Vec<i64>, StoreError> {
        // Fast path on no-op
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.pool.get().await?;

        // Count every key in one transaction; EXEC yields the counts in
        // command order, matching the input
        let mut pipe = redis::pipe();
        pipe.atomic();
        for key in keys {
            pipe.cmd("PFCOUNT").arg(Self::prefixed(key));
        }
        let counts: Vec<i64> = pipe.query_async(&mut conn).await?;
        Ok(counts)
    }

    async fn delete_keys(&self, keys: &[String]) -> Result<(), StoreError> {
        // Fast path on no-op
        if keys.is_empty() {
            return Ok(());
        }

        let mut conn = self.pool.get().await?;

        // Single multi-argument delete
        let mut cmd = redis::cmd("DEL");
        for key in keys {
            cmd.arg(Self::prefixed(key));
        }
        cmd.query_async::<()>(&mut conn).await?;
        Ok(())
    }
}
