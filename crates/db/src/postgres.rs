//! PostgreSQL-backed writer

use std::num::NonZeroUsize;

use async_trait::async_trait;
use counterd_keys::ParsedKey;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::debug;

use crate::cache::RecencyCache;
use crate::error::DbError;
use crate::{CounterWriter, DomainMap};

/// Rows written per transaction
const TRANSACTION_SIZE_LIMIT: usize = 256;

/// Capacity of each recency cache
const RECENCY_CACHE_SIZE: usize = 32_768;

/// Upper bound on pooled connections
const POOL_MAX_CONNECTIONS: u32 = 5;

const CREATE_UUID_EXTENSION: &str = r#"CREATE EXTENSION IF NOT EXISTS "uuid-ossp""#;

const CREATE_DOMAIN_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS attributes_domain (
  attribute text NOT NULL, value text NOT NULL,
  PRIMARY KEY (attribute, value))
"#;

const CREATE_COUNTERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS counters (
  id uuid DEFAULT uuid_generate_v4(),
  interval varchar(16) NOT NULL,
  date timestamp NOT NULL,
  attributes jsonb NOT NULL,
  count bigint DEFAULT 0,
  PRIMARY KEY (id),
  UNIQUE (interval, date, attributes))
"#;

const DROP_DOMAIN_TABLE: &str = "DROP TABLE IF EXISTS attributes_domain";

const DROP_COUNTERS_TABLE: &str = "DROP TABLE IF EXISTS counters";

const UPSERT_DOMAIN: &str = r#"
INSERT INTO attributes_domain (attribute, value)
VALUES ($1, $2)
ON CONFLICT DO NOTHING
"#;

// GREATEST keeps persisted counts monotonic even if a snapshot reads a
// stale estimate
const UPSERT_COUNTER: &str = r#"
INSERT INTO counters (interval, date, attributes, count)
VALUES ($1, $2, $3, $4)
ON CONFLICT (interval, date, attributes)
DO UPDATE SET count = GREATEST(EXCLUDED.count, counters.count)
"#;

/// PostgreSQL writer with recency caches
///
/// Writes run in bounded transactions of [`TRANSACTION_SIZE_LIMIT`] rows.
/// A row error aborts the in-flight transaction and surfaces immediately;
/// previously committed chunks and their cache entries are retained, giving
/// at-least-once semantics at chunk granularity.
pub struct PgDatabase {
    pool: PgPool,
    domain_cache: RecencyCache<(String, String), ()>,
    counter_cache: RecencyCache<String, i64>,
}

impl PgDatabase {
    /// Connect to the postgresql server at `addr` (a `postgres://` URL)
    pub async fn connect(addr: &str) -> Result<Self, DbError> {
        let pool = PgPoolOptions::new()
            .max_connections(POOL_MAX_CONNECTIONS)
            .connect(addr)
            .await?;

        let capacity = NonZeroUsize::new(RECENCY_CACHE_SIZE).expect("cache capacity is non-zero");
        Ok(Self {
            pool,
            domain_cache: RecencyCache::new(capacity),
            counter_cache: RecencyCache::new(capacity),
        })
    }

    /// Create the extension and tables if missing
    pub async fn db_init(&self) -> Result<(), DbError> {
        sqlx::query(CREATE_UUID_EXTENSION).execute(&self.pool).await?;
        sqlx::query(CREATE_DOMAIN_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_COUNTERS_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    /// Drop both tables. Tests only.
    pub async fn db_reset(&self) -> Result<(), DbError> {
        sqlx::query(DROP_DOMAIN_TABLE).execute(&self.pool).await?;
        sqlx::query(DROP_COUNTERS_TABLE).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl CounterWriter for PgDatabase {
    async fn upsert_domain(&self, domain: &DomainMap) -> Result<(), DbError> {
        // Drop pairs the database has already seen
        let pending: Vec<(String, String)> = domain
            .iter()
            .flat_map(|(attribute, values)| {
                values.iter().map(move |value| (attribute.clone(), value.clone()))
            })
            .filter(|pair| !self.domain_cache.hit(pair, &()))
            .collect();
        if pending.is_empty() {
            return Ok(());
        }
        debug!(rows = pending.len(), "upserting domain attributes");

        for chunk in pending.chunks(TRANSACTION_SIZE_LIMIT) {
            let mut tx = self.pool.begin().await?;
            for (attribute, value) in chunk {
                sqlx::query(UPSERT_DOMAIN)
                    .bind(attribute)
                    .bind(value)
                    .execute(&mut *tx)
                    .await?;
            }
            tx.commit().await?;

            // Only committed rows enter the cache
            for pair in chunk {
                self.domain_cache.put(pair.clone(), ());
            }
        }
        Ok(())
    }

    async fn upsert_counters(&self, counters: &[ParsedKey]) -> Result<(), DbError> {
        // Drop counters whose last written value is unchanged
        let pending: Vec<&ParsedKey> = counters
            .iter()
            .filter(|key| !self.counter_cache.hit(&key.raw, &key.count))
            .collect();
        if pending.is_empty() {
            return Ok(());
        }
        debug!(rows = pending.len(), "upserting counters");

        for chunk in pending.chunks(TRANSACTION_SIZE_LIMIT) {
            let mut tx = self.pool.begin().await?;
            for key in chunk {
                let attributes = serde_json::to_value(&key.attributes)?;
                sqlx::query(UPSERT_COUNTER)
                    .bind(key.interval.as_str())
                    .bind(key.date.naive_utc())
                    .bind(attributes)
                    .bind(key.count)
                    .execute(&mut *tx)
                    .await?;
            }
            tx.commit().await?;

            for key in chunk {
                self.counter_cache.put(key.raw.clone(), key.count);
            }
        }
        Ok(())
    }
}
