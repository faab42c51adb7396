//! `counterd snapshot` - run a single snapshot

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use counterd_db::PgDatabase;
use counterd_snapshot::Snapshotter;
use counterd_store::RedisStore;
use tracing::info;

#[derive(Args, Debug)]
pub struct SnapshotArgs {
    /// Path to the configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub async fn run(args: SnapshotArgs) -> Result<()> {
    let config = super::load_config(args.config.as_ref())?;

    info!(addr = %config.redis_address, "connecting to redis");
    let store = Arc::new(
        RedisStore::connect(&config.redis_address).context("failed to setup redis connection")?,
    );

    info!(addr = %config.postgresql_address, "connecting to postgresql");
    let db = Arc::new(
        PgDatabase::connect(&config.postgresql_address)
            .await
            .context("failed to setup database connection")?,
    );

    let snapshotter = Snapshotter::new(config.snapshot.clone(), store, db);
    snapshotter
        .run(Utc::now())
        .await
        .context("failed to snapshot")
}
