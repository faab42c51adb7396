//! `counterd server` - run the API server

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use counterd_db::PgDatabase;
use counterd_server::IngressServer;
use counterd_snapshot::{SnapshotSchedule, Snapshotter};
use counterd_store::RedisStore;
use tracing::info;

#[derive(Args, Debug)]
pub struct ServerArgs {
    /// Path to the configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub async fn run(args: ServerArgs) -> Result<()> {
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

    // Wire the snapshot cron when configured
    if config.snapshot.scheduled() {
        let snapshotter = Arc::new(Snapshotter::new(
            config.snapshot.clone(),
            Arc::clone(&store) as _,
            Arc::clone(&db) as _,
        ));
        let schedule = SnapshotSchedule::new(&config.snapshot.cron, snapshotter)
            .context("failed to setup snapshot cron")?;
        tokio::spawn(schedule.run());
    }

    let server = IngressServer::new(
        config.listen_address.clone(),
        config.auth.clone(),
        config.attributes.clone(),
        store,
    );
    server.run().await.context("http listener failed")
}
