//! `counterd dbinit` - initialize the database schema

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use counterd_db::PgDatabase;
use tracing::info;

#[derive(Args, Debug)]
pub struct DbInitArgs {
    /// Path to the configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub async fn run(args: DbInitArgs) -> Result<()> {
    let config = super::load_config(args.config.as_ref())?;

    info!(addr = %config.postgresql_address, "connecting to postgresql");
    let db = PgDatabase::connect(&config.postgresql_address)
        .await
        .context("failed to setup database connection")?;

    db.db_init().await.context("failed to initialize database")?;
    info!("database initialized");
    Ok(())
}
