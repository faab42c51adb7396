//! counterd - approximate distinct counting over calendar intervals
//!
//! # Usage
//!
//! ```bash
//! # Initialize the database schema
//! counterd dbinit --config counterd.toml
//!
//! # Run the API server
//! counterd server --config counterd.toml
//!
//! # Run a single snapshot
//! counterd snapshot --config counterd.toml
//!
//! # Generate simulated traffic
//! counterd sim -a color=red -a color=blue -a size=large
//! ```

mod cmd;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Approximate distinct-count service over calendar intervals
#[derive(Parser, Debug)]
#[command(name = "counterd")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the main process serving the API
    Server(cmd::server::ServerArgs),

    /// Snapshot data from redis into the database
    Snapshot(cmd::snapshot::SnapshotArgs),

    /// Initialize the database tables and indexes
    Dbinit(cmd::dbinit::DbInitArgs),

    /// Generate simulated input for testing and benchmarking
    Sim(cmd::sim::SimArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    match cli.command {
        Command::Server(args) => cmd::server::run(args).await,
        Command::Snapshot(args) => cmd::snapshot::run(args).await,
        Command::Dbinit(args) => cmd::dbinit::run(args).await,
        Command::Sim(args) => cmd::sim::run(args).await,
    }
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();

    Ok(())
}
