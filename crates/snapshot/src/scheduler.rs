//! Cron-driven snapshot scheduling

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use cron::Schedule;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::error::SnapshotError;
use crate::Snapshotter;

/// Fires [`Snapshotter::run`] on a cron schedule.
///
/// Fires are serialized by a mutex: if a snapshot outlives its period the
/// next fire does not queue behind it, it returns immediately.
pub struct SnapshotSchedule {
    schedule: Schedule,
    snapshotter: Arc<Snapshotter>,
    lock: Arc<Mutex<()>>,
}

impl SnapshotSchedule {
    /// Build a schedule from a cron expression
    pub fn new(expression: &str, snapshotter: Arc<Snapshotter>) -> Result<Self, SnapshotError> {
        let schedule =
            Schedule::from_str(expression).map_err(|e| SnapshotError::InvalidSchedule {
                expression: expression.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            schedule,
            snapshotter,
            lock: Arc::new(Mutex::new(())),
        })
    }

    /// Run the schedule loop until the expression yields no further fire
    /// times
    pub async fn run(self) {
        info!(schedule = %self.schedule, "snapshot cron initialized");

        loop {
            let Some(next) = self.schedule.upcoming(Utc).next() else {
                warn!("snapshot schedule has no upcoming fire times, stopping");
                return;
            };

            let wait = (next - Utc::now()).to_std().unwrap_or(Duration::ZERO);
            tokio::time::sleep(wait).await;

            let snapshotter = Arc::clone(&self.snapshotter);
            let lock = Arc::clone(&self.lock);
            tokio::spawn(async move {
                // Suppress overlap: a fire during a running snapshot is
                // dropped, not queued
                let Ok(_guard) = lock.try_lock() else {
                    warn!("skipping scheduled snapshot - previous run still in progress");
                    return;
                };

                if let Err(err) = snapshotter.run(Utc::now()).await {
                    error!(error = %err, "scheduled snapshot failed");
                }
            });
        }
    }
}
