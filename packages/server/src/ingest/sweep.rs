use std::time::Duration;

use chrono::{TimeDelta, Utc};
use common::{FileStatus, SweepConfig};
use sea_orm::{DatabaseConnection, DbErr};
use tracing::{debug, error, info, warn};

use super::pool::InFlight;
use crate::store::FileStore;

/// `stuck_timeout_secs` as a duration, or `None` when it is too large to
/// represent.
pub fn stuck_timeout(stuck_timeout_secs: u64) -> Option<TimeDelta> {
    i64::try_from(stuck_timeout_secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
}

/// Periodically fail files that have been `Processing` for too long.
///
/// Covers runs whose final status write was lost, and runs cut short by a
/// restart. Files the pool still holds are never touched.
pub async fn run_stuck_file_sweeper(
    db: DatabaseConnection,
    config: SweepConfig,
    in_flight: InFlight,
) {
    let scan_interval = Duration::from_secs(config.scan_interval_secs.max(1));

    info!(
        timeout_secs = config.stuck_timeout_secs,
        scan_interval_secs = config.scan_interval_secs,
        "Starting stuck file sweeper"
    );

    let mut interval = tokio::time::interval(scan_interval);

    loop {
        interval.tick().await;

        if let Err(e) = sweep_stuck_files(&db, config.stuck_timeout_secs, &in_flight).await {
            error!(error = %e, "Stuck file sweep failed");
        }
    }
}

/// Mark every file stuck longer than `stuck_timeout_secs` as `Failed`,
/// skipping files that are queued or running in the pool.
///
/// Returns how many files were transitioned.
pub async fn sweep_stuck_files(
    db: &DatabaseConnection,
    stuck_timeout_secs: u64,
    in_flight: &InFlight,
) -> Result<usize, DbErr> {
    // Nothing can have been processing for longer than chrono can count.
    let Some(threshold) = stuck_timeout(stuck_timeout_secs)
        .and_then(|age| Utc::now().checked_sub_signed(age))
    else {
        return Ok(0);
    };
    let files = FileStore::new(db);

    let stuck: Vec<i32> = files
        .find_stuck(threshold)
        .await?
        .into_iter()
        .filter(|file_id| {
            let running = in_flight.contains(*file_id);
            if running {
                debug!(file_id, "Stale file is still in the ingestion pool, skipping");
            }
            !running
        })
        .collect();
    if stuck.is_empty() {
        return Ok(0);
    }

    info!(count = stuck.len(), "Found stuck files, marking failed");

    let mut swept = 0;
    for file_id in stuck {
        match files.set_status(file_id, FileStatus::Failed).await {
            Ok(()) => swept += 1,
            // Finished between the scan and the update.
            Err(DbErr::RecordNotUpdated) => {}
            Err(e) => warn!(file_id, error = %e, "Failed to mark stuck file as failed"),
        }
    }

    Ok(swept)
}
