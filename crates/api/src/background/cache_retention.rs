//! Periodic cleanup of stale weather cache rows.
//!
//! Rows are refreshed in place on every miss, so only locations nobody has
//! asked about for a while accumulate. This job deletes rows older than the
//! configured retention period on a fixed interval.

use std::time::Duration;

use aeris_db::repositories::WeatherCacheRepo;
use aeris_db::DbPool;
use chrono::Utc;
use tokio_util::sync::CancellationToken;

/// How often the cleanup job runs.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600); // 1 hour

/// Run the cache retention loop until `cancel` is triggered.
pub async fn run(pool: DbPool, retention_hours: i64, cancel: CancellationToken) {
    tracing::info!(
        retention_hours,
        interval_secs = CLEANUP_INTERVAL.as_secs(),
        "Cache retention job started"
    );

    let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Cache retention job stopping");
                break;
            }
            _ = interval.tick() => {
                purge_once(&pool, retention_hours).await;
            }
        }
    }
}

/// Delete rows older than `retention_hours`, returning how many went.
pub async fn purge_once(pool: &DbPool, retention_hours: i64) -> u64 {
    let cutoff = Utc::now() - chrono::Duration::hours(retention_hours);
    match WeatherCacheRepo::delete_older_than(pool, cutoff).await {
        Ok(deleted) => {
            if deleted > 0 {
                tracing::info!(deleted, "Cache retention: purged old rows");
            } else {
                tracing::debug!("Cache retention: no rows to purge");
            }
            deleted
        }
        Err(e) => {
            tracing::error!(error = %e, "Cache retention: cleanup failed");
            0
        }
    }
}
