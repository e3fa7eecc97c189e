use crate::dedup::DedupCache;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, info};

/// Start the background jobs: a periodic sweep of expired dedup entries.
pub async fn start_scheduler(dedup: Arc<DedupCache>, sweep_interval: Duration) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    info!("Scheduling dedup sweep every {:?}", sweep_interval);
    let job = Job::new_repeated(sweep_interval, move |_uuid, _l| {
        let purged = dedup.sweep();
        debug!(
            "Dedup sweep finished: {} purged, {} remaining",
            purged,
            dedup.len()
        );
    })?;
    scheduler.add(job).await?;

    scheduler.start().await?;
    info!("✓ Scheduler started");

    Ok(scheduler)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sweep_job_purges_expired_entries() {
        let dedup = Arc::new(DedupCache::new(Duration::from_millis(10)));
        dedup.check_and_mark("1.0", "U1");
        dedup.check_and_mark("2.0", "U2");
        assert_eq!(dedup.len(), 2);

        let mut scheduler = start_scheduler(Arc::clone(&dedup), Duration::from_secs(1))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert!(dedup.is_empty());

        scheduler.shutdown().await.unwrap();
    }
}
