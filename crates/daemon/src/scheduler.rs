//! Recurring discovery trigger.
//!
//! The pipeline runs once at startup (see `main`); this module registers the
//! cron job that re-triggers it afterwards. Errors inside a scheduled run are
//! logged, never propagated — the scheduler must survive a bad cycle.

use std::sync::Arc;

use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::pipeline::Pipeline;

/// Start the recurring discovery schedule.
///
/// `cron` uses the six-field form with a leading seconds field, e.g.
/// `"0 0 * * * *"` for hourly.
pub async fn start(pipeline: Arc<Pipeline>, cron: &str) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let job_pipeline = pipeline.clone();
    let job = Job::new_async(cron, move |_uuid, _lock| {
        let pipeline = job_pipeline.clone();
        Box::pin(async move {
            tracing::info!("launching scheduled discovery cycle");
            match pipeline.run_cycle().await {
                Ok(Some(_)) => {}
                Ok(None) => tracing::warn!("scheduled cycle skipped, previous one still running"),
                Err(e) if e.is_store_fault() => {
                    tracing::error!("scheduled cycle aborted, store unreachable: {e}")
                }
                Err(e) => tracing::error!("scheduled cycle failed: {e}"),
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    tracing::info!(cron, "discovery schedule started");
    Ok(scheduler)
}
