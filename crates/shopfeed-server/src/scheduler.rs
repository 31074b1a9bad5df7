//! Background job scheduler.
//!
//! Registers the optional feed refresh job when `SHOPFEED_REFRESH_CRON` is
//! set.

use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::pipeline::FeedPipeline;

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process. Dropping it shuts down all scheduled jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised, the
/// cron expression is rejected, or the scheduler fails to start.
pub async fn build_scheduler(
    pipeline: Arc<FeedPipeline>,
    refresh_cron: Option<&str>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    match refresh_cron {
        Some(cron) => register_refresh_job(&scheduler, pipeline, cron).await?,
        None => tracing::info!("scheduler: SHOPFEED_REFRESH_CRON not set; feed refresh disabled"),
    }

    scheduler.start().await?;
    Ok(scheduler)
}

/// Regenerate every shop with stored settings on `cron`.
async fn register_refresh_job(
    scheduler: &JobScheduler,
    pipeline: Arc<FeedPipeline>,
    cron: &str,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(cron, move |_uuid, _lock| {
        let pipeline = Arc::clone(&pipeline);

        Box::pin(async move {
            tracing::info!("scheduler: starting feed refresh");
            match pipeline.refresh_all().await {
                Ok(failures) => {
                    tracing::info!(failures, "scheduler: feed refresh complete");
                }
                Err(e) => {
                    tracing::error!(error = %e, "scheduler: failed to list shops for refresh");
                }
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron, "scheduler: feed refresh registered");
    Ok(())
}
