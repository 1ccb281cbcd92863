//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! recurring traffic enrichment job.

use adspace_core::CandidateSelector;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::api::AppState;
use crate::enrichment::{run_guarded, RunError};

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process. Dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// a job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(state: AppState) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_enrichment_job(&scheduler, state).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the recurring enrichment job on `ADSPACE_ENRICH_CRON`
/// (default `0 0 3 * * *`, 03:00 UTC daily).
///
/// Each run is non-forced over the default batch limit, so locations that
/// already carry an estimate cost no directory calls.
async fn register_enrichment_job(
    scheduler: &JobScheduler,
    state: AppState,
) -> Result<(), JobSchedulerError> {
    let cron = state.config.enrich_cron.clone();

    let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
        let state = state.clone();

        Box::pin(async move {
            tracing::info!("scheduler: starting traffic enrichment run");
            run_enrichment_job(&state).await;
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron = %cron, "scheduler: registered traffic enrichment job");
    Ok(())
}

/// Run one scheduled pass. All errors are logged rather than propagated.
async fn run_enrichment_job(state: &AppState) {
    let selector = CandidateSelector::Limit(state.config.enrich_batch_limit);

    match run_guarded(state, &selector, false).await {
        Ok(report) => tracing::info!(
            total = report.total,
            successful = report.successful,
            failed = report.failed,
            skipped = report.skipped,
            cancelled = report.cancelled,
            "scheduler: traffic enrichment run complete"
        ),
        Err(RunError::Busy) => {
            tracing::warn!("scheduler: enrichment already running; skipping this tick");
        }
        Err(e) => tracing::error!(error = %e, "scheduler: traffic enrichment run failed"),
    }
}
