//! Optional in-process scheduling of scrape runs and expiry sweeps.
//!
//! Deployments that trigger the pipeline from an external scheduler (the
//! common setup) leave both cron vars unset and no job is registered here.

use std::sync::Arc;

use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use dealgrid_ingest::{sweep_expired, Orchestrator, PgDealStore};
use dealgrid_scraper::{default_scrapers, PageClient};

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process. Dropping it shuts down all scheduled
/// jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// a configured cron expression does not parse, or the scheduler cannot
/// be started.
pub async fn build_scheduler(
    pool: PgPool,
    config: Arc<dealgrid_core::AppConfig>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    if let Some(cron) = config.scrape_cron.clone() {
        let pool = pool.clone();
        let config = Arc::clone(&config);
        let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
            let pool = pool.clone();
            let config = Arc::clone(&config);
            Box::pin(async move {
                run_scheduled_scrape(pool, &config).await;
            })
        })?;
        scheduler.add(job).await?;
        tracing::info!(cron = %cron, "registered scheduled scrape job");
    }

    if let Some(cron) = config.expire_cron.clone() {
        let pool = pool.clone();
        let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
            let pool = pool.clone();
            Box::pin(async move {
                let store = PgDealStore::new(pool);
                let outcome = sweep_expired(&store).await;
                if let Some(error) = outcome.error {
                    tracing::error!(error = %error, "scheduled expiry sweep failed");
                }
            })
        })?;
        scheduler.add(job).await?;
        tracing::info!(cron = %cron, "registered scheduled expiry job");
    }

    scheduler.start().await?;
    Ok(scheduler)
}

async fn run_scheduled_scrape(pool: PgPool, config: &dealgrid_core::AppConfig) {
    let client = match PageClient::from_config(config) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "scheduled scrape skipped: cannot build HTTP client");
            return;
        }
    };

    let orchestrator = Orchestrator::new(
        default_scrapers(config),
        Arc::new(client),
        Arc::new(PgDealStore::new(pool)),
        config.scraper_max_concurrent_sources,
    );

    let summary = orchestrator.run().await;
    if !summary.success {
        tracing::warn!(
            total_deals = summary.total_deals,
            skipped = summary.upsert.skipped,
            "scheduled scrape run finished with errors"
        );
    }
}
