//! Top-level orchestration of one scrape-and-reconcile run.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde::Serialize;

use dealgrid_core::ScrapedDeal;
use dealgrid_scraper::{DealScraper, PageClient, ScrapeOutcome};

use crate::matcher::ToolMatcher;
use crate::reconcile::{reconcile_deals, UpsertOutcome};
use crate::store::DealStore;

/// What one scraper contributed to a run.
#[derive(Debug, Clone, Serialize)]
pub struct ScraperReport {
    pub name: String,
    pub deal_count: usize,
    pub errors: Vec<String>,
}

/// Consolidated result of one orchestrator run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Deals handed to the reconciler. Counted after per-card price
    /// filtering: a listing without a parsable price never leaves its
    /// scraper, so it is not included here.
    pub total_deals: usize,
    pub scrapers: Vec<ScraperReport>,
    pub upsert: UpsertOutcome,
    pub duration_ms: u64,
    /// True iff every scraper and the reconciler reported zero errors.
    /// Partial progress persists either way.
    pub success: bool,
}

/// Runs every registered scraper and reconciles the combined harvest.
///
/// The scraper list is fixed at construction: tests pass doubles, and new
/// sources register here without orchestrator changes.
pub struct Orchestrator {
    scrapers: Vec<Arc<dyn DealScraper>>,
    client: Arc<PageClient>,
    store: Arc<dyn DealStore>,
    max_concurrent: usize,
}

/// Runs a single scraper against the shared client. Extracted to a free
/// `async fn` with a fully-owned signature so the borrow of `client` lives
/// inside a concretely-typed future, avoiding a higher-ranked lifetime
/// inference failure when this future is `tokio::spawn`ed.
async fn scrape_one(scraper: Arc<dyn DealScraper>, client: Arc<PageClient>) -> ScrapeOutcome {
    scraper.scrape(&client).await
}

/// Scrapes one source in an isolated task and tags the outcome with the
/// source name. A panic inside the task is caught by `handle.await` and
/// converted into a zero-deal outcome carrying one error, so one source
/// cannot abort the others. Extracted to a free `async fn` with a
/// fully-owned signature to keep the stream combinator's closure free of
/// an inline `async` block whose trait-object lifetime cannot be inferred
/// in a `Send + 'static` context.
async fn run_scraper(
    scraper: Arc<dyn DealScraper>,
    client: Arc<PageClient>,
) -> (String, ScrapeOutcome) {
    let name = scraper.name().to_string();
    let handle = tokio::spawn(scrape_one(scraper, client));
    match handle.await {
        Ok(outcome) => (name, outcome),
        Err(e) => (
            name,
            ScrapeOutcome {
                deals: Vec::new(),
                errors: vec![format!("scraper crashed: {e}")],
                scraped_at: Utc::now(),
            },
        ),
    }
}

impl Orchestrator {
    #[must_use]
    pub fn new(
        scrapers: Vec<Arc<dyn DealScraper>>,
        client: Arc<PageClient>,
        store: Arc<dyn DealStore>,
        max_concurrent: usize,
    ) -> Self {
        Self {
            scrapers,
            client,
            store,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Executes one full run: scrape all sources, reconcile once, report.
    ///
    /// Sources run concurrently up to `max_concurrent`; each source issues
    /// its own fetches sequentially. A scraper that panics is isolated in
    /// its own task and converted into a zero-deal report with one error,
    /// so it cannot take the run down with it.
    pub async fn run(&self) -> RunSummary {
        let started = Instant::now();

        let client = Arc::clone(&self.client);
        let tasks: Vec<Pin<Box<dyn Future<Output = (String, ScrapeOutcome)> + Send>>> = self
            .scrapers
            .iter()
            .cloned()
            .map(|scraper| {
                Box::pin(run_scraper(scraper, Arc::clone(&client)))
                    as Pin<Box<dyn Future<Output = (String, ScrapeOutcome)> + Send>>
            })
            .collect();
        let results: Vec<(String, ScrapeOutcome)> = stream::iter(tasks)
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        let mut all_deals: Vec<ScrapedDeal> = Vec::new();
        let mut reports = Vec::with_capacity(results.len());
        for (name, outcome) in results {
            tracing::info!(
                scraper = %name,
                deals = outcome.deals.len(),
                errors = outcome.errors.len(),
                "scraper finished"
            );
            reports.push(ScraperReport {
                name,
                deal_count: outcome.deals.len(),
                errors: outcome.errors,
            });
            all_deals.extend(outcome.deals);
        }

        let upsert = match self.store.active_tools().await {
            Ok(tools) => {
                let matcher = ToolMatcher::new(tools);
                reconcile_deals(self.store.as_ref(), &matcher, &all_deals).await
            }
            Err(e) => {
                // No catalog snapshot means no matching. Skip the write
                // phase entirely; the next scheduled run retries the batch.
                tracing::error!(error = %e, "failed to load tool catalog; skipping reconciliation");
                UpsertOutcome {
                    skipped: all_deals.len(),
                    errors: vec![format!("failed to load tool catalog: {e}")],
                    ..UpsertOutcome::default()
                }
            }
        };

        let success =
            reports.iter().all(|r| r.errors.is_empty()) && upsert.errors.is_empty();

        let summary = RunSummary {
            total_deals: all_deals.len(),
            scrapers: reports,
            upsert,
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            success,
        };

        tracing::info!(
            total_deals = summary.total_deals,
            inserted = summary.upsert.inserted,
            updated = summary.upsert.updated,
            skipped = summary.upsert.skipped,
            duration_ms = summary.duration_ms,
            success = summary.success,
            "scrape run finished"
        );

        summary
    }
}
