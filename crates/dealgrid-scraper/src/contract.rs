//! The contract every source scraper implements.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dealgrid_core::ScrapedDeal;

use crate::client::PageClient;

/// What one scraper produced in one cycle.
#[derive(Debug, Clone)]
pub struct ScrapeOutcome {
    pub deals: Vec<ScrapedDeal>,
    /// Human-readable failure descriptions: fetch failures, per-card parse
    /// failures, and the zero-deal structural-drift diagnostic.
    pub errors: Vec<String>,
    pub scraped_at: DateTime<Utc>,
}

impl ScrapeOutcome {
    /// A scrape succeeded iff it recorded no errors. Finding zero deals is
    /// not success by itself — scrapers emit a diagnostic error when an
    /// expected-nonempty listing parses to nothing.
    #[must_use]
    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A source scraper for one deal marketplace.
///
/// Implementations must never panic on malformed pages: fetch and parse
/// failures are reported inside the returned [`ScrapeOutcome`]. The
/// orchestrator additionally converts any error escaping `scrape` into a
/// zero-deal outcome so one source cannot abort the others.
#[async_trait]
pub trait DealScraper: Send + Sync {
    /// Display name used in run summaries and logs.
    fn name(&self) -> &str;

    async fn scrape(&self, client: &PageClient) -> ScrapeOutcome;
}
