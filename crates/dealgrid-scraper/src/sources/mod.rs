//! One module per deal marketplace.

pub mod appsumo;

use std::sync::Arc;

use crate::contract::DealScraper;

/// Builds the scraper set for a production run.
///
/// The orchestrator takes this list at construction time, so tests and
/// future sources swap in their own implementations without touching
/// orchestration code.
#[must_use]
pub fn default_scrapers(config: &dealgrid_core::AppConfig) -> Vec<Arc<dyn DealScraper>> {
    vec![Arc::new(appsumo::AppSumoScraper::new(
        config.appsumo_partner_id.clone(),
    ))]
}
