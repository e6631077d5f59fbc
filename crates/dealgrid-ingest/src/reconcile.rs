//! Reconciliation of scraped deals against the persistent store.

use dealgrid_core::ScrapedDeal;
use serde::Serialize;

use crate::matcher::ToolMatcher;
use crate::store::DealStore;

/// Aggregate result of one reconciliation batch.
#[derive(Debug, Default, Clone, Serialize)]
pub struct UpsertOutcome {
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

/// Reconciles a batch of scraped deals into the store.
///
/// Each deal is processed independently and sequentially: resolve a
/// catalog tool from `tool_name` (ambiguity resolves to no match, never an
/// error), then apply the atomic upsert with full-overwrite semantics.
/// Scraper-originated deals are written with `is_verified = true`.
///
/// A failure on one deal is recorded and counted in `skipped`, and the
/// batch continues — one bad record never aborts the rest. No transaction
/// spans the batch: deals already written stay written whatever happens
/// to later ones.
pub async fn reconcile_deals(
    store: &dyn DealStore,
    matcher: &ToolMatcher,
    deals: &[ScrapedDeal],
) -> UpsertOutcome {
    let mut outcome = UpsertOutcome::default();

    for deal in deals {
        let tool_id = deal
            .tool_name
            .as_deref()
            .and_then(|name| matcher.find_match(name))
            .map(|tool| tool.id);

        match store.upsert_deal(deal, tool_id, true).await {
            Ok(write) => {
                if write.inserted {
                    outcome.inserted += 1;
                } else {
                    outcome.updated += 1;
                }
            }
            Err(e) => {
                tracing::warn!(
                    source = %deal.source,
                    source_id = %deal.source_id,
                    error = %e,
                    "failed to reconcile deal"
                );
                outcome
                    .errors
                    .push(format!("error processing deal {}: {e}", deal.source_id));
                outcome.skipped += 1;
            }
        }
    }

    outcome
}
