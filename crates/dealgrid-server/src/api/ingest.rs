//! Trigger handlers for the scrape pipeline and the expiry sweep.

use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use serde::Serialize;

use dealgrid_ingest::{sweep_expired, Orchestrator, PgDealStore, ScraperReport};
use dealgrid_scraper::{default_scrapers, PageClient};

use crate::middleware::RequestId;

use super::{ApiError, AppState};

#[derive(Debug, Serialize)]
pub(super) struct RunScrapersResponse {
    success: bool,
    summary: RunSummaryBody,
    scrapers: Vec<ScraperReport>,
    /// Reconciliation errors; per-scraper errors live in `scrapers`.
    errors: Vec<String>,
}

#[derive(Debug, Serialize)]
struct RunSummaryBody {
    total_deals: usize,
    inserted: usize,
    updated: usize,
    duration_ms: u64,
}

/// `POST /run-scrapers` — runs every registered scraper and reconciles the
/// harvest.
///
/// Always answers 200 once the run executed; scraper and record failures
/// are reported inside the body, not as an HTTP error.
pub(super) async fn run_scrapers(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<RunScrapersResponse>, ApiError> {
    let client = PageClient::from_config(&state.config).map_err(|e| {
        tracing::error!(error = %e, "failed to construct page client");
        ApiError::new(req_id.0.clone(), "internal_error", "failed to construct HTTP client")
    })?;

    let orchestrator = Orchestrator::new(
        default_scrapers(&state.config),
        Arc::new(client),
        Arc::new(PgDealStore::new(state.pool.clone())),
        state.config.scraper_max_concurrent_sources,
    );

    let summary = orchestrator.run().await;

    Ok(Json(RunScrapersResponse {
        success: summary.success,
        summary: RunSummaryBody {
            total_deals: summary.total_deals,
            inserted: summary.upsert.inserted,
            updated: summary.upsert.updated,
            duration_ms: summary.duration_ms,
        },
        scrapers: summary.scrapers,
        errors: summary.upsert.errors,
    }))
}

#[derive(Debug, Serialize)]
pub(super) struct ExpireDealsResponse {
    success: bool,
    expired: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// `GET|POST /expire-deals` — retires every active deal past its expiry.
///
/// GET is kept alongside POST because hosted cron schedulers commonly only
/// issue GETs.
pub(super) async fn expire_deals(
    State(state): State<AppState>,
    Extension(_req_id): Extension<RequestId>,
) -> Json<ExpireDealsResponse> {
    let store = PgDealStore::new(state.pool.clone());
    let outcome = sweep_expired(&store).await;

    Json(ExpireDealsResponse {
        success: outcome.error.is_none(),
        expired: outcome.expired,
        error: outcome.error,
    })
}
