//! Time-based expiry sweep over the deal store.

use chrono::Utc;
use serde::Serialize;

use crate::store::DealStore;

/// Result of one expiry sweep.
#[derive(Debug, Clone, Serialize)]
pub struct SweepOutcome {
    /// Number of deals transitioned from active to inactive.
    pub expired: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Retires every active deal whose `expires_at` has passed.
///
/// One bulk statement; idempotent, so re-running immediately affects zero
/// rows. Deals without an expiry timestamp are never touched. A store
/// failure is reported inside the outcome rather than propagated.
pub async fn sweep_expired(store: &dyn DealStore) -> SweepOutcome {
    match store.deactivate_expired(Utc::now()).await {
        Ok(expired) => {
            tracing::info!(expired, "expiry sweep finished");
            SweepOutcome {
                expired,
                error: None,
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "expiry sweep failed");
            SweepOutcome {
                expired: 0,
                error: Some(e.to_string()),
            }
        }
    }
}
