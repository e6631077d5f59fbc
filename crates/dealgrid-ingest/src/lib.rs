pub mod expiry;
pub mod matcher;
pub mod pipeline;
pub mod reconcile;
pub mod store;

pub use expiry::{sweep_expired, SweepOutcome};
pub use matcher::{normalize_tool_name, ToolMatcher};
pub use pipeline::{Orchestrator, RunSummary, ScraperReport};
pub use reconcile::{reconcile_deals, UpsertOutcome};
pub use store::{DealStore, PgDealStore};
