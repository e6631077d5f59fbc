//! The store contract the pipeline depends on.
//!
//! Every store operation the pipeline performs goes through this trait, so
//! orchestration and reconciliation logic can be exercised against an
//! in-memory double without a database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dealgrid_core::ScrapedDeal;
use dealgrid_db::{DbError, DealWrite, ToolRow};
use sqlx::PgPool;

#[async_trait]
pub trait DealStore: Send + Sync {
    /// Snapshot of the match-eligible tool catalog.
    async fn active_tools(&self) -> Result<Vec<ToolRow>, DbError>;

    /// Atomic insert-or-overwrite of one deal observation.
    async fn upsert_deal(
        &self,
        deal: &ScrapedDeal,
        tool_id: Option<i64>,
        is_verified: bool,
    ) -> Result<DealWrite, DbError>;

    /// Bulk-retires active deals whose expiry has passed; returns the
    /// number of rows transitioned.
    async fn deactivate_expired(&self, now: DateTime<Utc>) -> Result<u64, DbError>;
}

/// The production store, backed by the Postgres pool.
#[derive(Clone)]
pub struct PgDealStore {
    pool: PgPool,
}

impl PgDealStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DealStore for PgDealStore {
    async fn active_tools(&self) -> Result<Vec<ToolRow>, DbError> {
        dealgrid_db::tools::list_active_tools(&self.pool).await
    }

    async fn upsert_deal(
        &self,
        deal: &ScrapedDeal,
        tool_id: Option<i64>,
        is_verified: bool,
    ) -> Result<DealWrite, DbError> {
        dealgrid_db::deals::upsert_deal(&self.pool, deal, tool_id, is_verified).await
    }

    async fn deactivate_expired(&self, now: DateTime<Utc>) -> Result<u64, DbError> {
        dealgrid_db::deals::deactivate_expired_deals(&self.pool, now).await
    }
}
