//! Database operations for the `deals` table.
//!
//! The `(source, source_id)` pair is the natural key for a marketplace
//! listing. It is enforced by a UNIQUE constraint and [`upsert_deal`] is a
//! single atomic statement, so concurrent runs observing the same listing
//! cannot double-insert.

use chrono::{DateTime, Utc};
use dealgrid_core::ScrapedDeal;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `deals` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DealRow {
    pub id: i64,
    /// Matched catalog tool; `NULL` marks an orphan deal.
    pub tool_id: Option<i64>,
    pub source: String,
    pub source_id: String,
    pub source_url: String,
    pub deal_type: String,
    pub title: String,
    pub description: Option<String>,
    pub original_price: Option<Decimal>,
    pub deal_price: Decimal,
    pub discount_percent: Option<i32>,
    pub currency: String,
    pub coupon_code: Option<String>,
    pub affiliate_url: String,
    pub image_url: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of [`upsert_deal`]: the row id and whether the statement
/// inserted a new row (as opposed to updating an existing one).
#[derive(Debug, Clone, Copy)]
pub struct DealWrite {
    pub id: i64,
    pub inserted: bool,
}

/// Looks up a stored deal by its `(source, source_id)` natural key.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_deal_by_source_id(
    pool: &PgPool,
    source: dealgrid_core::DealSource,
    source_id: &str,
) -> Result<Option<DealRow>, DbError> {
    let row = sqlx::query_as::<_, DealRow>(
        "SELECT id, tool_id, source, source_id, source_url, deal_type, title, \
                description, original_price, deal_price, discount_percent, \
                currency, coupon_code, affiliate_url, image_url, expires_at, \
                is_active, is_verified, created_at, updated_at \
         FROM deals \
         WHERE source = $1 AND source_id = $2",
    )
    .bind(source.as_str())
    .bind(source_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Upserts a deal observation in one atomic statement.
///
/// Conflicts on `(source, source_id)` overwrite every mutable field — an
/// update replaces, it does not merge — and reactivate the row
/// (`is_active = TRUE`): a listing re-observed by a scraper is live again
/// even if a previous expiry sweep retired it.
///
/// `affiliate_url` falls back to the canonical listing URL when the deal
/// carries no monetised URL.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_deal(
    pool: &PgPool,
    deal: &ScrapedDeal,
    tool_id: Option<i64>,
    is_verified: bool,
) -> Result<DealWrite, DbError> {
    // `xmax = 0` holds only for rows created by this statement, which is
    // how a single round trip reports insert-vs-update.
    let (id, inserted) = sqlx::query_as::<_, (i64, bool)>(
        "INSERT INTO deals \
             (tool_id, source, source_id, source_url, deal_type, title, \
              description, original_price, deal_price, discount_percent, \
              currency, coupon_code, affiliate_url, image_url, expires_at, \
              is_active, is_verified) \
         VALUES ($1, $2, $3, $4, $5, $6, \
                 $7, $8, $9, $10, \
                 $11, $12, $13, $14, $15, \
                 TRUE, $16) \
         ON CONFLICT (source, source_id) DO UPDATE SET \
             tool_id          = EXCLUDED.tool_id, \
             source_url       = EXCLUDED.source_url, \
             deal_type        = EXCLUDED.deal_type, \
             title            = EXCLUDED.title, \
             description      = EXCLUDED.description, \
             original_price   = EXCLUDED.original_price, \
             deal_price       = EXCLUDED.deal_price, \
             discount_percent = EXCLUDED.discount_percent, \
             currency         = EXCLUDED.currency, \
             coupon_code      = EXCLUDED.coupon_code, \
             affiliate_url    = EXCLUDED.affiliate_url, \
             image_url        = EXCLUDED.image_url, \
             expires_at       = EXCLUDED.expires_at, \
             is_active        = TRUE, \
             is_verified      = EXCLUDED.is_verified, \
             updated_at       = NOW() \
         RETURNING id, (xmax = 0) AS inserted",
    )
    .bind(tool_id)
    .bind(deal.source.as_str())
    .bind(&deal.source_id)
    .bind(&deal.source_url)
    .bind(deal.deal_type.as_str())
    .bind(&deal.title)
    .bind(&deal.description)
    .bind(deal.original_price)
    .bind(deal.deal_price)
    .bind(deal.discount_percent)
    .bind(&deal.currency)
    .bind(&deal.coupon_code)
    .bind(deal.affiliate_url.as_deref().unwrap_or(&deal.source_url))
    .bind(&deal.image_url)
    .bind(deal.expires_at)
    .bind(is_verified)
    .fetch_one(pool)
    .await?;

    Ok(DealWrite { id, inserted })
}

/// Retires every active deal whose expiry deadline has passed.
///
/// Returns the number of rows transitioned. Idempotent: a second sweep at
/// the same instant affects zero rows. Deals with `expires_at IS NULL`
/// are never auto-expired.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn deactivate_expired_deals(
    pool: &PgPool,
    now: DateTime<Utc>,
) -> Result<u64, DbError> {
    let result = sqlx::query(
        "UPDATE deals \
         SET is_active = FALSE, updated_at = NOW() \
         WHERE is_active = TRUE AND expires_at IS NOT NULL AND expires_at < $1",
    )
    .bind(now)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Fetches active deals created at or after `since`, newest first.
///
/// This is the read path the alert dispatcher uses to pick up deals a
/// scrape run just inserted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_deals_created_since(
    pool: &PgPool,
    since: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<DealRow>, DbError> {
    let rows = sqlx::query_as::<_, DealRow>(
        "SELECT id, tool_id, source, source_id, source_url, deal_type, title, \
                description, original_price, deal_price, discount_percent, \
                currency, coupon_code, affiliate_url, image_url, expires_at, \
                is_active, is_verified, created_at, updated_at \
         FROM deals \
         WHERE is_active = TRUE AND created_at >= $1 \
         ORDER BY created_at DESC \
         LIMIT $2",
    )
    .bind(since)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
