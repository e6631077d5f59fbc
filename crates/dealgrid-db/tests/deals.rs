//! Database-backed tests for the deal store operations.
//!
//! Each test runs against a freshly migrated database provisioned by
//! `#[sqlx::test]`.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use dealgrid_core::{DealSource, DealType, ScrapedDeal};
use dealgrid_db::deals::{
    deactivate_expired_deals, find_deal_by_source_id, list_deals_created_since, upsert_deal,
};
use dealgrid_db::tools::list_active_tools;

fn scraped(source_id: &str) -> ScrapedDeal {
    ScrapedDeal {
        source: DealSource::AppSumo,
        source_id: source_id.to_string(),
        source_url: format!("https://appsumo.com/products/{source_id}/"),
        deal_type: DealType::Lifetime,
        title: format!("{source_id} - Lifetime Deal"),
        description: Some("A tool".to_string()),
        original_price: Some(Decimal::from(199)),
        deal_price: Decimal::from(69),
        discount_percent: Some(65),
        currency: "USD".to_string(),
        coupon_code: None,
        affiliate_url: None,
        image_url: None,
        expires_at: None,
        tool_name: Some(source_id.to_string()),
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn upsert_inserts_then_updates_on_the_same_listing(pool: PgPool) {
    let deal = scraped("notely");

    let first = upsert_deal(&pool, &deal, None, true).await.expect("insert");
    assert!(first.inserted);

    let mut changed = deal.clone();
    changed.deal_price = Decimal::from(59);
    changed.description = None;

    let second = upsert_deal(&pool, &changed, None, true).await.expect("update");
    assert!(!second.inserted);
    assert_eq!(second.id, first.id);

    // Full overwrite, not merge: the cleared description is gone.
    let row = find_deal_by_source_id(&pool, DealSource::AppSumo, "notely")
        .await
        .expect("query")
        .expect("row");
    assert_eq!(row.deal_price, Decimal::from(59));
    assert_eq!(row.description, None);
}

#[sqlx::test(migrations = "../../migrations")]
async fn upsert_defaults_affiliate_url_to_source_url(pool: PgPool) {
    let deal = scraped("notely");
    upsert_deal(&pool, &deal, None, true).await.expect("insert");

    let row = find_deal_by_source_id(&pool, DealSource::AppSumo, "notely")
        .await
        .expect("query")
        .expect("row");
    assert_eq!(row.affiliate_url, deal.source_url);

    let mut monetised = deal.clone();
    monetised.affiliate_url =
        Some("https://appsumo.com/products/notely/?partner=dealgrid".to_string());
    upsert_deal(&pool, &monetised, None, true).await.expect("update");

    let row = find_deal_by_source_id(&pool, DealSource::AppSumo, "notely")
        .await
        .expect("query")
        .expect("row");
    assert!(row.affiliate_url.contains("partner=dealgrid"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn upsert_links_tool_and_reactivates_expired_row(pool: PgPool) {
    let tool_id: i64 = sqlx::query_scalar(
        "INSERT INTO tools (name, slug, status) VALUES ('Notely', 'notely', 'active') RETURNING id",
    )
    .fetch_one(&pool)
    .await
    .expect("seed tool");

    let mut deal = scraped("notely");
    deal.expires_at = Some(Utc::now() - Duration::hours(1));
    upsert_deal(&pool, &deal, Some(tool_id), true).await.expect("insert");

    let expired = deactivate_expired_deals(&pool, Utc::now()).await.expect("sweep");
    assert_eq!(expired, 1);

    // A listing observed again goes live again.
    deal.expires_at = Some(Utc::now() + Duration::days(7));
    upsert_deal(&pool, &deal, Some(tool_id), true).await.expect("update");

    let row = find_deal_by_source_id(&pool, DealSource::AppSumo, "notely")
        .await
        .expect("query")
        .expect("row");
    assert!(row.is_active);
    assert_eq!(row.tool_id, Some(tool_id));
    assert!(row.is_verified);
}

#[sqlx::test(migrations = "../../migrations")]
async fn expiry_sweep_is_idempotent_and_skips_null_deadlines(pool: PgPool) {
    let mut stale = scraped("stale");
    stale.expires_at = Some(Utc::now() - Duration::hours(2));
    upsert_deal(&pool, &stale, None, true).await.expect("insert");

    // No deadline: must never auto-expire.
    upsert_deal(&pool, &scraped("evergreen"), None, true)
        .await
        .expect("insert");

    assert_eq!(deactivate_expired_deals(&pool, Utc::now()).await.expect("sweep"), 1);
    assert_eq!(deactivate_expired_deals(&pool, Utc::now()).await.expect("sweep"), 0);

    let evergreen = find_deal_by_source_id(&pool, DealSource::AppSumo, "evergreen")
        .await
        .expect("query")
        .expect("row");
    assert!(evergreen.is_active);
}

#[sqlx::test(migrations = "../../migrations")]
async fn created_since_returns_only_active_recent_rows(pool: PgPool) {
    upsert_deal(&pool, &scraped("fresh"), None, true).await.expect("insert");

    let mut stale = scraped("stale");
    stale.expires_at = Some(Utc::now() - Duration::hours(2));
    upsert_deal(&pool, &stale, None, true).await.expect("insert");
    deactivate_expired_deals(&pool, Utc::now()).await.expect("sweep");

    let since = Utc::now() - Duration::minutes(5);
    let rows = list_deals_created_since(&pool, since, 50).await.expect("query");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].source_id, "fresh");
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_active_tools_excludes_inactive_entries(pool: PgPool) {
    sqlx::query(
        "INSERT INTO tools (name, slug, status) VALUES \
         ('Notely', 'notely', 'active'), \
         ('Ghosted', 'ghosted', 'archived')",
    )
    .execute(&pool)
    .await
    .expect("seed tools");

    let tools = list_active_tools(&pool).await.expect("query");
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].slug, "notely");
}
