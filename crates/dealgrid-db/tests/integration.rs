//! Offline unit tests for dealgrid-db pool configuration and row types.
//! These tests do not require a live database connection.

use chrono::Utc;
use dealgrid_core::{AppConfig, Environment};
use dealgrid_db::{DealRow, DealWrite, PoolConfig, ToolRow};
use rust_decimal::Decimal;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

fn test_app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8088),
        log_level: "info".to_string(),
        cron_secret: Some("secret".to_string()),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        scraper_request_timeout_secs: 30,
        scraper_user_agent: "ua".to_string(),
        scraper_max_retries: 2,
        scraper_retry_backoff_base_secs: 1,
        scraper_max_concurrent_sources: 4,
        appsumo_partner_id: None,
        scrape_cron: None,
        expire_cron: None,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&test_app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`DealRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn deal_row_has_expected_fields() {
    let row = DealRow {
        id: 1_i64,
        tool_id: None,
        source: "appsumo".to_string(),
        source_id: "notion-clone".to_string(),
        source_url: "https://appsumo.com/products/notion-clone/".to_string(),
        deal_type: "lifetime".to_string(),
        title: "Notion Clone - Lifetime Deal".to_string(),
        description: None,
        original_price: Some(Decimal::new(19900, 2)),
        deal_price: Decimal::new(4900, 2),
        discount_percent: Some(75),
        currency: "USD".to_string(),
        coupon_code: None,
        affiliate_url: "https://appsumo.com/products/notion-clone/".to_string(),
        image_url: None,
        expires_at: None,
        is_active: true,
        is_verified: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    assert_eq!(row.id, 1);
    assert!(row.tool_id.is_none());
    assert!(row.is_active);
    assert!(row.expires_at.is_none());
}

#[test]
fn tool_row_has_expected_fields() {
    let row = ToolRow {
        id: 7,
        name: "Notion".to_string(),
        slug: "notion".to_string(),
        status: "active".to_string(),
    };
    assert_eq!(row.slug, "notion");
}

#[test]
fn deal_write_reports_insert_flag() {
    let write = DealWrite {
        id: 3,
        inserted: true,
    };
    assert!(write.inserted);
}
