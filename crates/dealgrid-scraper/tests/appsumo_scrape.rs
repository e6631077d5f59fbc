//! Integration tests for `AppSumoScraper::scrape` over a real HTTP client.
//!
//! Uses `wiremock` to stand up a local server for each test so no real
//! network traffic is made. Covers the happy path, fetch failures, retry
//! behavior, and the structural-drift diagnostic.

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dealgrid_scraper::{AppSumoScraper, DealScraper, PageClient};

/// Builds a `PageClient` suitable for tests: 5-second timeout, descriptive UA, no retries.
fn test_client() -> PageClient {
    PageClient::new(5, "dealgrid-test/0.1", 0, 0).expect("failed to build test PageClient")
}

/// Builds a `PageClient` with retries enabled and zero backoff for
/// retry-specific tests.
fn test_client_with_retries(max_retries: u32) -> PageClient {
    PageClient::new(5, "dealgrid-test/0.1", max_retries, 0)
        .expect("failed to build test PageClient")
}

fn listing_html() -> &'static str {
    r#"
    <html><body>
      <div class="product-card">
        <a href="/products/notely/">Notely</a>
        <h3 class="product-name">Notely</h3>
        <span class="price">$69</span>
        <span class="price">$199</span>
      </div>
      <div class="product-card">
        <a href="/products/mailpilot/">MailPilot</a>
        <h3 class="product-name">MailPilot</h3>
        <span class="price">$49</span>
      </div>
    </body></html>
    "#
}

#[tokio::test]
async fn scrape_parses_deals_from_listing_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/collections/ai-tools/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html()))
        .mount(&server)
        .await;

    let scraper = AppSumoScraper::new(None)
        .with_listing_url(format!("{}/collections/ai-tools/", server.uri()));
    let outcome = scraper.scrape(&test_client()).await;

    assert!(outcome.success(), "errors: {:?}", outcome.errors);
    assert_eq!(outcome.deals.len(), 2);
    assert_eq!(outcome.deals[0].source_id, "notely");
    assert_eq!(outcome.deals[1].source_id, "mailpilot");
}

#[tokio::test]
async fn scrape_reports_fetch_failure_as_error_outcome() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let scraper = AppSumoScraper::new(None).with_listing_url(server.uri());
    let outcome = scraper.scrape(&test_client()).await;

    assert!(!outcome.success());
    assert!(outcome.deals.is_empty());
    assert_eq!(outcome.errors.len(), 1);
    assert!(
        outcome.errors[0].contains("failed to fetch"),
        "error was: {}",
        outcome.errors[0]
    );
}

#[tokio::test]
async fn scrape_retries_rate_limited_responses() {
    let server = MockServer::start().await;

    // First request is rate limited; the retry succeeds.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "1"))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html()))
        .mount(&server)
        .await;

    let scraper = AppSumoScraper::new(None).with_listing_url(server.uri());
    let outcome = scraper.scrape(&test_client_with_retries(2)).await;

    assert!(outcome.success(), "errors: {:?}", outcome.errors);
    assert_eq!(outcome.deals.len(), 2);
}

#[tokio::test]
async fn scrape_flags_empty_listing_as_drift() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><body>maintenance</body></html>"),
        )
        .mount(&server)
        .await;

    let scraper = AppSumoScraper::new(None).with_listing_url(server.uri());
    let outcome = scraper.scrape(&test_client()).await;

    assert!(!outcome.success());
    assert!(outcome.deals.is_empty());
    assert!(outcome.errors[0].contains("page structure may have changed"));
}
