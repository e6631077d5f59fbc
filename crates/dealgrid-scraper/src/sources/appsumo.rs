//! AppSumo listing scraper.
//!
//! AppSumo ships several frontend generations at once, so card markup is
//! unstable: class names are hashed, renamed, or replaced per experiment.
//! The parser therefore tries a list of card selectors in order and, when
//! none matches, falls back to locating product-detail anchors and walking
//! up to the nearest card-like container. Prices inside a card are display
//! strings; the first dollar amount is the deal price and the second, when
//! present, the pre-discount price.

use async_trait::async_trait;
use chrono::Utc;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

use dealgrid_core::{DealSource, DealType, ScrapedDeal};

use crate::client::PageClient;
use crate::contract::{DealScraper, ScrapeOutcome};
use crate::parse::{
    closest_ancestor, derive_discount_percent, dollar_amounts, first_attr, first_text,
    static_selector,
};

const APPSUMO_BASE_URL: &str = "https://appsumo.com";
const APPSUMO_AI_COLLECTION_URL: &str = "https://appsumo.com/collections/ai-tools/";

/// Card selector strategies, tried in order. AppSumo has cycled through
/// all of these in observed page snapshots.
const CARD_SELECTORS: &[&str] = &[
    r#"[class*="product-card"]"#,
    r#"[class*="ProductCard"]"#,
    "[data-product-id]",
    ".grid-item",
    r#"article[class*="product"]"#,
];

/// Container shapes accepted when walking up from a bare product anchor.
const CONTAINER_SELECTOR: &str = r#"[class*="card"], [class*="product"], article, .grid-item"#;

pub struct AppSumoScraper {
    listing_url: String,
    partner_id: Option<String>,
}

impl AppSumoScraper {
    #[must_use]
    pub fn new(partner_id: Option<String>) -> Self {
        Self {
            listing_url: APPSUMO_AI_COLLECTION_URL.to_string(),
            partner_id,
        }
    }

    /// Points the scraper at a different listing URL. Used by tests to
    /// target a local fixture server.
    #[must_use]
    pub fn with_listing_url(mut self, listing_url: impl Into<String>) -> Self {
        self.listing_url = listing_url.into();
        self
    }

    /// Appends the configured partner id to a product URL, or returns the
    /// canonical URL unmodified when no partner id is set or the URL does
    /// not parse.
    fn affiliate_url(&self, product_url: &str) -> Option<String> {
        let partner = self.partner_id.as_deref()?;
        let mut url = reqwest::Url::parse(product_url).ok()?;
        url.query_pairs_mut().append_pair("partner", partner);
        Some(url.to_string())
    }

    fn parse_listing(&self, html: &str) -> (Vec<ScrapedDeal>, Vec<String>) {
        let document = Html::parse_document(html);
        let mut deals = Vec::new();
        let mut errors = Vec::new();

        let cards = locate_cards(&document);

        let mut seen_ids: HashSet<String> = HashSet::new();
        for card in cards {
            match self.parse_card(card) {
                Ok(Some(deal)) => {
                    if seen_ids.insert(deal.source_id.clone()) {
                        deals.push(deal);
                    }
                }
                Ok(None) => {}
                Err(reason) => errors.push(format!("failed to parse product card: {reason}")),
            }
        }

        if deals.is_empty() && errors.is_empty() {
            errors.push("no deals found - page structure may have changed".to_string());
        }

        (deals, errors)
    }

    /// Parses one card element into a deal candidate.
    ///
    /// `Ok(None)` means the element is not a usable deal card (no product
    /// link, or no parsable price — price-less listings are dropped here,
    /// before anything reaches the reconciler). `Err` marks a card that is
    /// recognisably a product but structurally broken, which is worth
    /// surfacing to operators.
    fn parse_card(&self, card: ElementRef<'_>) -> Result<Option<ScrapedDeal>, String> {
        let link_sel = static_selector(r#"a[href*="/products/"]"#);
        let href = match first_attr(card, &link_sel, "href") {
            Some(href) => href,
            None => return Ok(None),
        };

        let product_url = if href.starts_with("http") {
            href.clone()
        } else {
            format!("{APPSUMO_BASE_URL}{href}")
        };

        let source_id = match product_source_id(&href) {
            Some(id) => id,
            None => return Ok(None),
        };

        let title_sel =
            static_selector(r#"[class*="product-name"], [class*="title"], h3, h4"#);
        let title = first_text(card, &title_sel)
            .ok_or_else(|| format!("product {source_id} has no title element"))?;

        let desc_sel = static_selector(r#"[class*="tagline"], [class*="description"], p"#);
        let description = first_text(card, &desc_sel);

        let price_sel = static_selector(r#"[class*="price"]"#);
        let price_text: String = card
            .select(&price_sel)
            .flat_map(|el| el.text())
            .collect::<Vec<_>>()
            .join(" ");
        let amounts = dollar_amounts(&price_text);

        // First listed amount is the deal price on AppSumo; the second,
        // when present, is the crossed-out original.
        let Some(deal_price) = amounts.first().copied() else {
            tracing::debug!(source_id = %source_id, "dropping card without a parsable price");
            return Ok(None);
        };
        let original_price = amounts.get(1).copied();

        let img_sel = static_selector("img");
        let image_url = first_attr(card, &img_sel, "src")
            .or_else(|| first_attr(card, &img_sel, "data-src"));

        Ok(Some(ScrapedDeal {
            source: DealSource::AppSumo,
            source_id,
            source_url: product_url.clone(),
            deal_type: DealType::Lifetime,
            title: format!("{title} - Lifetime Deal"),
            description,
            original_price,
            deal_price,
            discount_percent: derive_discount_percent(original_price, deal_price),
            currency: "USD".to_string(),
            coupon_code: None,
            affiliate_url: self.affiliate_url(&product_url),
            image_url,
            expires_at: None,
            tool_name: Some(title),
        }))
    }
}

#[async_trait]
impl DealScraper for AppSumoScraper {
    fn name(&self) -> &str {
        "AppSumo"
    }

    async fn scrape(&self, client: &PageClient) -> ScrapeOutcome {
        let scraped_at = Utc::now();

        let html = match client.fetch_page(&self.listing_url).await {
            Ok(html) => html,
            Err(e) => {
                return ScrapeOutcome {
                    deals: Vec::new(),
                    errors: vec![format!("failed to fetch {}: {e}", self.listing_url)],
                    scraped_at,
                };
            }
        };

        let (deals, errors) = self.parse_listing(&html);
        tracing::info!(
            deals = deals.len(),
            errors = errors.len(),
            "appsumo scrape finished"
        );

        ScrapeOutcome {
            deals,
            errors,
            scraped_at,
        }
    }
}

/// Finds repeating card elements in the listing document.
///
/// Primary strategy: the first card selector with any matches. Fallback:
/// collect product-detail anchors, dedupe by extracted source id, and walk
/// up to the nearest container-like ancestor — anchors with no such
/// ancestor are not cards and are skipped.
fn locate_cards(document: &Html) -> Vec<ElementRef<'_>> {
    for css in CARD_SELECTORS {
        let selector = static_selector(css);
        let found: Vec<ElementRef<'_>> = document.select(&selector).collect();
        if !found.is_empty() {
            return found;
        }
    }

    let anchor_sel = static_selector(r#"a[href*="/products/"]"#);
    let container_sel = static_selector(CONTAINER_SELECTOR);

    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut cards = Vec::new();
    for anchor in document.select(&anchor_sel) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(source_id) = product_source_id(href) else {
            continue;
        };
        if !seen_ids.insert(source_id) {
            continue;
        }
        if let Some(container) = closest_ancestor(anchor, &container_sel) {
            cards.push(container);
        }
    }

    cards
}

/// Extracts the listing id from a product-detail href: the path segment
/// after `/products/`, with any remaining slashes stripped.
fn product_source_id(href: &str) -> Option<String> {
    let (_, tail) = href.split_once("/products/")?;
    // Query strings and fragments would otherwise leak into the id.
    let tail = tail.split(['?', '#']).next().unwrap_or(tail);
    let id: String = tail.chars().filter(|&c| c != '/').collect();
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

#[cfg(test)]
#[path = "appsumo_test.rs"]
mod tests;
