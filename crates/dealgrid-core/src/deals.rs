//! Domain types shared across the ingestion pipeline.
//!
//! A [`ScrapedDeal`] is the transient record a scraper emits for one
//! marketplace listing. It lives for a single scrape cycle: the reconciler
//! maps it onto the persistent `deals` row keyed by `(source, source_id)`
//! and then discards it.
//!
//! `deal_price` is deliberately non-optional. A listing whose price cannot
//! be parsed never becomes a `ScrapedDeal` — the drop happens at parse
//! time, so nothing price-less can reach the store.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The marketplace or channel a deal was observed from.
///
/// String forms are stable and persisted in the `deals.source` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DealSource {
    #[serde(rename = "appsumo")]
    AppSumo,
    #[serde(rename = "stacksocial")]
    StackSocial,
    #[serde(rename = "pitchground")]
    PitchGround,
    #[serde(rename = "direct")]
    Direct,
    #[serde(rename = "user_submitted")]
    UserSubmitted,
}

impl DealSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DealSource::AppSumo => "appsumo",
            DealSource::StackSocial => "stacksocial",
            DealSource::PitchGround => "pitchground",
            DealSource::Direct => "direct",
            DealSource::UserSubmitted => "user_submitted",
        }
    }
}

impl std::fmt::Display for DealSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The commercial shape of a deal.
///
/// String forms are stable and persisted in the `deals.deal_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealType {
    Lifetime,
    Discount,
    Coupon,
    Trial,
    Free,
}

impl DealType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DealType::Lifetime => "lifetime",
            DealType::Discount => "discount",
            DealType::Coupon => "coupon",
            DealType::Trial => "trial",
            DealType::Free => "free",
        }
    }
}

impl std::fmt::Display for DealType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate deal extracted from one marketplace listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedDeal {
    pub source: DealSource,
    /// Marketplace-assigned listing identifier; unique within `source`.
    pub source_id: String,
    /// Canonical URL of the listing.
    pub source_url: String,
    pub deal_type: DealType,
    pub title: String,
    pub description: Option<String>,
    pub original_price: Option<Decimal>,
    pub deal_price: Decimal,
    /// Explicit or derived discount; `None` when it cannot be determined.
    pub discount_percent: Option<i32>,
    /// ISO 4217 code, e.g. `"USD"`.
    pub currency: String,
    pub coupon_code: Option<String>,
    /// Monetised listing URL. The reconciler falls back to `source_url`
    /// when absent.
    pub affiliate_url: Option<String>,
    pub image_url: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    /// Free-text product name used only for catalog matching; never
    /// persisted verbatim.
    pub tool_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deal_source_str_forms_are_snake_case() {
        assert_eq!(DealSource::AppSumo.as_str(), "appsumo");
        assert_eq!(DealSource::UserSubmitted.as_str(), "user_submitted");
    }

    #[test]
    fn deal_source_serde_form_matches_persisted_form() {
        let json = serde_json::to_string(&DealSource::StackSocial).unwrap();
        assert_eq!(json, format!("\"{}\"", DealSource::StackSocial.as_str()));
        let back: DealSource = serde_json::from_str(&json).unwrap();
        assert_eq!(back, DealSource::StackSocial);
    }

    #[test]
    fn deal_type_display_matches_as_str() {
        assert_eq!(DealType::Lifetime.to_string(), "lifetime");
        assert_eq!(DealType::Free.to_string(), "free");
    }
}
