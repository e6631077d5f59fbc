//! Read surface for newly ingested deals.
//!
//! The alert dispatcher polls this endpoint after a scrape run to pick up
//! deals the reconciler just inserted.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct DealItem {
    id: i64,
    tool_id: Option<i64>,
    source: String,
    source_id: String,
    source_url: String,
    deal_type: String,
    title: String,
    description: Option<String>,
    original_price: Option<Decimal>,
    deal_price: Decimal,
    discount_percent: Option<i32>,
    currency: String,
    coupon_code: Option<String>,
    affiliate_url: String,
    image_url: Option<String>,
    expires_at: Option<DateTime<Utc>>,
    is_active: bool,
    is_verified: bool,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RecentDealsQuery {
    pub since: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

pub(super) async fn list_recent_deals(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<RecentDealsQuery>,
) -> Result<Json<ApiResponse<Vec<DealItem>>>, ApiError> {
    let since = query.since.unwrap_or_else(|| Utc::now() - Duration::hours(24));

    let rows = dealgrid_db::deals::list_deals_created_since(
        &state.pool,
        since,
        normalize_limit(query.limit),
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| DealItem {
            id: row.id,
            tool_id: row.tool_id,
            source: row.source,
            source_id: row.source_id,
            source_url: row.source_url,
            deal_type: row.deal_type,
            title: row.title,
            description: row.description,
            original_price: row.original_price,
            deal_price: row.deal_price,
            discount_percent: row.discount_percent,
            currency: row.currency,
            coupon_code: row.coupon_code,
            affiliate_url: row.affiliate_url,
            image_url: row.image_url,
            expires_at: row.expires_at,
            is_active: row.is_active,
            is_verified: row.is_verified,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
