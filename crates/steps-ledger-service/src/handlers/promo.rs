//! 促销码处理器

use axum::{Json, extract::State};
use serde::Deserialize;

use crate::{
    error::LedgerError,
    service::{ApiResponse, PromoRedemptionDto},
    state::AppState,
};

/// 兑换请求体
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemPromoRequest {
    pub telegram_id: i64,
    pub code: String,
}

/// 兑换促销码
///
/// POST /api/bot/promo/redeem
pub async fn redeem(
    State(state): State<AppState>,
    Json(request): Json<RedeemPromoRequest>,
) -> Result<Json<ApiResponse<PromoRedemptionDto>>, LedgerError> {
    let redemption = state
        .promos
        .redeem(request.telegram_id, &request.code)
        .await?;
    Ok(Json(ApiResponse::success(redemption)))
}
