//! 散步奖励处理器

use axum::{Json, extract::State};

use crate::{
    error::LedgerError,
    service::{ApiResponse, CreditWalkRequest, WalkRewardDto},
    state::AppState,
};

/// 入账一次散步奖励
///
/// POST /api/bot/walks
pub async fn credit_walk(
    State(state): State<AppState>,
    Json(request): Json<CreditWalkRequest>,
) -> Result<Json<ApiResponse<WalkRewardDto>>, LedgerError> {
    let reward = state.rewards.credit_walk(request).await?;
    Ok(Json(ApiResponse::success(reward)))
}
