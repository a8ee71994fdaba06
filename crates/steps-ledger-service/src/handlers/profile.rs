//! 用户档案处理器

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use crate::{
    error::LedgerError,
    service::{ApiResponse, ProfileDto, UpdateContactRequest, UserProfileDto},
    state::AppState,
};

/// 获取用户档案
///
/// GET /api/bot/profile/{telegram_id}
///
/// 返回余额、步数、家庭名称和客服联系方式
#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(telegram_id): Path<i64>,
) -> Result<Json<ApiResponse<ProfileDto>>, LedgerError> {
    let profile = state.queries.profile(telegram_id).await?;
    Ok(Json(ApiResponse::success(profile)))
}

/// 更新联系方式
///
/// PATCH /api/bot/profile/{telegram_id}/contact
pub async fn update_contact(
    State(state): State<AppState>,
    Path(telegram_id): Path<i64>,
    Json(request): Json<UpdateContactRequest>,
) -> Result<Json<ApiResponse<UserProfileDto>>, LedgerError> {
    let profile = state
        .registration
        .update_contact(telegram_id, request)
        .await?;
    Ok(Json(ApiResponse::success(profile)))
}
