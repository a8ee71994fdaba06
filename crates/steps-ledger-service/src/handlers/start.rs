//! 注册入口处理器
//!
//! Bot 前端在用户首次进入或重新进入对话时调用，
//! 携带可选的邀请令牌或落地来源标签。

use axum::{Json, extract::State};

use crate::{
    error::LedgerError,
    service::{ApiResponse, StartOutcome, StartRequest},
    state::AppState,
};

/// 注册或刷新用户
///
/// POST /api/bot/start
pub async fn start(
    State(state): State<AppState>,
    Json(request): Json<StartRequest>,
) -> Result<Json<ApiResponse<StartOutcome>>, LedgerError> {
    let outcome = state.registration.start(request).await?;
    Ok(Json(ApiResponse::success(outcome)))
}
