//! 商品目录处理器

use axum::{Json, extract::State};
use tracing::instrument;

use crate::{
    error::LedgerError,
    service::{ApiResponse, CatalogDto},
    state::AppState,
};

/// 获取商品目录
///
/// GET /api/bot/catalog
///
/// 返回全部启用分类及其下启用商品
#[instrument(skip(state))]
pub async fn get_catalog(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CatalogDto>>, LedgerError> {
    let catalog = state.queries.catalog().await?;
    Ok(Json(ApiResponse::success(catalog)))
}
