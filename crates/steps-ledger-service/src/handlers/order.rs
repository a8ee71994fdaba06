//! 订单处理器
//!
//! 下单、查询自己的订单、取消未发货订单。

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::{
    error::LedgerError,
    models::Order,
    service::{ApiResponse, PlaceOrderRequest, PlacedOrderDto},
    state::AppState,
};

/// 订单列表查询参数
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListParams {
    pub telegram_id: i64,
    /// 返回条数上限，缺省 10
    pub limit: Option<i64>,
}

/// 取消订单请求体
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrderRequest {
    pub telegram_id: i64,
}

/// 下单
///
/// POST /api/bot/orders
pub async fn place_order(
    State(state): State<AppState>,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<Json<ApiResponse<PlacedOrderDto>>, LedgerError> {
    let placed = state.orders.place_order(request).await?;
    Ok(Json(ApiResponse::success(placed)))
}

/// 用户订单列表，新到旧
///
/// GET /api/bot/orders
pub async fn list_orders(
    State(state): State<AppState>,
    Query(params): Query<OrderListParams>,
) -> Result<Json<ApiResponse<Vec<Order>>>, LedgerError> {
    let limit = params.limit.unwrap_or(10).clamp(1, 50);
    let orders = state
        .orders
        .list_user_orders(params.telegram_id, limit)
        .await?;
    Ok(Json(ApiResponse::success(orders)))
}

/// 取消自己的订单并退回积分
///
/// POST /api/bot/orders/{order_id}/cancel
pub async fn cancel_order(
    State(state): State<AppState>,
    Path(order_id): Path<i64>,
    Json(request): Json<CancelOrderRequest>,
) -> Result<Json<ApiResponse<Order>>, LedgerError> {
    let order = state
        .orders
        .cancel_order(request.telegram_id, order_id)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}
