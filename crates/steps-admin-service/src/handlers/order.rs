//! 订单管理 API 处理器
//!
//! 列表视图为管理端专用查询，状态流转复用账本服务的订单服务，
//! 取消订单时的退积分与库存恢复逻辑保持一致

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use tracing::{info, instrument};
use validator::Validate;

use steps_ledger::{Order, OrderStatus, service::OrderDetailDto};

use crate::{
    dto::{
        ApiResponse, OrderAdminDto, OrderQueryFilter, PageResponse, PaginationParams,
        UpdateOrderStatusRequest,
    },
    error::AdminError,
    state::AppState,
};

const ORDER_SELECT_SQL: &str = r#"
    SELECT
        o.id,
        o.user_id,
        u.username,
        u.telegram_id,
        o.status,
        o.total_points,
        o.pvz_id,
        o.comment,
        o.created_at
    FROM orders o
    JOIN users u ON u.id = o.user_id
"#;

const ORDER_FILTER_SQL: &str = r#"
    WHERE ($1::varchar IS NULL OR o.status = $1)
      AND ($2::bigint IS NULL OR o.user_id = $2)
"#;

#[derive(sqlx::FromRow)]
struct OrderListRow {
    id: i64,
    user_id: i64,
    username: Option<String>,
    telegram_id: i64,
    status: OrderStatus,
    total_points: i64,
    pvz_id: Option<i64>,
    comment: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<OrderListRow> for OrderAdminDto {
    fn from(row: OrderListRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            username: row.username,
            telegram_id: row.telegram_id,
            status: row.status,
            total_points: row.total_points,
            pvz_id: row.pvz_id,
            comment: row.comment,
            created_at: row.created_at,
        }
    }
}

/// 获取订单列表（分页）
///
/// GET /api/admin/orders
///
/// 支持按状态和下单用户过滤
#[instrument(skip(state))]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<OrderQueryFilter>,
) -> Result<Json<ApiResponse<PageResponse<OrderAdminDto>>>, AdminError> {
    let count_sql = format!("SELECT COUNT(*) FROM orders o {}", ORDER_FILTER_SQL);
    let total: (i64,) = sqlx::query_as(&count_sql)
        .bind(filter.status)
        .bind(filter.user_id)
        .fetch_one(&state.pool)
        .await?;

    if total.0 == 0 {
        return Ok(Json(ApiResponse::success(PageResponse::empty(
            pagination.page,
            pagination.page_size,
        ))));
    }

    let page_sql = format!(
        "{} {} ORDER BY o.created_at DESC, o.id DESC LIMIT $3 OFFSET $4",
        ORDER_SELECT_SQL, ORDER_FILTER_SQL
    );
    let rows = sqlx::query_as::<_, OrderListRow>(&page_sql)
        .bind(filter.status)
        .bind(filter.user_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&state.pool)
        .await?;

    let items: Vec<OrderAdminDto> = rows.into_iter().map(Into::into).collect();

    let response = PageResponse::new(items, total.0, pagination.page, pagination.page_size);
    Ok(Json(ApiResponse::success(response)))
}

/// 获取订单详情（含明细行）
///
/// GET /api/admin/orders/{id}
#[instrument(skip(state))]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<OrderDetailDto>>, AdminError> {
    let detail = state.orders.get_order_detail(id).await?;
    Ok(Json(ApiResponse::success(detail)))
}

/// 更新订单状态
///
/// POST /api/admin/orders/{id}/status
///
/// 转入 CANCELLED 会退回积分并恢复库存，终态订单拒绝任何流转
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateOrderStatusRequest>,
) -> Result<Json<ApiResponse<Order>>, AdminError> {
    req.validate()?;

    let order = state.orders.update_status(id, req.status).await?;

    info!(order_id = id, status = ?req.status, "管理端更新订单状态");

    Ok(Json(ApiResponse::success(order)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_row_to_dto() {
        let row = OrderListRow {
            id: 15,
            user_id: 3,
            username: Some("walker".to_string()),
            telegram_id: 100500,
            status: OrderStatus::New,
            total_points: 600,
            pvz_id: None,
            comment: Some("позвонить заранее".to_string()),
            created_at: Utc::now(),
        };
        let dto: OrderAdminDto = row.into();
        assert_eq!(dto.id, 15);
        assert_eq!(dto.status, OrderStatus::New);
        assert_eq!(dto.comment.as_deref(), Some("позвонить заранее"));
    }

    #[test]
    fn test_status_filter_deserialization() {
        let filter: OrderQueryFilter =
            serde_json::from_str(r#"{"status": "PROCESSING", "userId": 7}"#).unwrap();
        assert_eq!(filter.status, Some(OrderStatus::Processing));
        assert_eq!(filter.user_id, Some(7));
    }
}
