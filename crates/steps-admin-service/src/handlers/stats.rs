//! 统计 API 处理器
//!
//! 运营总览：用户规模、积分进出、散步形式分布、订单状态分布和归因来源分布

use axum::{Json, extract::State};
use tracing::instrument;

use steps_ledger::source_label;

use crate::{
    dto::{ApiResponse, OrdersByStatusDto, SourceCountDto, StatsOverview, WalksByFormDto},
    error::AdminError,
    state::AppState,
};

/// 获取统计总览
///
/// GET /api/admin/stats/overview
#[instrument(skip(state))]
pub async fn get_stats_overview(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<StatsOverview>>, AdminError> {
    let (total_users, active_users): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COUNT(*) FILTER (WHERE is_active) FROM users",
    )
    .fetch_one(&state.pool)
    .await?;

    // 入账为正数条目之和，出账取负数条目之和的相反数
    let (total_points_issued, total_points_spent): (i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COALESCE(SUM(amount) FILTER (WHERE amount > 0), 0)::bigint,
            COALESCE(-SUM(amount) FILTER (WHERE amount < 0), 0)::bigint
        FROM ledger_entries
        "#,
    )
    .fetch_one(&state.pool)
    .await?;

    let (stroller, dog, stroller_dog): (i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COALESCE(SUM(walk_count_stroller), 0)::bigint,
            COALESCE(SUM(walk_count_dog), 0)::bigint,
            COALESCE(SUM(walk_count_stroller_dog), 0)::bigint
        FROM users
        "#,
    )
    .fetch_one(&state.pool)
    .await?;

    let (new, processing, completed, cancelled): (i64, i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COUNT(*) FILTER (WHERE status = 'NEW'),
            COUNT(*) FILTER (WHERE status = 'PROCESSING'),
            COUNT(*) FILTER (WHERE status = 'COMPLETED'),
            COUNT(*) FILTER (WHERE status = 'CANCELLED')
        FROM orders
        "#,
    )
    .fetch_one(&state.pool)
    .await?;

    let source_rows: Vec<(Option<String>, i64)> = sqlx::query_as(
        r#"
        SELECT referral_source, COUNT(*)
        FROM referrals
        GROUP BY referral_source
        ORDER BY COUNT(*) DESC
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    let referrals_by_source = source_rows
        .into_iter()
        .map(|(source, count)| SourceCountDto {
            source_label: source_label(source.as_deref()),
            count,
        })
        .collect();

    let overview = StatsOverview {
        total_users,
        active_users,
        total_points_issued,
        total_points_spent,
        walks_by_form: WalksByFormDto {
            stroller,
            dog,
            stroller_dog,
        },
        orders_by_status: OrdersByStatusDto {
            new,
            processing,
            completed,
            cancelled,
        },
        referrals_by_source,
    };

    Ok(Json(ApiResponse::success(overview)))
}
