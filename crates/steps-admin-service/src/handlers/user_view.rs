//! 用户管理 API 处理器
//!
//! 用户列表（多条件过滤）、详情、状态切换、账本流水和统计视图

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{info, instrument};
use validator::Validate;

use steps_ledger::{LedgerEntry, source_label};

use crate::{
    dto::{
        ApiResponse, PageResponse, PaginationParams, ReferralInfoDto, UpdateUserStatusRequest,
        UserAdminDto, UserQueryFilter, UserStatsDto,
    },
    error::AdminError,
    state::AppState,
};

/// 用户列表行查询片段
///
/// 列表、详情与 CSV 导出共用，过滤条件见 [`USER_FILTER_SQL`]
pub(crate) const USER_SELECT_SQL: &str = r#"
    SELECT
        u.id,
        u.telegram_id,
        u.username,
        u.phone,
        u.email,
        u.balance,
        u.step_count,
        u.walk_count_stroller,
        u.walk_count_dog,
        u.walk_count_stroller_dog,
        u.landing_source,
        u.family_id,
        f.name as family_name,
        EXISTS(SELECT 1 FROM referrals r WHERE r.user_id = u.id) as has_referral,
        u.role,
        u.is_active,
        u.created_at
    FROM users u
    LEFT JOIN families f ON f.id = u.family_id
"#;

/// 用户过滤条件片段
///
/// 绑定顺序：$1 搜索模式、$2 角色、$3 启用状态、$4 是否有家庭、
/// $5 是否有归因、$6 落地来源、$7/$8 散步次数档位下限/上限
pub(crate) const USER_FILTER_SQL: &str = r#"
    WHERE ($1::text IS NULL
           OR u.username ILIKE $1
           OR u.phone ILIKE $1
           OR u.email ILIKE $1
           OR u.telegram_id::text LIKE $1)
      AND ($2::text IS NULL OR u.role = $2)
      AND ($3::boolean IS NULL OR u.is_active = $3)
      AND ($4::boolean IS NULL OR (u.family_id IS NOT NULL) = $4)
      AND ($5::boolean IS NULL
           OR EXISTS(SELECT 1 FROM referrals r WHERE r.user_id = u.id) = $5)
      AND ($6::text IS NULL OR u.landing_source = $6)
      AND ($7::int IS NULL
           OR u.walk_count_stroller + u.walk_count_dog + u.walk_count_stroller_dog >= $7)
      AND ($8::int IS NULL
           OR u.walk_count_stroller + u.walk_count_dog + u.walk_count_stroller_dog <= $8)
"#;

/// 数据库查询结果行结构
#[derive(sqlx::FromRow)]
pub(crate) struct UserListRow {
    pub id: i64,
    pub telegram_id: i64,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub balance: i64,
    pub step_count: i64,
    pub walk_count_stroller: i32,
    pub walk_count_dog: i32,
    pub walk_count_stroller_dog: i32,
    pub landing_source: Option<String>,
    pub family_id: Option<i64>,
    pub family_name: Option<String>,
    pub has_referral: bool,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl UserListRow {
    pub fn total_walks(&self) -> i32 {
        self.walk_count_stroller + self.walk_count_dog + self.walk_count_stroller_dog
    }
}

impl From<UserListRow> for UserAdminDto {
    fn from(row: UserListRow) -> Self {
        let total_walks = row.total_walks();
        Self {
            id: row.id,
            telegram_id: row.telegram_id,
            username: row.username,
            phone: row.phone,
            email: row.email,
            balance: row.balance,
            step_count: row.step_count,
            walk_count_stroller: row.walk_count_stroller,
            walk_count_dog: row.walk_count_dog,
            walk_count_stroller_dog: row.walk_count_stroller_dog,
            total_walks,
            landing_source: row.landing_source,
            family_id: row.family_id,
            family_name: row.family_name,
            has_referral: row.has_referral,
            role: row.role,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

/// 过滤条件的绑定值
///
/// 列表、计数与导出共用一份绑定顺序
pub(crate) struct UserFilterBinds {
    pub search_pattern: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub has_family: Option<bool>,
    pub has_referral: Option<bool>,
    pub landing_source: Option<String>,
    pub walks_min: Option<i32>,
    pub walks_max: Option<i32>,
}

impl UserFilterBinds {
    pub fn from_filter(filter: &UserQueryFilter) -> Self {
        Self {
            search_pattern: filter.search.as_ref().map(|s| format!("%{}%", s.trim())),
            role: filter.role.clone(),
            is_active: filter.is_active,
            has_family: filter.has_family,
            has_referral: filter.has_referral,
            landing_source: filter.landing_source.clone(),
            walks_min: filter.walks.map(|b| b.range().0),
            walks_max: filter.walks.and_then(|b| b.range().1),
        }
    }
}

/// 获取用户列表（分页）
///
/// GET /api/admin/users
#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<UserQueryFilter>,
) -> Result<Json<ApiResponse<PageResponse<UserAdminDto>>>, AdminError> {
    let binds = UserFilterBinds::from_filter(&filter);

    let count_sql = format!("SELECT COUNT(*) FROM users u {}", USER_FILTER_SQL);
    let total: (i64,) = sqlx::query_as(&count_sql)
        .bind(&binds.search_pattern)
        .bind(&binds.role)
        .bind(binds.is_active)
        .bind(binds.has_family)
        .bind(binds.has_referral)
        .bind(&binds.landing_source)
        .bind(binds.walks_min)
        .bind(binds.walks_max)
        .fetch_one(&state.pool)
        .await?;

    if total.0 == 0 {
        return Ok(Json(ApiResponse::success(PageResponse::empty(
            pagination.page,
            pagination.page_size,
        ))));
    }

    let page_sql = format!(
        "{} {} ORDER BY u.created_at DESC, u.id DESC LIMIT $9 OFFSET $10",
        USER_SELECT_SQL, USER_FILTER_SQL
    );
    let rows = sqlx::query_as::<_, UserListRow>(&page_sql)
        .bind(&binds.search_pattern)
        .bind(&binds.role)
        .bind(binds.is_active)
        .bind(binds.has_family)
        .bind(binds.has_referral)
        .bind(&binds.landing_source)
        .bind(binds.walks_min)
        .bind(binds.walks_max)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&state.pool)
        .await?;

    let items: Vec<UserAdminDto> = rows.into_iter().map(Into::into).collect();

    let response = PageResponse::new(items, total.0, pagination.page, pagination.page_size);
    Ok(Json(ApiResponse::success(response)))
}

/// 按 ID 查询单个用户
async fn fetch_user_by_id(pool: &PgPool, id: i64) -> Result<UserListRow, AdminError> {
    let sql = format!("{} WHERE u.id = $1", USER_SELECT_SQL);
    sqlx::query_as::<_, UserListRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AdminError::UserNotFound(id))
}

/// 获取用户详情
///
/// GET /api/admin/users/{id}
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<UserAdminDto>>, AdminError> {
    let row = fetch_user_by_id(&state.pool, id).await?;
    Ok(Json(ApiResponse::success(row.into())))
}

/// 启用/停用用户
///
/// PATCH /api/admin/users/{id}/status
pub async fn update_user_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserStatusRequest>,
) -> Result<Json<ApiResponse<UserAdminDto>>, AdminError> {
    req.validate()?;

    let result = sqlx::query("UPDATE users SET is_active = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(req.is_active)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AdminError::UserNotFound(id));
    }

    info!(user_id = id, is_active = req.is_active, "用户状态已更新");

    let row = fetch_user_by_id(&state.pool, id).await?;
    Ok(Json(ApiResponse::success(row.into())))
}

/// 获取用户账本流水（分页，新到旧）
///
/// GET /api/admin/users/{id}/ledger
#[instrument(skip(state))]
pub async fn get_user_ledger(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<LedgerEntry>>>, AdminError> {
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
        .bind(id)
        .fetch_one(&state.pool)
        .await?;
    if !exists.0 {
        return Err(AdminError::UserNotFound(id));
    }

    let (entries, total) = state
        .queries
        .ledger_page(id, pagination.page, pagination.limit())
        .await?;

    let response = PageResponse::new(entries, total, pagination.page, pagination.page_size);
    Ok(Json(ApiResponse::success(response)))
}

/// 归因信息行
#[derive(sqlx::FromRow)]
struct ReferralInfoRow {
    inviter_id: i64,
    inviter_username: Option<String>,
    referral_source: Option<String>,
    reward_points: i64,
}

/// 获取用户统计
///
/// GET /api/admin/users/{id}/stats
///
/// 详情页汇总视图：余额、步数、各形式散步次数、
/// 散步时段摘要、购买摘要和邀请关系
#[instrument(skip(state))]
pub async fn get_user_stats(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<UserStatsDto>>, AdminError> {
    let row = fetch_user_by_id(&state.pool, id).await?;

    let walk_schedule = state.queries.walk_schedule_summary(id).await?;
    let purchases = state.queries.purchases_summary(id).await?;

    let referral_count: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM referrals WHERE inviter_id = $1")
            .bind(id)
            .fetch_one(&state.pool)
            .await?;

    let referral = sqlx::query_as::<_, ReferralInfoRow>(
        r#"
        SELECT r.inviter_id, iu.username as inviter_username, r.referral_source, r.reward_points
        FROM referrals r
        JOIN users iu ON iu.id = r.inviter_id
        WHERE r.user_id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&state.pool)
    .await?
    .map(|info| ReferralInfoDto {
        inviter_id: info.inviter_id,
        inviter_username: info.inviter_username,
        source_label: source_label(info.referral_source.as_deref()),
        reward_points: info.reward_points,
    });

    let dto = UserStatsDto {
        user_id: row.id,
        balance: row.balance,
        step_count: row.step_count,
        walk_count_stroller: row.walk_count_stroller,
        walk_count_dog: row.walk_count_dog,
        walk_count_stroller_dog: row.walk_count_stroller_dog,
        total_walks: row.total_walks(),
        walk_schedule,
        purchases,
        referral_count: referral_count.0,
        referral,
    };

    Ok(Json(ApiResponse::success(dto)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::WalkBucket;

    fn sample_row() -> UserListRow {
        UserListRow {
            id: 1,
            telegram_id: 100500,
            username: Some("walker".to_string()),
            phone: None,
            email: None,
            balance: 1800,
            step_count: 12000,
            walk_count_stroller: 2,
            walk_count_dog: 5,
            walk_count_stroller_dog: 1,
            landing_source: Some("sticker".to_string()),
            family_id: None,
            family_name: None,
            has_referral: true,
            role: "USER".to_string(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_to_dto_computes_total_walks() {
        let dto: UserAdminDto = sample_row().into();
        assert_eq!(dto.total_walks, 8);
        assert_eq!(dto.telegram_id, 100500);
        assert!(dto.has_referral);
    }

    #[test]
    fn test_filter_binds_search_pattern() {
        let filter = UserQueryFilter {
            search: Some("  ivan  ".to_string()),
            ..Default::default()
        };
        let binds = UserFilterBinds::from_filter(&filter);
        assert_eq!(binds.search_pattern.as_deref(), Some("%ivan%"));
    }

    #[test]
    fn test_filter_binds_walk_bucket() {
        let filter = UserQueryFilter {
            walks: Some(WalkBucket::SixToTwenty),
            ..Default::default()
        };
        let binds = UserFilterBinds::from_filter(&filter);
        assert_eq!(binds.walks_min, Some(6));
        assert_eq!(binds.walks_max, Some(20));

        let filter = UserQueryFilter {
            walks: Some(WalkBucket::TwentyOnePlus),
            ..Default::default()
        };
        let binds = UserFilterBinds::from_filter(&filter);
        assert_eq!(binds.walks_min, Some(21));
        assert_eq!(binds.walks_max, None);
    }

    #[test]
    fn test_empty_filter_binds_are_all_none() {
        let binds = UserFilterBinds::from_filter(&UserQueryFilter::default());
        assert!(binds.search_pattern.is_none());
        assert!(binds.role.is_none());
        assert!(binds.is_active.is_none());
        assert!(binds.has_family.is_none());
        assert!(binds.has_referral.is_none());
        assert!(binds.landing_source.is_none());
        assert!(binds.walks_min.is_none());
        assert!(binds.walks_max.is_none());
    }
}
