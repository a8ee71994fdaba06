//! 家庭管理 API 处理器
//!
//! 家庭的增删改查与成员列表，余额与步数为成员聚合值

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use tracing::{info, instrument};
use validator::Validate;

use crate::{
    dto::{
        ApiResponse, CreateFamilyRequest, CreatedResponse, FamilyAdminDto, PageResponse,
        PaginationParams, UpdateFamilyRequest, UserAdminDto,
    },
    error::AdminError,
    handlers::user_view::{USER_SELECT_SQL, UserListRow},
    state::AppState,
};

#[derive(sqlx::FromRow)]
struct FamilyRow {
    id: i64,
    name: String,
    balance: i64,
    step_count: i64,
    member_count: i64,
    created_at: DateTime<Utc>,
}

impl From<FamilyRow> for FamilyAdminDto {
    fn from(row: FamilyRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            balance: row.balance,
            step_count: row.step_count,
            member_count: row.member_count,
            created_at: row.created_at,
        }
    }
}

const FAMILY_SELECT_SQL: &str = r#"
    SELECT
        f.id,
        f.name,
        f.balance,
        f.step_count,
        (SELECT COUNT(*) FROM users u WHERE u.family_id = f.id) as member_count,
        f.created_at
    FROM families f
"#;

/// 获取家庭列表（分页）
///
/// GET /api/admin/families
#[instrument(skip(state))]
pub async fn list_families(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<FamilyAdminDto>>>, AdminError> {
    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM families")
        .fetch_one(&state.pool)
        .await?;

    if total.0 == 0 {
        return Ok(Json(ApiResponse::success(PageResponse::empty(
            pagination.page,
            pagination.page_size,
        ))));
    }

    let sql = format!(
        "{} ORDER BY f.created_at DESC, f.id DESC LIMIT $1 OFFSET $2",
        FAMILY_SELECT_SQL
    );
    let rows = sqlx::query_as::<_, FamilyRow>(&sql)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&state.pool)
        .await?;

    let items: Vec<FamilyAdminDto> = rows.into_iter().map(Into::into).collect();

    let response = PageResponse::new(items, total.0, pagination.page, pagination.page_size);
    Ok(Json(ApiResponse::success(response)))
}

/// 获取家庭详情
///
/// GET /api/admin/families/{id}
#[instrument(skip(state))]
pub async fn get_family(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<FamilyAdminDto>>, AdminError> {
    let sql = format!("{} WHERE f.id = $1", FAMILY_SELECT_SQL);
    let row = sqlx::query_as::<_, FamilyRow>(&sql)
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(AdminError::FamilyNotFound(id))?;

    Ok(Json(ApiResponse::success(row.into())))
}

/// 获取家庭成员列表
///
/// GET /api/admin/families/{id}/members
#[instrument(skip(state))]
pub async fn list_family_members(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<UserAdminDto>>>, AdminError> {
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM families WHERE id = $1)")
        .bind(id)
        .fetch_one(&state.pool)
        .await?;
    if !exists.0 {
        return Err(AdminError::FamilyNotFound(id));
    }

    let sql = format!("{} WHERE u.family_id = $1 ORDER BY u.id", USER_SELECT_SQL);
    let rows = sqlx::query_as::<_, UserListRow>(&sql)
        .bind(id)
        .fetch_all(&state.pool)
        .await?;

    let members: Vec<UserAdminDto> = rows.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(members)))
}

/// 创建家庭
///
/// POST /api/admin/families
pub async fn create_family(
    State(state): State<AppState>,
    Json(req): Json<CreateFamilyRequest>,
) -> Result<Json<ApiResponse<CreatedResponse>>, AdminError> {
    req.validate()?;

    let row: (i64,) = sqlx::query_as(
        r#"
        INSERT INTO families (name, balance, step_count, created_at, updated_at)
        VALUES ($1, 0, 0, NOW(), NOW())
        RETURNING id
        "#,
    )
    .bind(&req.name)
    .fetch_one(&state.pool)
    .await?;

    info!(family_id = row.0, name = %req.name, "家庭已创建");

    Ok(Json(ApiResponse::success(CreatedResponse::new(row.0))))
}

/// 更新家庭
///
/// PUT /api/admin/families/{id}
pub async fn update_family(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateFamilyRequest>,
) -> Result<Json<ApiResponse<FamilyAdminDto>>, AdminError> {
    req.validate()?;

    let result = sqlx::query(
        r#"
        UPDATE families
        SET name = COALESCE($2, name), updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(&req.name)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AdminError::FamilyNotFound(id));
    }

    info!(family_id = id, "家庭已更新");

    let sql = format!("{} WHERE f.id = $1", FAMILY_SELECT_SQL);
    let row = sqlx::query_as::<_, FamilyRow>(&sql)
        .bind(id)
        .fetch_one(&state.pool)
        .await?;

    Ok(Json(ApiResponse::success(row.into())))
}

/// 删除家庭
///
/// DELETE /api/admin/families/{id}
///
/// 成员先解除归属再删除家庭，用户记录本身保留
pub async fn delete_family(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, AdminError> {
    let mut tx = state.pool.begin().await?;

    sqlx::query("UPDATE users SET family_id = NULL, updated_at = NOW() WHERE family_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM families WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AdminError::FamilyNotFound(id));
    }

    tx.commit().await?;

    info!(family_id = id, "家庭已删除");

    Ok(Json(ApiResponse::<()>::success_empty()))
}
