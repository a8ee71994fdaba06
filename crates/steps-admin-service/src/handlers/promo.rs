//! 促销码管理 API 处理器
//!
//! 促销组增删改查与批量生成促销码。
//! 批量生成在单个事务内完成，数量不足（码空间碰撞过多）整体回滚

use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracing::{info, instrument, warn};
use validator::Validate;

use steps_ledger::{PromoCode, PromoGroup};

use crate::{
    dto::{
        ApiResponse, CreatePromoGroupRequest, CreatedResponse, GeneratePromoCodesRequest,
        GeneratedCodesDto, PageResponse, PaginationParams, UpdatePromoCodeStatusRequest,
        UpdatePromoGroupRequest,
    },
    error::AdminError,
    state::AppState,
};

/// 促销码字符表，与测试数据生成器保持一致
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_LENGTH: usize = 8;

/// 单个批次允许的最大尝试次数倍率
const MAX_ATTEMPT_FACTOR: i64 = 10;

fn random_code() -> String {
    use rand::Rng;
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

// ==================== 促销组管理 ====================

/// 获取促销组列表（分页）
///
/// GET /api/admin/promo/groups
#[instrument(skip(state))]
pub async fn list_promo_groups(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<PromoGroup>>>, AdminError> {
    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM promo_groups")
        .fetch_one(&state.pool)
        .await?;

    if total.0 == 0 {
        return Ok(Json(ApiResponse::success(PageResponse::empty(
            pagination.page,
            pagination.page_size,
        ))));
    }

    let groups = sqlx::query_as::<_, PromoGroup>(
        r#"
        SELECT id, name, discount_percent, is_active, created_at, updated_at
        FROM promo_groups
        ORDER BY created_at DESC, id DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(&state.pool)
    .await?;

    let response = PageResponse::new(groups, total.0, pagination.page, pagination.page_size);
    Ok(Json(ApiResponse::success(response)))
}

/// 创建促销组
///
/// POST /api/admin/promo/groups
pub async fn create_promo_group(
    State(state): State<AppState>,
    Json(req): Json<CreatePromoGroupRequest>,
) -> Result<Json<ApiResponse<CreatedResponse>>, AdminError> {
    req.validate()?;

    let row: (i64,) = sqlx::query_as(
        r#"
        INSERT INTO promo_groups (name, discount_percent, is_active, created_at, updated_at)
        VALUES ($1, $2, TRUE, NOW(), NOW())
        RETURNING id
        "#,
    )
    .bind(&req.name)
    .bind(req.discount_percent)
    .fetch_one(&state.pool)
    .await?;

    info!(
        group_id = row.0,
        name = %req.name,
        discount_percent = req.discount_percent,
        "促销组已创建"
    );

    Ok(Json(ApiResponse::success(CreatedResponse::new(row.0))))
}

/// 更新促销组
///
/// PUT /api/admin/promo/groups/{id}
pub async fn update_promo_group(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdatePromoGroupRequest>,
) -> Result<Json<ApiResponse<PromoGroup>>, AdminError> {
    req.validate()?;

    let result = sqlx::query(
        r#"
        UPDATE promo_groups
        SET name = COALESCE($2, name),
            discount_percent = COALESCE($3, discount_percent),
            is_active = COALESCE($4, is_active),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(&req.name)
    .bind(req.discount_percent)
    .bind(req.is_active)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AdminError::PromoGroupNotFound(id));
    }

    info!(group_id = id, "促销组已更新");

    let group = sqlx::query_as::<_, PromoGroup>(
        r#"
        SELECT id, name, discount_percent, is_active, created_at, updated_at
        FROM promo_groups
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(group)))
}

/// 删除促销组
///
/// DELETE /api/admin/promo/groups/{id}
///
/// 仅允许删除没有促销码的组，已发码的组请改为停用
pub async fn delete_promo_group(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, AdminError> {
    let code_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM promo_codes WHERE group_id = $1")
        .bind(id)
        .fetch_one(&state.pool)
        .await?;

    if code_count.0 > 0 {
        return Err(AdminError::Validation(format!(
            "促销组下存在 {} 个促销码，无法删除",
            code_count.0
        )));
    }

    let result = sqlx::query("DELETE FROM promo_groups WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AdminError::PromoGroupNotFound(id));
    }

    info!(group_id = id, "促销组已删除");

    Ok(Json(ApiResponse::<()>::success_empty()))
}

// ==================== 促销码管理 ====================

/// 批量生成促销码
///
/// POST /api/admin/promo/groups/{id}/codes
///
/// 生成的码值全局唯一，碰撞的候选码在事务内丢弃重试；
/// 尝试次数耗尽仍不足量时整批回滚
pub async fn generate_promo_codes(
    State(state): State<AppState>,
    Path(group_id): Path<i64>,
    Json(req): Json<GeneratePromoCodesRequest>,
) -> Result<Json<ApiResponse<GeneratedCodesDto>>, AdminError> {
    req.validate()?;

    let group_exists: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM promo_groups WHERE id = $1)")
            .bind(group_id)
            .fetch_one(&state.pool)
            .await?;
    if !group_exists.0 {
        return Err(AdminError::PromoGroupNotFound(group_id));
    }

    let mut tx = state.pool.begin().await?;
    let mut codes: Vec<String> = Vec::with_capacity(req.count as usize);
    let max_attempts = req.count * MAX_ATTEMPT_FACTOR;
    let mut attempts: i64 = 0;

    while (codes.len() as i64) < req.count && attempts < max_attempts {
        attempts += 1;
        let code = random_code();

        let inserted: Option<(i64,)> = sqlx::query_as(
            r#"
            INSERT INTO promo_codes
                (group_id, code, max_uses, used_count, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, 0, TRUE, NOW(), NOW())
            ON CONFLICT (code) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(group_id)
        .bind(&code)
        .bind(req.max_uses)
        .fetch_optional(&mut *tx)
        .await?;

        if inserted.is_some() {
            codes.push(code);
        }
    }

    if (codes.len() as i64) < req.count {
        warn!(
            group_id,
            requested = req.count,
            generated = codes.len(),
            attempts,
            "促销码生成数量不足，整批回滚"
        );
        return Err(AdminError::PromoGenerationExhausted {
            requested: req.count,
            generated: codes.len() as i64,
        });
    }

    tx.commit().await?;

    info!(group_id, count = codes.len(), "促销码批量生成完成");

    Ok(Json(ApiResponse::success(GeneratedCodesDto {
        group_id,
        codes,
    })))
}

/// 获取促销组下的促销码列表（分页）
///
/// GET /api/admin/promo/groups/{id}/codes
#[instrument(skip(state))]
pub async fn list_promo_codes(
    State(state): State<AppState>,
    Path(group_id): Path<i64>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<PromoCode>>>, AdminError> {
    let group_exists: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM promo_groups WHERE id = $1)")
            .bind(group_id)
            .fetch_one(&state.pool)
            .await?;
    if !group_exists.0 {
        return Err(AdminError::PromoGroupNotFound(group_id));
    }

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM promo_codes WHERE group_id = $1")
        .bind(group_id)
        .fetch_one(&state.pool)
        .await?;

    if total.0 == 0 {
        return Ok(Json(ApiResponse::success(PageResponse::empty(
            pagination.page,
            pagination.page_size,
        ))));
    }

    let codes = sqlx::query_as::<_, PromoCode>(
        r#"
        SELECT id, group_id, code, max_uses, used_count, is_active, created_at, updated_at
        FROM promo_codes
        WHERE group_id = $1
        ORDER BY id DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(group_id)
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(&state.pool)
    .await?;

    let response = PageResponse::new(codes, total.0, pagination.page, pagination.page_size);
    Ok(Json(ApiResponse::success(response)))
}

/// 启用/停用促销码
///
/// PATCH /api/admin/promo/codes/{id}/status
pub async fn update_promo_code_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdatePromoCodeStatusRequest>,
) -> Result<Json<ApiResponse<PromoCode>>, AdminError> {
    req.validate()?;

    let result = sqlx::query(
        "UPDATE promo_codes SET is_active = $2, updated_at = NOW() WHERE id = $1",
    )
    .bind(id)
    .bind(req.is_active)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AdminError::PromoCodeNotFound(id));
    }

    info!(code_id = id, is_active = req.is_active, "促销码状态已更新");

    let code = sqlx::query_as::<_, PromoCode>(
        r#"
        SELECT id, group_id, code, max_uses, used_count, is_active, created_at, updated_at
        FROM promo_codes
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(code)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_code_shape() {
        for _ in 0..50 {
            let code = random_code();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(
                code.chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
            );
        }
    }

    #[test]
    fn test_generate_request_validation() {
        let valid = GeneratePromoCodesRequest {
            count: 100,
            max_uses: 1,
        };
        assert!(valid.validate().is_ok());

        let too_many = GeneratePromoCodesRequest {
            count: 5000,
            max_uses: 1,
        };
        assert!(too_many.validate().is_err());

        let zero_uses = GeneratePromoCodesRequest {
            count: 10,
            max_uses: 0,
        };
        assert!(zero_uses.validate().is_err());
    }

    #[test]
    fn test_create_group_request_validation() {
        let invalid = CreatePromoGroupRequest {
            name: "Весна".to_string(),
            discount_percent: 120,
        };
        assert!(invalid.validate().is_err());

        let valid = CreatePromoGroupRequest {
            name: "Весна".to_string(),
            discount_percent: 25,
        };
        assert!(valid.validate().is_ok());
    }
}
