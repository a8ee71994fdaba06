//! 邀请归因 API 处理器
//!
//! 只读视图：归因记录列表，带双方用户名与来源显示名

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{DateTime, Utc};
use tracing::instrument;

use steps_ledger::source_label;

use crate::{
    dto::{ApiResponse, PageResponse, PaginationParams, ReferralAdminDto, ReferralQueryFilter},
    error::AdminError,
    state::AppState,
};

const REFERRAL_SELECT_SQL: &str = r#"
    SELECT
        r.id,
        r.user_id,
        ru.username as user_username,
        r.inviter_id,
        iu.username as inviter_username,
        r.referral_source,
        r.reward_points,
        r.created_at
    FROM referrals r
    JOIN users ru ON ru.id = r.user_id
    JOIN users iu ON iu.id = r.inviter_id
"#;

const REFERRAL_FILTER_SQL: &str = r#"
    WHERE ($1::text IS NULL OR r.referral_source = $1)
      AND ($2::bigint IS NULL OR r.inviter_id = $2)
"#;

#[derive(sqlx::FromRow)]
struct ReferralRow {
    id: i64,
    user_id: i64,
    user_username: Option<String>,
    inviter_id: i64,
    inviter_username: Option<String>,
    referral_source: Option<String>,
    reward_points: i64,
    created_at: DateTime<Utc>,
}

impl From<ReferralRow> for ReferralAdminDto {
    fn from(row: ReferralRow) -> Self {
        let label = source_label(row.referral_source.as_deref());
        Self {
            id: row.id,
            user_id: row.user_id,
            user_username: row.user_username,
            inviter_id: row.inviter_id,
            inviter_username: row.inviter_username,
            source: row.referral_source,
            source_label: label,
            reward_points: row.reward_points,
            created_at: row.created_at,
        }
    }
}

/// 获取归因记录列表（分页）
///
/// GET /api/admin/referrals
///
/// 支持按来源和邀请人过滤
#[instrument(skip(state))]
pub async fn list_referrals(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<ReferralQueryFilter>,
) -> Result<Json<ApiResponse<PageResponse<ReferralAdminDto>>>, AdminError> {
    let count_sql = format!("SELECT COUNT(*) FROM referrals r {}", REFERRAL_FILTER_SQL);
    let total: (i64,) = sqlx::query_as(&count_sql)
        .bind(&filter.source)
        .bind(filter.inviter_id)
        .fetch_one(&state.pool)
        .await?;

    if total.0 == 0 {
        return Ok(Json(ApiResponse::success(PageResponse::empty(
            pagination.page,
            pagination.page_size,
        ))));
    }

    let page_sql = format!(
        "{} {} ORDER BY r.created_at DESC, r.id DESC LIMIT $3 OFFSET $4",
        REFERRAL_SELECT_SQL, REFERRAL_FILTER_SQL
    );
    let rows = sqlx::query_as::<_, ReferralRow>(&page_sql)
        .bind(&filter.source)
        .bind(filter.inviter_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&state.pool)
        .await?;

    let items: Vec<ReferralAdminDto> = rows.into_iter().map(Into::into).collect();

    let response = PageResponse::new(items, total.0, pagination.page, pagination.page_size);
    Ok(Json(ApiResponse::success(response)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referral_row_to_dto_resolves_label() {
        let row = ReferralRow {
            id: 1,
            user_id: 10,
            user_username: Some("novice".to_string()),
            inviter_id: 20,
            inviter_username: None,
            referral_source: Some("sticker".to_string()),
            reward_points: 360,
            created_at: Utc::now(),
        };
        let dto: ReferralAdminDto = row.into();
        assert_eq!(dto.source.as_deref(), Some("sticker"));
        assert_eq!(dto.source_label, "Наклейки");
        assert_eq!(dto.reward_points, 360);
    }

    #[test]
    fn test_referral_row_without_source_shows_dash() {
        let row = ReferralRow {
            id: 2,
            user_id: 11,
            user_username: None,
            inviter_id: 21,
            inviter_username: Some("mentor".to_string()),
            referral_source: None,
            reward_points: 0,
            created_at: Utc::now(),
        };
        let dto: ReferralAdminDto = row.into();
        assert!(dto.source.is_none());
        assert_eq!(dto.source_label, "—");
    }
}
