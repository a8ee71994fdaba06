//! 机器人设置 API 处理器
//!
//! 自由键值存储的管理端入口。已知键在写入前校验取值格式，
//! 防止运营把分成比例配成无法解析的值后奖励入账静默跳过分成

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::{info, instrument};
use validator::Validate;

use steps_ledger::{BotSetting, setting_keys};

use crate::{
    dto::{ApiResponse, UpdateSettingRequest},
    error::AdminError,
    state::AppState,
};

/// 已知键的取值校验
fn validate_known_key(key: &str, value: &str) -> Result<(), AdminError> {
    if key == setting_keys::REFERRAL_REWARD_PERCENT {
        let parsed: i32 = value.trim().parse().map_err(|_| {
            AdminError::Validation(format!("设置 {} 必须是 0-100 的整数，当前值: {}", key, value))
        })?;
        if !(0..=100).contains(&parsed) {
            return Err(AdminError::Validation(format!(
                "设置 {} 必须在 0-100 之间，当前值: {}",
                key, parsed
            )));
        }
    }
    Ok(())
}

/// 获取设置列表
///
/// GET /api/admin/settings
#[instrument(skip(state))]
pub async fn list_settings(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<BotSetting>>>, AdminError> {
    let settings = sqlx::query_as::<_, BotSetting>(
        "SELECT id, key, value, updated_at FROM bot_settings ORDER BY key",
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(settings)))
}

/// 获取单个设置
///
/// GET /api/admin/settings/{key}
#[instrument(skip(state))]
pub async fn get_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<BotSetting>>, AdminError> {
    let setting = sqlx::query_as::<_, BotSetting>(
        "SELECT id, key, value, updated_at FROM bot_settings WHERE key = $1",
    )
    .bind(&key)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AdminError::SettingNotFound(key))?;

    Ok(Json(ApiResponse::success(setting)))
}

/// 写入设置（不存在则创建）
///
/// PUT /api/admin/settings/{key}
pub async fn upsert_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<UpdateSettingRequest>,
) -> Result<Json<ApiResponse<BotSetting>>, AdminError> {
    req.validate()?;
    validate_known_key(&key, &req.value)?;

    let setting = sqlx::query_as::<_, BotSetting>(
        r#"
        INSERT INTO bot_settings (key, value, updated_at)
        VALUES ($1, $2, NOW())
        ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
        RETURNING id, key, value, updated_at
        "#,
    )
    .bind(&key)
    .bind(&req.value)
    .fetch_one(&state.pool)
    .await?;

    info!(key = %setting.key, "设置已写入");

    Ok(Json(ApiResponse::success(setting)))
}

/// 删除设置
///
/// DELETE /api/admin/settings/{key}
pub async fn delete_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<()>>, AdminError> {
    let result = sqlx::query("DELETE FROM bot_settings WHERE key = $1")
        .bind(&key)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AdminError::SettingNotFound(key));
    }

    info!(key = %key, "设置已删除");

    Ok(Json(ApiResponse::<()>::success_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referral_percent_accepts_valid_range() {
        assert!(validate_known_key(setting_keys::REFERRAL_REWARD_PERCENT, "0").is_ok());
        assert!(validate_known_key(setting_keys::REFERRAL_REWARD_PERCENT, "100").is_ok());
        assert!(validate_known_key(setting_keys::REFERRAL_REWARD_PERCENT, " 20 ").is_ok());
    }

    #[test]
    fn test_referral_percent_rejects_bad_values() {
        assert!(validate_known_key(setting_keys::REFERRAL_REWARD_PERCENT, "abc").is_err());
        assert!(validate_known_key(setting_keys::REFERRAL_REWARD_PERCENT, "101").is_err());
        assert!(validate_known_key(setting_keys::REFERRAL_REWARD_PERCENT, "-5").is_err());
        assert!(validate_known_key(setting_keys::REFERRAL_REWARD_PERCENT, "20.5").is_err());
    }

    #[test]
    fn test_free_form_keys_skip_validation() {
        assert!(validate_known_key(setting_keys::SUPPORT_CONTACT, "@steps_support").is_ok());
        assert!(validate_known_key("произвольный_ключ", "любое значение").is_ok());
    }
}
