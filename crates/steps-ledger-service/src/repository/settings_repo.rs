//! 机器人设置仓储
//!
//! referral_reward_percent 的解析在这里完成：
//! 键缺失视为 0（分成关闭），格式错误是配置故障，必须报错而不是默认

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Row};

use super::traits::SettingsRepositoryTrait;
use crate::error::{LedgerError, Result};
use crate::models::{BotSetting, setting_keys};

/// 设置仓储
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 获取设置项
    pub async fn get(&self, key: &str) -> Result<Option<BotSetting>> {
        let setting = sqlx::query_as::<_, BotSetting>(
            r#"
            SELECT id, key, value, updated_at
            FROM bot_settings
            WHERE key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(setting)
    }

    /// 获取设置值
    pub async fn get_value(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query(
            r#"
            SELECT value
            FROM bot_settings
            WHERE key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.get("value")))
    }

    /// 列出所有设置项
    pub async fn list(&self) -> Result<Vec<BotSetting>> {
        let settings = sqlx::query_as::<_, BotSetting>(
            r#"
            SELECT id, key, value, updated_at
            FROM bot_settings
            ORDER BY key ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(settings)
    }

    /// 写入设置项（存在则覆盖）
    pub async fn upsert(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO bot_settings (key, value, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (key) DO UPDATE
            SET value = EXCLUDED.value, updated_at = NOW()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// 读取邀请人分成百分比
    ///
    /// 键缺失返回 0；值无法解析为 0-100 的整数时报配置错误
    pub async fn referral_reward_percent(&self) -> Result<i64> {
        let value = self.get_value(setting_keys::REFERRAL_REWARD_PERCENT).await?;
        parse_percent(value.as_deref())
    }

    // ==================== 事务操作 ====================

    /// 在事务中读取邀请人分成百分比
    ///
    /// 奖励事务内读取，保证分成与账本写入看到同一配置
    pub async fn referral_reward_percent_in_tx(tx: &mut PgConnection) -> Result<i64> {
        let row = sqlx::query(
            r#"
            SELECT value
            FROM bot_settings
            WHERE key = $1
            "#,
        )
        .bind(setting_keys::REFERRAL_REWARD_PERCENT)
        .fetch_optional(tx)
        .await?;

        parse_percent(row.map(|r| r.get::<String, _>("value")).as_deref())
    }
}

/// 解析百分比设置值
fn parse_percent(value: Option<&str>) -> Result<i64> {
    match value {
        None => Ok(0),
        Some(raw) => match raw.trim().parse::<i64>() {
            Ok(percent) if (0..=100).contains(&percent) => Ok(percent),
            _ => Err(LedgerError::MisconfiguredSetting {
                key: setting_keys::REFERRAL_REWARD_PERCENT.to_string(),
                value: raw.to_string(),
            }),
        },
    }
}

#[async_trait]
impl SettingsRepositoryTrait for SettingsRepository {
    async fn get(&self, key: &str) -> Result<Option<BotSetting>> {
        self.get(key).await
    }

    async fn get_value(&self, key: &str) -> Result<Option<String>> {
        self.get_value(key).await
    }

    async fn list(&self) -> Result<Vec<BotSetting>> {
        self.list().await
    }

    async fn upsert(&self, key: &str, value: &str) -> Result<()> {
        self.upsert(key, value).await
    }

    async fn referral_reward_percent(&self) -> Result<i64> {
        self.referral_reward_percent().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_percent_valid() {
        assert_eq!(parse_percent(Some("10")).unwrap(), 10);
        assert_eq!(parse_percent(Some("0")).unwrap(), 0);
        assert_eq!(parse_percent(Some("100")).unwrap(), 100);
        assert_eq!(parse_percent(Some(" 25 ")).unwrap(), 25);
    }

    #[test]
    fn test_parse_percent_missing_is_zero() {
        // 键未配置表示分成关闭，不是错误
        assert_eq!(parse_percent(None).unwrap(), 0);
    }

    #[test]
    fn test_parse_percent_malformed_is_loud() {
        for raw in ["abc", "10%", "-5", "101", "10.5", ""] {
            let err = parse_percent(Some(raw)).unwrap_err();
            assert!(
                matches!(err, LedgerError::MisconfiguredSetting { .. }),
                "期望配置错误: raw={raw}"
            );
        }
    }
}
