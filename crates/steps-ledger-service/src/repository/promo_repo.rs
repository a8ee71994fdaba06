//! 促销码仓储
//!
//! 兑换通过条件 UPDATE 原子递增 used_count，
//! 并发兑换下 used_count 永远不会超过 max_uses

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

use super::traits::PromoRepositoryTrait;
use crate::error::Result;
use crate::models::{PromoCode, PromoGroup};

/// 促销码仓储
pub struct PromoRepository {
    pool: PgPool,
}

impl PromoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 按码值查找
    pub async fn get_by_code(&self, code: &str) -> Result<Option<PromoCode>> {
        let promo = sqlx::query_as::<_, PromoCode>(
            r#"
            SELECT id, group_id, code, max_uses, used_count, is_active,
                   created_at, updated_at
            FROM promo_codes
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(promo)
    }

    /// 获取促销码分组
    pub async fn get_group(&self, id: i64) -> Result<Option<PromoGroup>> {
        let group = sqlx::query_as::<_, PromoGroup>(
            r#"
            SELECT id, name, discount_percent, is_active, created_at, updated_at
            FROM promo_groups
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(group)
    }

    // ==================== 事务操作 ====================

    /// 在事务中按码值查找
    ///
    /// 兑换失败后区分“码不存在”与“码已用完”时使用
    pub async fn get_by_code_in_tx(tx: &mut PgConnection, code: &str) -> Result<Option<PromoCode>> {
        let promo = sqlx::query_as::<_, PromoCode>(
            r#"
            SELECT id, group_id, code, max_uses, used_count, is_active,
                   created_at, updated_at
            FROM promo_codes
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(tx)
        .await?;

        Ok(promo)
    }

    /// 在事务中原子兑换促销码
    ///
    /// 条件递增：仅当码启用且 used_count < max_uses 时才加一并返回该码；
    /// 返回 None 表示码已用完、已停用或不存在，由调用方区分具体原因
    pub async fn redeem_in_tx(tx: &mut PgConnection, code: &str) -> Result<Option<PromoCode>> {
        let promo = sqlx::query_as::<_, PromoCode>(
            r#"
            UPDATE promo_codes
            SET used_count = used_count + 1, updated_at = NOW()
            WHERE code = $1 AND is_active = true AND used_count < max_uses
            RETURNING id, group_id, code, max_uses, used_count, is_active,
                      created_at, updated_at
            "#,
        )
        .bind(code)
        .fetch_optional(tx)
        .await?;

        Ok(promo)
    }

    /// 在事务中获取促销码分组
    pub async fn get_group_in_tx(tx: &mut PgConnection, id: i64) -> Result<Option<PromoGroup>> {
        let group = sqlx::query_as::<_, PromoGroup>(
            r#"
            SELECT id, name, discount_percent, is_active, created_at, updated_at
            FROM promo_groups
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(tx)
        .await?;

        Ok(group)
    }
}

#[async_trait]
impl PromoRepositoryTrait for PromoRepository {
    async fn get_by_code(&self, code: &str) -> Result<Option<PromoCode>> {
        self.get_by_code(code).await
    }

    async fn get_group(&self, id: i64) -> Result<Option<PromoGroup>> {
        self.get_group(id).await
    }
}
