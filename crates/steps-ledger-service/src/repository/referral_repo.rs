//! 邀请归因仓储
//!
//! user_id 唯一约束保证每个用户至多一条归因记录，
//! 并发重复写入由约束兜底并转换为专门的错误类型

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Row};

use super::traits::ReferralRepositoryTrait;
use crate::error::{LedgerError, Result};
use crate::models::Referral;

/// 邀请归因仓储
pub struct ReferralRepository {
    pool: PgPool,
}

impl ReferralRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 获取用户的归因记录
    pub async fn get_by_user(&self, user_id: i64) -> Result<Option<Referral>> {
        let referral = sqlx::query_as::<_, Referral>(
            r#"
            SELECT id, user_id, inviter_id, referral_source, reward_points, created_at
            FROM referrals
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(referral)
    }

    /// 列出某邀请人带来的所有归因记录
    pub async fn list_by_inviter(&self, inviter_id: i64) -> Result<Vec<Referral>> {
        let referrals = sqlx::query_as::<_, Referral>(
            r#"
            SELECT id, user_id, inviter_id, referral_source, reward_points, created_at
            FROM referrals
            WHERE inviter_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(inviter_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(referrals)
    }

    /// 某邀请人带来的用户数
    pub async fn count_by_inviter(&self, inviter_id: i64) -> Result<i64> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) as total
            FROM referrals
            WHERE inviter_id = $1
            "#,
        )
        .bind(inviter_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("total"))
    }

    // ==================== 事务操作 ====================

    /// 在事务中获取用户的归因记录
    pub async fn get_by_user_in_tx(
        tx: &mut PgConnection,
        user_id: i64,
    ) -> Result<Option<Referral>> {
        let referral = sqlx::query_as::<_, Referral>(
            r#"
            SELECT id, user_id, inviter_id, referral_source, reward_points, created_at
            FROM referrals
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(tx)
        .await?;

        Ok(referral)
    }

    /// 在事务中创建归因记录
    ///
    /// 唯一约束冲突（并发重复归因）转换为 ReferralAlreadyAttributed，
    /// 由调用方按幂等语义处理
    pub async fn create_in_tx(tx: &mut PgConnection, referral: &Referral) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO referrals (user_id, inviter_id, referral_source, reward_points, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(referral.user_id)
        .bind(referral.inviter_id)
        .bind(&referral.referral_source)
        .bind(referral.reward_points)
        .bind(referral.created_at)
        .fetch_one(tx)
        .await;

        match result {
            Ok(row) => Ok(row.get("id")),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(LedgerError::ReferralAlreadyAttributed(referral.user_id))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// 在事务中累加邀请人分成总额
    pub async fn add_reward_points_in_tx(
        tx: &mut PgConnection,
        user_id: i64,
        delta: i64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE referrals
            SET reward_points = reward_points + $2
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(delta)
        .execute(tx)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl ReferralRepositoryTrait for ReferralRepository {
    async fn get_by_user(&self, user_id: i64) -> Result<Option<Referral>> {
        self.get_by_user(user_id).await
    }

    async fn list_by_inviter(&self, inviter_id: i64) -> Result<Vec<Referral>> {
        self.list_by_inviter(inviter_id).await
    }

    async fn count_by_inviter(&self, inviter_id: i64) -> Result<i64> {
        self.count_by_inviter(inviter_id).await
    }
}
