//! 家庭仓储
//!
//! 家庭聚合值（余额、步数）只在成员账本写入的同一事务内增量维护

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

use super::traits::FamilyRepositoryTrait;
use crate::error::Result;
use crate::models::{Family, User};

/// 家庭仓储
pub struct FamilyRepository {
    pool: PgPool,
}

impl FamilyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 获取家庭
    pub async fn get(&self, id: i64) -> Result<Option<Family>> {
        let family = sqlx::query_as::<_, Family>(
            r#"
            SELECT id, name, balance, step_count, created_at, updated_at
            FROM families
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(family)
    }

    /// 列出家庭成员
    pub async fn list_members(&self, family_id: i64) -> Result<Vec<User>> {
        let members = sqlx::query_as::<_, User>(
            r#"
            SELECT id, telegram_id, username, phone, email, balance, step_count,
                   walk_count_stroller, walk_count_dog, walk_count_stroller_dog,
                   landing_source, family_id, role, is_active, created_at, updated_at
            FROM users
            WHERE family_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(family_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    // ==================== 事务操作 ====================

    /// 在事务中记录成员散步（余额 + 步数聚合）
    pub async fn apply_walk_reward_in_tx(
        tx: &mut PgConnection,
        family_id: i64,
        points: i64,
        steps: i64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE families
            SET balance = balance + $2, step_count = step_count + $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(family_id)
        .bind(points)
        .bind(steps)
        .execute(tx)
        .await?;

        Ok(())
    }

    /// 在事务中增量调整家庭余额聚合
    pub async fn increment_balance_in_tx(
        tx: &mut PgConnection,
        family_id: i64,
        delta: i64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE families
            SET balance = balance + $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(family_id)
        .bind(delta)
        .execute(tx)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl FamilyRepositoryTrait for FamilyRepository {
    async fn get(&self, id: i64) -> Result<Option<Family>> {
        self.get(id).await
    }

    async fn list_members(&self, family_id: i64) -> Result<Vec<User>> {
        self.list_members(family_id).await
    }
}
