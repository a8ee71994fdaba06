//! 用户仓储
//!
//! 提供用户数据访问，余额和计数器一律使用增量更新，
//! 事务场景下支持行级锁

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Row};
use walk_reward_engine::WalkForm;

use super::traits::UserRepositoryTrait;
use crate::error::Result;
use crate::models::User;

/// 用户仓储
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==================== 查询操作 ====================

    /// 根据内部 ID 获取用户
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, telegram_id, username, phone, email, balance, step_count,
                   walk_count_stroller, walk_count_dog, walk_count_stroller_dog,
                   landing_source, family_id, role, is_active, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// 根据 Telegram ID 获取用户
    pub async fn get_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, telegram_id, username, phone, email, balance, step_count,
                   walk_count_stroller, walk_count_dog, walk_count_stroller_dog,
                   landing_source, family_id, role, is_active, created_at, updated_at
            FROM users
            WHERE telegram_id = $1
            "#,
        )
        .bind(telegram_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    // ==================== 写入操作 ====================

    /// 创建用户
    ///
    /// 返回新记录的 ID
    pub async fn create(&self, user: &User) -> Result<i64> {
        let row = sqlx::query(
            r#"
            INSERT INTO users
                (telegram_id, username, phone, email, balance, step_count,
                 walk_count_stroller, walk_count_dog, walk_count_stroller_dog,
                 landing_source, family_id, role, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING id
            "#,
        )
        .bind(user.telegram_id)
        .bind(&user.username)
        .bind(&user.phone)
        .bind(&user.email)
        .bind(user.balance)
        .bind(user.step_count)
        .bind(user.walk_count_stroller)
        .bind(user.walk_count_dog)
        .bind(user.walk_count_stroller_dog)
        .bind(&user.landing_source)
        .bind(user.family_id)
        .bind(user.role)
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("id"))
    }

    /// 刷新用户名（/start 时同步 Telegram 资料）
    pub async fn update_username(&self, id: i64, username: Option<&str>) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET username = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(username)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// 更新联系方式
    ///
    /// 只覆盖传入的字段，None 表示保持原值
    pub async fn update_contact(
        &self,
        id: i64,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET phone = COALESCE($2, phone),
                email = COALESCE($3, email),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(phone)
        .bind(email)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// 启用/停用用户
    pub async fn set_active(&self, id: i64, is_active: bool) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET is_active = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(is_active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ==================== 事务操作 ====================

    /// 在事务中根据 Telegram ID 获取用户（带行级锁）
    pub async fn get_by_telegram_id_for_update(
        tx: &mut PgConnection,
        telegram_id: i64,
    ) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, telegram_id, username, phone, email, balance, step_count,
                   walk_count_stroller, walk_count_dog, walk_count_stroller_dog,
                   landing_source, family_id, role, is_active, created_at, updated_at
            FROM users
            WHERE telegram_id = $1
            FOR UPDATE
            "#,
        )
        .bind(telegram_id)
        .fetch_optional(tx)
        .await?;

        Ok(user)
    }

    /// 在事务中根据内部 ID 获取用户（带行级锁）
    ///
    /// 扣分前锁定用户行，余额校验与扣减在同一把锁内完成
    pub async fn get_by_id_for_update(tx: &mut PgConnection, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, telegram_id, username, phone, email, balance, step_count,
                   walk_count_stroller, walk_count_dog, walk_count_stroller_dog,
                   landing_source, family_id, role, is_active, created_at, updated_at
            FROM users
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(tx)
        .await?;

        Ok(user)
    }

    /// 在事务中根据内部 ID 获取用户（不加锁）
    ///
    /// 用于事务内的辅助读取，如增量更新后回读余额
    pub async fn get_by_id_in_tx(tx: &mut PgConnection, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, telegram_id, username, phone, email, balance, step_count,
                   walk_count_stroller, walk_count_dog, walk_count_stroller_dog,
                   landing_source, family_id, role, is_active, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(tx)
        .await?;

        Ok(user)
    }

    /// 在事务中创建用户
    pub async fn create_in_tx(tx: &mut PgConnection, user: &User) -> Result<i64> {
        let row = sqlx::query(
            r#"
            INSERT INTO users
                (telegram_id, username, phone, email, balance, step_count,
                 walk_count_stroller, walk_count_dog, walk_count_stroller_dog,
                 landing_source, family_id, role, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING id
            "#,
        )
        .bind(user.telegram_id)
        .bind(&user.username)
        .bind(&user.phone)
        .bind(&user.email)
        .bind(user.balance)
        .bind(user.step_count)
        .bind(user.walk_count_stroller)
        .bind(user.walk_count_dog)
        .bind(user.walk_count_stroller_dog)
        .bind(&user.landing_source)
        .bind(user.family_id)
        .bind(user.role)
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(tx)
        .await?;

        Ok(row.get("id"))
    }

    /// 在事务中记录散步奖励
    ///
    /// 一次更新余额、累计步数和对应形式的散步计数器
    pub async fn apply_walk_reward_in_tx(
        tx: &mut PgConnection,
        id: i64,
        points: i64,
        steps: i64,
        walk_form: WalkForm,
    ) -> Result<()> {
        let query = match walk_form {
            WalkForm::Stroller => {
                r#"
                UPDATE users
                SET balance = balance + $2, step_count = step_count + $3,
                    walk_count_stroller = walk_count_stroller + 1, updated_at = NOW()
                WHERE id = $1
                "#
            }
            WalkForm::Dog => {
                r#"
                UPDATE users
                SET balance = balance + $2, step_count = step_count + $3,
                    walk_count_dog = walk_count_dog + 1, updated_at = NOW()
                WHERE id = $1
                "#
            }
            WalkForm::StrollerDog => {
                r#"
                UPDATE users
                SET balance = balance + $2, step_count = step_count + $3,
                    walk_count_stroller_dog = walk_count_stroller_dog + 1, updated_at = NOW()
                WHERE id = $1
                "#
            }
        };

        sqlx::query(query)
            .bind(id)
            .bind(points)
            .bind(steps)
            .execute(tx)
            .await?;

        Ok(())
    }

    /// 在事务中增量调整余额（正为入账，负为出账）
    pub async fn increment_balance_in_tx(
        tx: &mut PgConnection,
        id: i64,
        delta: i64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET balance = balance + $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(delta)
        .execute(tx)
        .await?;

        Ok(())
    }

    /// 在事务中写入落地来源（仅当尚未设置时）
    ///
    /// 返回是否发生了写入；已有来源时不覆盖
    pub async fn set_landing_source_if_absent_in_tx(
        tx: &mut PgConnection,
        id: i64,
        source: &str,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET landing_source = $2, updated_at = NOW()
            WHERE id = $1 AND landing_source IS NULL
            "#,
        )
        .bind(id)
        .bind(source)
        .execute(tx)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_by_id(id).await
    }

    async fn get_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>> {
        self.get_by_telegram_id(telegram_id).await
    }

    async fn create(&self, user: &User) -> Result<i64> {
        self.create(user).await
    }

    async fn update_username<'a>(&self, id: i64, username: Option<&'a str>) -> Result<()> {
        self.update_username(id, username).await
    }

    async fn update_contact<'a, 'b>(
        &self,
        id: i64,
        phone: Option<&'a str>,
        email: Option<&'b str>,
    ) -> Result<()> {
        self.update_contact(id, phone, email).await
    }

    async fn set_active(&self, id: i64, is_active: bool) -> Result<()> {
        self.set_active(id, is_active).await
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_repository_methods_exist() {
        // 类型检查：确保方法签名正确
        // 实际测试需要配合测试数据库
    }
}
