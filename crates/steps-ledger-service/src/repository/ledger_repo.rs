//! 账本仓储
//!
//! 账本是只追加的流水表：唯一的写入原语是 append，
//! 不存在任何 UPDATE/DELETE 路径

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Row};

use super::traits::LedgerRepositoryTrait;
use crate::error::Result;
use crate::models::LedgerEntry;

/// 账本仓储
pub struct LedgerRepository {
    pool: PgPool,
}

impl LedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 追加账本条目
    ///
    /// 返回新条目的 ID
    pub async fn append(&self, entry: &LedgerEntry) -> Result<i64> {
        let row = sqlx::query(
            r#"
            INSERT INTO ledger_entries (user_id, amount, title, walk_form, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(entry.user_id)
        .bind(entry.amount)
        .bind(&entry.title)
        .bind(entry.walk_form)
        .bind(entry.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("id"))
    }

    /// 分页列出用户的账本流水（新记录在前）
    pub async fn list_by_user(
        &self,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LedgerEntry>> {
        let entries = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT id, user_id, amount, title, walk_form, created_at
            FROM ledger_entries
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// 用户流水条数
    pub async fn count_by_user(&self, user_id: i64) -> Result<i64> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) as total
            FROM ledger_entries
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("total"))
    }

    /// 用户流水金额之和
    ///
    /// 不变式：users.balance 必须等于该值
    pub async fn sum_by_user(&self, user_id: i64) -> Result<i64> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(amount), 0) as total
            FROM ledger_entries
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("total"))
    }

    /// 列出用户散步奖励条目的时间戳（用于散步时段统计）
    pub async fn list_walk_entry_times(&self, user_id: i64) -> Result<Vec<DateTime<Utc>>> {
        let rows = sqlx::query(
            r#"
            SELECT created_at
            FROM ledger_entries
            WHERE user_id = $1 AND walk_form IS NOT NULL
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.get("created_at")).collect())
    }

    // ==================== 事务操作 ====================

    /// 在事务中追加账本条目
    ///
    /// 调用方负责在同一事务内同步 users.balance（以及家庭聚合）
    pub async fn append_in_tx(tx: &mut PgConnection, entry: &LedgerEntry) -> Result<i64> {
        let row = sqlx::query(
            r#"
            INSERT INTO ledger_entries (user_id, amount, title, walk_form, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(entry.user_id)
        .bind(entry.amount)
        .bind(&entry.title)
        .bind(entry.walk_form)
        .bind(entry.created_at)
        .fetch_one(tx)
        .await?;

        Ok(row.get("id"))
    }
}

#[async_trait]
impl LedgerRepositoryTrait for LedgerRepository {
    async fn append(&self, entry: &LedgerEntry) -> Result<i64> {
        self.append(entry).await
    }

    async fn list_by_user(
        &self,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LedgerEntry>> {
        self.list_by_user(user_id, limit, offset).await
    }

    async fn count_by_user(&self, user_id: i64) -> Result<i64> {
        self.count_by_user(user_id).await
    }

    async fn sum_by_user(&self, user_id: i64) -> Result<i64> {
        self.sum_by_user(user_id).await
    }

    async fn list_walk_entry_times(&self, user_id: i64) -> Result<Vec<DateTime<Utc>>> {
        self.list_walk_entry_times(user_id).await
    }
}
