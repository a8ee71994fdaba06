//! 订单仓储

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Row};

use super::traits::OrderRepositoryTrait;
use crate::error::Result;
use crate::models::{Order, OrderItem, OrderStatus};

/// 订单仓储
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 获取订单
    pub async fn get_order(&self, id: i64) -> Result<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, status, total_points, pvz_id, comment,
                   created_at, updated_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// 列出用户订单（新单在前）
    pub async fn list_by_user(&self, user_id: i64, limit: i64) -> Result<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, status, total_points, pvz_id, comment,
                   created_at, updated_at
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// 列出订单明细行
    pub async fn list_items(&self, order_id: i64) -> Result<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, product_id, title, price_points, quantity
            FROM order_items
            WHERE order_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// 列出用户已完成订单的全部明细行
    ///
    /// 管理后台"购买汇总"列的数据来源，按下单时间排序
    pub async fn list_completed_items_by_user(&self, user_id: i64) -> Result<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT i.id, i.order_id, i.product_id, i.title, i.price_points, i.quantity
            FROM order_items i
            JOIN orders o ON o.id = i.order_id
            WHERE o.user_id = $1 AND o.status = 'COMPLETED'
            ORDER BY o.created_at ASC, i.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    // ==================== 事务操作 ====================

    /// 在事务中获取订单（带行级锁）
    ///
    /// 状态流转前锁定订单行，避免并发的重复取消/完成
    pub async fn get_order_for_update(tx: &mut PgConnection, id: i64) -> Result<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, status, total_points, pvz_id, comment,
                   created_at, updated_at
            FROM orders
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(tx)
        .await?;

        Ok(order)
    }

    /// 在事务中创建订单
    pub async fn create_in_tx(tx: &mut PgConnection, order: &Order) -> Result<i64> {
        let row = sqlx::query(
            r#"
            INSERT INTO orders (user_id, status, total_points, pvz_id, comment, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(order.user_id)
        .bind(order.status)
        .bind(order.total_points)
        .bind(order.pvz_id)
        .bind(&order.comment)
        .bind(order.created_at)
        .bind(order.updated_at)
        .fetch_one(tx)
        .await?;

        Ok(row.get("id"))
    }

    /// 在事务中创建订单明细行
    pub async fn create_item_in_tx(tx: &mut PgConnection, item: &OrderItem) -> Result<i64> {
        let row = sqlx::query(
            r#"
            INSERT INTO order_items (order_id, product_id, title, price_points, quantity)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(item.order_id)
        .bind(item.product_id)
        .bind(&item.title)
        .bind(item.price_points)
        .bind(item.quantity)
        .fetch_one(tx)
        .await?;

        Ok(row.get("id"))
    }

    /// 在事务中更新订单状态
    pub async fn update_status_in_tx(
        tx: &mut PgConnection,
        id: i64,
        status: OrderStatus,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE orders
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .execute(tx)
        .await?;

        Ok(())
    }

    /// 在事务中列出订单明细行（取消时恢复库存用）
    pub async fn list_items_in_tx(
        tx: &mut PgConnection,
        order_id: i64,
    ) -> Result<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, product_id, title, price_points, quantity
            FROM order_items
            WHERE order_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(order_id)
        .fetch_all(tx)
        .await?;

        Ok(items)
    }
}

#[async_trait]
impl OrderRepositoryTrait for OrderRepository {
    async fn get_order(&self, id: i64) -> Result<Option<Order>> {
        self.get_order(id).await
    }

    async fn list_by_user(&self, user_id: i64, limit: i64) -> Result<Vec<Order>> {
        self.list_by_user(user_id, limit).await
    }

    async fn list_items(&self, order_id: i64) -> Result<Vec<OrderItem>> {
        self.list_items(order_id).await
    }
}
