//! 商品目录仓储

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

use super::traits::CatalogRepositoryTrait;
use crate::error::Result;
use crate::models::{CatalogCategory, Product};

/// 商品目录仓储
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 列出上架分类（按 sort_order 排序）
    pub async fn list_active_categories(&self) -> Result<Vec<CatalogCategory>> {
        let categories = sqlx::query_as::<_, CatalogCategory>(
            r#"
            SELECT id, name, sort_order, is_active, created_at, updated_at
            FROM catalog_categories
            WHERE is_active = true
            ORDER BY sort_order ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// 列出分类下的上架商品
    pub async fn list_active_products(&self, category_id: i64) -> Result<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, category_id, title, description, price_points, stock,
                   is_active, created_at, updated_at
            FROM products
            WHERE category_id = $1 AND is_active = true
            ORDER BY id ASC
            "#,
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// 获取商品
    pub async fn get_product(&self, id: i64) -> Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, category_id, title, description, price_points, stock,
                   is_active, created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    // ==================== 事务操作 ====================

    /// 在事务中获取商品（带行级锁）
    pub async fn get_product_for_update(
        tx: &mut PgConnection,
        id: i64,
    ) -> Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, category_id, title, description, price_points, stock,
                   is_active, created_at, updated_at
            FROM products
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(tx)
        .await?;

        Ok(product)
    }

    /// 在事务中条件扣减库存
    ///
    /// 仅当库存不限量或足够时扣减；返回是否扣减成功。
    /// 与促销码兑换相同的原子条件更新模式
    pub async fn decrement_stock_in_tx(
        tx: &mut PgConnection,
        product_id: i64,
        quantity: i32,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = CASE WHEN stock IS NULL THEN NULL ELSE stock - $2 END,
                updated_at = NOW()
            WHERE id = $1 AND (stock IS NULL OR stock >= $2)
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .execute(tx)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 在事务中恢复库存（订单取消时）
    ///
    /// 不限量商品（stock IS NULL）无需恢复
    pub async fn restore_stock_in_tx(
        tx: &mut PgConnection,
        product_id: i64,
        quantity: i32,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE products
            SET stock = stock + $2, updated_at = NOW()
            WHERE id = $1 AND stock IS NOT NULL
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .execute(tx)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl CatalogRepositoryTrait for CatalogRepository {
    async fn list_active_categories(&self) -> Result<Vec<CatalogCategory>> {
        self.list_active_categories().await
    }

    async fn list_active_products(&self, category_id: i64) -> Result<Vec<Product>> {
        self.list_active_products(category_id).await
    }

    async fn get_product(&self, id: i64) -> Result<Option<Product>> {
        self.get_product(id).await
    }
}
