//! 商品目录实体定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 商品分类
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CatalogCategory {
    pub id: i64,
    pub name: String,
    /// 展示排序（升序）
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 商品
///
/// stock 为 NULL 表示不限量
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub category_id: i64,
    pub title: String,
    #[sqlx(default)]
    pub description: Option<String>,
    /// 积分价格
    pub price_points: i64,
    /// 库存（NULL = 不限量）
    #[sqlx(default)]
    pub stock: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// 检查库存是否足以支撑指定数量
    pub fn has_stock(&self, quantity: i32) -> bool {
        match self.stock {
            None => true,
            Some(stock) => stock >= quantity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_product(stock: Option<i32>) -> Product {
        Product {
            id: 1,
            category_id: 1,
            title: "Поводок".to_string(),
            description: None,
            price_points: 500,
            stock,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_product_has_stock() {
        // 不限量
        let product = create_test_product(None);
        assert!(product.has_stock(1_000_000));

        // 限量且充足
        let product = create_test_product(Some(10));
        assert!(product.has_stock(10));

        // 限量且不足
        assert!(!product.has_stock(11));

        // 零库存
        let product = create_test_product(Some(0));
        assert!(!product.has_stock(1));
    }

    #[test]
    fn test_product_serialization() {
        let product = create_test_product(Some(5));
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["categoryId"], 1);
        assert_eq!(json["pricePoints"], 500);
        assert_eq!(json["stock"], 5);
        assert_eq!(json["isActive"], true);
    }
}
