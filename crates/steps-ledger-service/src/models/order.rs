//! 订单实体定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::OrderStatus;

/// 订单
///
/// 下单时即扣除积分（账本出账条目），取消时退回
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    /// 下单用户 ID（users.id）
    pub user_id: i64,
    pub status: OrderStatus,
    /// 实付积分总额（已扣除促销折扣）
    pub total_points: i64,
    /// 取货点 ID（外部系统编号，无外键）
    #[sqlx(default)]
    pub pvz_id: Option<i64>,
    #[sqlx(default)]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 订单明细行
///
/// title/price_points 是下单时的商品快照，后续改价不影响历史订单
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    /// 商品标题快照
    pub title: String,
    /// 单价快照
    pub price_points: i64,
    pub quantity: i32,
}

impl OrderItem {
    /// 行小计
    pub fn line_total(&self) -> i64 {
        self.price_points * self.quantity as i64
    }
}
