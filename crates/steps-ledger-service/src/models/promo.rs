//! 促销码实体定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 促销码分组
///
/// 折扣百分比定义在分组上，组内所有码共享
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PromoGroup {
    pub id: i64,
    pub name: String,
    /// 折扣百分比（0-100）
    pub discount_percent: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 促销码
///
/// used_count 只增不减，约束 used_count <= max_uses 在并发下也必须成立
/// （兑换通过条件 UPDATE 原子递增保证）
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PromoCode {
    pub id: i64,
    pub group_id: i64,
    /// 码值（唯一）
    pub code: String,
    pub max_uses: i32,
    pub used_count: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PromoCode {
    /// 剩余可用次数
    pub fn remaining_uses(&self) -> i32 {
        (self.max_uses - self.used_count).max(0)
    }

    /// 是否仍可兑换（快照判断，实际兑换以原子 UPDATE 为准）
    pub fn is_redeemable(&self) -> bool {
        self.is_active && self.used_count < self.max_uses
    }
}
