//! 积分服务枚举类型定义
//!
//! 所有枚举都支持数据库（sqlx）和 JSON（serde）序列化

use serde::{Deserialize, Serialize};

/// 用户角色
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// 普通用户 - 通过机器人注册的参与者
    #[default]
    User,
    /// 管理员 - 可访问运营后台
    Admin,
}

/// 订单状态
///
/// 订单生命周期：NEW -> PROCESSING -> COMPLETED，
/// NEW/PROCESSING 可转入 CANCELLED（取消时退回积分并恢复库存）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// 新建 - 已下单并扣除积分，等待处理
    #[default]
    New,
    /// 处理中 - 运营已接单
    Processing,
    /// 已完成 - 商品已交付
    Completed,
    /// 已取消 - 积分已退回，库存已恢复
    Cancelled,
}

impl OrderStatus {
    /// 检查是否允许转换到目标状态
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (Self::New, Self::Processing)
                | (Self::New, Self::Cancelled)
                | (Self::Processing, Self::Completed)
                | (Self::Processing, Self::Cancelled)
        )
    }

    /// 是否为终态（不再允许任何转换）
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}
