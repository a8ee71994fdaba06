//! 积分账本流水实体定义
//!
//! 账本只追加不修改，余额是流水金额之和的缓存

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use walk_reward_engine::WalkForm;

/// 账本条目标题（俄语，直接展示给用户和运营）
pub mod titles {
    /// 散步奖励
    pub const WALK_REWARD: &str = "Начисление за прогулку";
    /// 邀请人分成
    pub const REFERRAL_REWARD: &str = "Реферальное начисление";
    /// 下单扣分
    pub const ORDER_DEBIT: &str = "Списание за покупку";
    /// 取消订单退分
    pub const ORDER_REFUND: &str = "Возврат за отмену заказа";
}

/// 账本流水条目
///
/// 不可变记录，amount 带符号（正为入账，负为出账）。
/// 同一事务内每次追加都会把 amount 累加到 users.balance
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: i64,
    /// 用户 ID（users.id）
    pub user_id: i64,
    /// 变动金额（带符号）
    pub amount: i64,
    /// 条目标题（展示用分类标签）
    pub title: String,
    /// 散步形式（仅散步奖励条目有值）
    #[sqlx(default)]
    pub walk_form: Option<WalkForm>,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// 是否为入账条目
    pub fn is_credit(&self) -> bool {
        self.amount >= 0
    }

    /// 创建散步奖励条目
    pub fn walk_reward(user_id: i64, points: i64, walk_form: WalkForm) -> Self {
        Self {
            id: 0,
            user_id,
            amount: points,
            title: titles::WALK_REWARD.to_string(),
            walk_form: Some(walk_form),
            created_at: Utc::now(),
        }
    }

    /// 创建邀请人分成条目
    pub fn referral_reward(user_id: i64, points: i64) -> Self {
        Self {
            id: 0,
            user_id,
            amount: points,
            title: titles::REFERRAL_REWARD.to_string(),
            walk_form: None,
            created_at: Utc::now(),
        }
    }

    /// 创建下单扣分条目（金额记为负数）
    pub fn order_debit(user_id: i64, total_points: i64) -> Self {
        Self {
            id: 0,
            user_id,
            amount: -total_points,
            title: titles::ORDER_DEBIT.to_string(),
            walk_form: None,
            created_at: Utc::now(),
        }
    }

    /// 创建取消订单退分条目
    pub fn order_refund(user_id: i64, total_points: i64) -> Self {
        Self {
            id: 0,
            user_id,
            amount: total_points,
            title: titles::ORDER_REFUND.to_string(),
            walk_form: None,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_entry_builders() {
        let entry = LedgerEntry::walk_reward(1, 540, WalkForm::Dog);
        assert_eq!(entry.amount, 540);
        assert_eq!(entry.title, titles::WALK_REWARD);
        assert_eq!(entry.walk_form, Some(WalkForm::Dog));
        assert!(entry.is_credit());

        let entry = LedgerEntry::referral_reward(2, 54);
        assert_eq!(entry.amount, 54);
        assert_eq!(entry.title, titles::REFERRAL_REWARD);
        assert!(entry.walk_form.is_none());

        let entry = LedgerEntry::order_debit(1, 300);
        assert_eq!(entry.amount, -300);
        assert_eq!(entry.title, titles::ORDER_DEBIT);
        assert!(!entry.is_credit());

        let entry = LedgerEntry::order_refund(1, 300);
        assert_eq!(entry.amount, 300);
        assert_eq!(entry.title, titles::ORDER_REFUND);
        assert!(entry.is_credit());
    }

    #[test]
    fn test_ledger_entry_serialization() {
        let entry = LedgerEntry::walk_reward(1, 540, WalkForm::StrollerDog);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["userId"], 1);
        assert_eq!(json["amount"], 540);
        assert_eq!(json["title"], "Начисление за прогулку");
        assert_eq!(json["walkForm"], "STROLLER_DOG");
    }
}
