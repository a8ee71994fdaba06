//! 机器人设置实体定义
//!
//! 自由键值存储，供运营调整展示文案和数值参数

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 已知设置键
pub mod keys {
    /// 客服联系方式文案（展示给用户）
    pub const SUPPORT_CONTACT: &str = "поддержка";
    /// 邀请人分成百分比（整数，如 10 表示 10%）
    pub const REFERRAL_REWARD_PERCENT: &str = "referral_reward_percent";
}

/// 设置项
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BotSetting {
    pub id: i64,
    /// 设置键（唯一）
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}
