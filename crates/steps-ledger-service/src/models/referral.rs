//! 邀请归因实体定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 邀请归因记录
///
/// 每个被邀请用户至多一条（user_id 唯一约束），注册后不可变更。
/// reward_points 累计该邀请为邀请人带来的分成总额
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Referral {
    pub id: i64,
    /// 被邀请用户 ID（users.id，唯一）
    pub user_id: i64,
    /// 邀请人 ID（users.id）
    pub inviter_id: i64,
    /// 来源标签（如 sticker、telegram_channel）
    #[sqlx(default)]
    pub referral_source: Option<String>,
    /// 邀请人通过该邀请累计获得的分成
    pub reward_points: i64,
    pub created_at: DateTime<Utc>,
}

/// 来源标签的俄语展示名
///
/// 运营后台和导出使用；未知标签原样展示，缺失展示为 "—"
pub fn source_label(source: Option<&str>) -> String {
    match source {
        None => "—".to_string(),
        Some(raw) => match raw {
            "referral" => "Реферал".to_string(),
            "telegram_channel" => "Телеграм канал".to_string(),
            "instagram" => "Инстаграм".to_string(),
            "vk" => "ВКонтакте".to_string(),
            "website" => "Сайт".to_string(),
            "friend" => "Друзья/знакомые".to_string(),
            "sticker" | "sticker_pets" => "Наклейки".to_string(),
            "insights" | "insights_kids" => "Инсайты".to_string(),
            "email" => "Email".to_string(),
            "tg_post" | "telegram_post" => "Пост в телеграм".to_string(),
            other => other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_label_known() {
        assert_eq!(source_label(Some("referral")), "Реферал");
        assert_eq!(source_label(Some("telegram_channel")), "Телеграм канал");
        assert_eq!(source_label(Some("instagram")), "Инстаграм");
        assert_eq!(source_label(Some("vk")), "ВКонтакте");
        assert_eq!(source_label(Some("website")), "Сайт");
        assert_eq!(source_label(Some("friend")), "Друзья/знакомые");
        assert_eq!(source_label(Some("email")), "Email");
    }

    #[test]
    fn test_source_label_aliases() {
        // 同义标签映射到同一展示名
        assert_eq!(source_label(Some("sticker")), "Наклейки");
        assert_eq!(source_label(Some("sticker_pets")), "Наклейки");
        assert_eq!(source_label(Some("insights")), "Инсайты");
        assert_eq!(source_label(Some("insights_kids")), "Инсайты");
        assert_eq!(source_label(Some("tg_post")), "Пост в телеграм");
        assert_eq!(source_label(Some("telegram_post")), "Пост в телеграм");
    }

    #[test]
    fn test_source_label_unknown_and_missing() {
        assert_eq!(source_label(Some("partner_2024")), "partner_2024");
        assert_eq!(source_label(None), "—");
    }

    #[test]
    fn test_referral_serialization() {
        let referral = Referral {
            id: 1,
            user_id: 10,
            inviter_id: 20,
            referral_source: Some("sticker".to_string()),
            reward_points: 150,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&referral).unwrap();
        assert_eq!(json["userId"], 10);
        assert_eq!(json["inviterId"], 20);
        assert_eq!(json["referralSource"], "sticker");
        assert_eq!(json["rewardPoints"], 150);
    }
}
