//! 用户与家庭实体定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use walk_reward_engine::WalkForm;

use super::enums::UserRole;

/// 用户
///
/// 通过机器人 /start 注册，telegram_id 全局唯一。
/// balance 是账本流水的缓存汇总，与流水在同一事务内更新
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    /// Telegram 用户 ID（唯一）
    pub telegram_id: i64,
    #[sqlx(default)]
    pub username: Option<String>,
    #[sqlx(default)]
    pub phone: Option<String>,
    #[sqlx(default)]
    pub email: Option<String>,
    /// 积分余额（账本汇总的缓存）
    pub balance: i64,
    /// 累计步数
    pub step_count: i64,
    /// 婴儿车散步次数
    pub walk_count_stroller: i32,
    /// 遛狗散步次数
    pub walk_count_dog: i32,
    /// 婴儿车+狗散步次数
    pub walk_count_stroller_dog: i32,
    /// 落地来源标签（首次 /start 时写入，之后不覆盖）
    #[sqlx(default)]
    pub landing_source: Option<String>,
    /// 所属家庭（可选）
    #[sqlx(default)]
    pub family_id: Option<i64>,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// 总散步次数（三种形式之和）
    pub fn total_walk_count(&self) -> i32 {
        self.walk_count_stroller + self.walk_count_dog + self.walk_count_stroller_dog
    }

    /// 指定散步形式的次数
    pub fn walk_count_for(&self, form: WalkForm) -> i32 {
        match form {
            WalkForm::Stroller => self.walk_count_stroller,
            WalkForm::Dog => self.walk_count_dog,
            WalkForm::StrollerDog => self.walk_count_stroller_dog,
        }
    }
}

/// 家庭
///
/// 多个用户可共属一个家庭，balance/step_count 为成员聚合值，
/// 与成员账本写入在同一事务内维护
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Family {
    pub id: i64,
    pub name: String,
    /// 成员积分聚合
    pub balance: i64,
    /// 成员步数聚合
    pub step_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_user() -> User {
        User {
            id: 1,
            telegram_id: 123456789,
            username: Some("walker".to_string()),
            phone: None,
            email: None,
            balance: 1500,
            step_count: 24000,
            walk_count_stroller: 3,
            walk_count_dog: 5,
            walk_count_stroller_dog: 1,
            landing_source: None,
            family_id: None,
            role: UserRole::User,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_total_walk_count() {
        let user = create_test_user();
        assert_eq!(user.total_walk_count(), 9);
    }

    #[test]
    fn test_walk_count_for_form() {
        let user = create_test_user();
        assert_eq!(user.walk_count_for(WalkForm::Stroller), 3);
        assert_eq!(user.walk_count_for(WalkForm::Dog), 5);
        assert_eq!(user.walk_count_for(WalkForm::StrollerDog), 1);
    }

    #[test]
    fn test_user_serialization_camel_case() {
        let user = create_test_user();
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["telegramId"], 123456789);
        assert_eq!(json["stepCount"], 24000);
        assert_eq!(json["walkCountStrollerDog"], 1);
        assert_eq!(json["role"], "USER");
        assert_eq!(json["isActive"], true);
    }
}
