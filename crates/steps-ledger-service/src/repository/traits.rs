//! 仓储 Trait 定义
//!
//! 定义仓储接口，便于服务层依赖抽象而非具体实现，支持 mock 测试

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    BotSetting, CatalogCategory, Family, LedgerEntry, Order, OrderItem, Product, PromoCode,
    PromoGroup, Referral, User,
};

/// 用户仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn get_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>>;
    async fn create(&self, user: &User) -> Result<i64>;
    async fn update_username<'a>(&self, id: i64, username: Option<&'a str>) -> Result<()>;
    async fn update_contact<'a, 'b>(
        &self,
        id: i64,
        phone: Option<&'a str>,
        email: Option<&'b str>,
    ) -> Result<()>;
    async fn set_active(&self, id: i64, is_active: bool) -> Result<()>;
}

/// 家庭仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FamilyRepositoryTrait: Send + Sync {
    async fn get(&self, id: i64) -> Result<Option<Family>>;
    async fn list_members(&self, family_id: i64) -> Result<Vec<User>>;
}

/// 账本仓储接口
///
/// 账本只追加：接口上没有任何修改或删除方法
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerRepositoryTrait: Send + Sync {
    async fn append(&self, entry: &LedgerEntry) -> Result<i64>;
    async fn list_by_user(&self, user_id: i64, limit: i64, offset: i64)
    -> Result<Vec<LedgerEntry>>;
    async fn count_by_user(&self, user_id: i64) -> Result<i64>;
    async fn sum_by_user(&self, user_id: i64) -> Result<i64>;
    async fn list_walk_entry_times(&self, user_id: i64)
    -> Result<Vec<chrono::DateTime<chrono::Utc>>>;
}

/// 邀请归因仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReferralRepositoryTrait: Send + Sync {
    async fn get_by_user(&self, user_id: i64) -> Result<Option<Referral>>;
    async fn list_by_inviter(&self, inviter_id: i64) -> Result<Vec<Referral>>;
    async fn count_by_inviter(&self, inviter_id: i64) -> Result<i64>;
}

/// 商品目录仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepositoryTrait: Send + Sync {
    async fn list_active_categories(&self) -> Result<Vec<CatalogCategory>>;
    async fn list_active_products(&self, category_id: i64) -> Result<Vec<Product>>;
    async fn get_product(&self, id: i64) -> Result<Option<Product>>;
}

/// 订单仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepositoryTrait: Send + Sync {
    async fn get_order(&self, id: i64) -> Result<Option<Order>>;
    async fn list_by_user(&self, user_id: i64, limit: i64) -> Result<Vec<Order>>;
    async fn list_items(&self, order_id: i64) -> Result<Vec<OrderItem>>;
}

/// 促销码仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PromoRepositoryTrait: Send + Sync {
    async fn get_by_code(&self, code: &str) -> Result<Option<PromoCode>>;
    async fn get_group(&self, id: i64) -> Result<Option<PromoGroup>>;
}

/// 设置仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsRepositoryTrait: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<BotSetting>>;
    async fn get_value(&self, key: &str) -> Result<Option<String>>;
    async fn list(&self) -> Result<Vec<BotSetting>>;
    async fn upsert(&self, key: &str, value: &str) -> Result<()>;
    async fn referral_reward_percent(&self) -> Result<i64>;
}
