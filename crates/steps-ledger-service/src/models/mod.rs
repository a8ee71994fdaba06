//! 积分服务领域模型
//!
//! 包含积分系统的所有核心实体定义

pub mod catalog;
pub mod enums;
pub mod ledger;
pub mod order;
pub mod promo;
pub mod referral;
pub mod settings;
pub mod user;

// 重新导出常用类型
pub use catalog::{CatalogCategory, Product};
pub use enums::{OrderStatus, UserRole};
pub use ledger::{LedgerEntry, titles};
pub use order::{Order, OrderItem};
pub use promo::{PromoCode, PromoGroup};
pub use referral::{Referral, source_label};
pub use settings::{BotSetting, keys as setting_keys};
pub use user::{Family, User};

// 散步形式由奖励引擎定义，作为领域模型的一部分重导出
pub use walk_reward_engine::WalkForm;
