//! 服务层
//!
//! 实现积分账本业务逻辑，协调仓储层与奖励引擎。
//!
//! ## 模块结构
//!
//! - `dto`: 数据传输对象定义
//! - `start_token`: /start 令牌解析
//! - `registration_service`: 注册与联系方式维护
//! - `referral_service`: 邀请归因
//! - `reward_service`: 散步奖励入账
//! - `promo_service`: 促销码兑换
//! - `order_service`: 下单与订单状态流转
//! - `query_service`: 只读聚合查询

pub mod dto;
pub mod order_service;
pub mod promo_service;
pub mod query_service;
pub mod referral_service;
pub mod registration_service;
pub mod reward_service;
pub mod start_token;

pub use dto::*;
pub use order_service::OrderService;
pub use promo_service::PromoService;
pub use query_service::{QueryService, summarize_purchases, summarize_walk_slots};
pub use referral_service::{AttributionOutcome, ReferralService};
pub use registration_service::RegistrationService;
pub use reward_service::{DEFAULT_MAX_STEPS_PER_WALK, RewardService};
pub use start_token::StartToken;
