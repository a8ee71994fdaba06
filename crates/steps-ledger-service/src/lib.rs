//! 积分账本服务（Bot 端）
//!
//! 散步积分系统的核心服务：注册与邀请归因、散步奖励入账、
//! 积分账本、促销码兑换、商品目录与订单。
//!
//! ## 核心功能
//!
//! - **注册与归因**：/start 注册、邀请令牌解析、落地来源记录
//! - **散步奖励**：按散步形式与气温系数计算积分并写入账本
//! - **积分账本**：追加式流水，余额与家庭聚合同步更新
//! - **促销码**：原子兑换，余量耗尽即失败
//! - **商品订单**：下单扣积分、取消退积分、库存控制
//!
//! ## 模块结构
//!
//! - `models`: 领域实体模型
//! - `repository`: 数据访问层，跨仓储事务通过 *_in_tx 传递连接
//! - `service`: 业务服务层
//! - `error`: 错误类型定义
//! - `handlers`: HTTP 请求处理器
//! - `routes`: 路由配置
//! - `state`: 应用状态
//! - `worker`: 系数表后台刷新
//!
//! ## 技术栈
//!
//! - Web 框架：Axum
//! - 数据访问：sqlx (PostgreSQL)
//! - 数据验证：validator
//! - 序列化：serde (camelCase)

pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;
pub mod worker;

// 重新导出核心类型
pub use error::{LedgerError, Result};
pub use models::{
    BotSetting, CatalogCategory, Family, LedgerEntry, Order, OrderItem, OrderStatus, Product,
    PromoCode, PromoGroup, Referral, User, UserRole, WalkForm, setting_keys, source_label, titles,
};
pub use repository::{
    CatalogRepository, CoefficientRepository, FamilyRepository, LedgerRepository, OrderRepository,
    PromoRepository, ReferralRepository, SettingsRepository, TemperatureCoefficientRow,
    UserRepository, WalkFormCoefficientRow,
};
pub use service::{
    ApiResponse, OrderService, PageResponse, PromoService, QueryService, RegistrationService,
    RewardService, summarize_purchases, summarize_walk_slots,
};
pub use state::AppState;
