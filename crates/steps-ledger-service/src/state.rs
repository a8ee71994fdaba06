//! 应用状态定义
//!
//! 包含 Axum 路由共享的应用状态

use sqlx::PgPool;
use std::sync::Arc;

use walk_reward_engine::CoefficientStore;

use crate::repository::UserRepository;
use crate::service::{
    OrderService, PromoService, QueryService, RegistrationService, RewardService,
};

/// Axum 应用共享状态
///
/// 服务实例在启动时构造一次，通过 Arc 在 handler 间共享
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL 连接池
    pub pool: PgPool,
    /// 内存系数表快照，管理端更新后整表替换
    pub store: Arc<CoefficientStore>,
    pub registration: Arc<RegistrationService>,
    pub rewards: Arc<RewardService<UserRepository>>,
    pub promos: Arc<PromoService>,
    pub orders: Arc<OrderService>,
    pub queries: Arc<QueryService>,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(pool: PgPool, store: Arc<CoefficientStore>, max_steps_per_walk: i64) -> Self {
        let user_repo = Arc::new(UserRepository::new(pool.clone()));
        let rewards = RewardService::new(user_repo, store.clone(), pool.clone())
            .with_max_steps(max_steps_per_walk);

        Self {
            registration: Arc::new(RegistrationService::new(pool.clone())),
            rewards: Arc::new(rewards),
            promos: Arc::new(PromoService::new(pool.clone())),
            orders: Arc::new(OrderService::new(pool.clone())),
            queries: Arc::new(QueryService::new(pool.clone())),
            store,
            pool,
        }
    }
}
