//! 应用状态定义
//!
//! 包含 Axum 路由共享的应用状态

use sqlx::PgPool;
use std::sync::Arc;

use steps_ledger::{CoefficientRepository, OrderService, QueryService};
use walk_reward_engine::CoefficientStore;

/// Axum 应用共享状态
///
/// 管理端复用账本服务的订单流转和聚合查询；
/// 系数仓储与内存快照用于系数表的写入校验和写后刷新
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL 连接池
    pub pool: PgPool,
    /// 系数表内存快照
    pub store: Arc<CoefficientStore>,
    /// 系数仓储
    pub coefficients: Arc<CoefficientRepository>,
    /// 订单服务（状态流转带退款语义）
    pub orders: Arc<OrderService>,
    /// 只读聚合查询服务
    pub queries: Arc<QueryService>,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(pool: PgPool, store: Arc<CoefficientStore>) -> Self {
        let coefficients = Arc::new(CoefficientRepository::new(pool.clone()));
        let orders = Arc::new(OrderService::new(pool.clone()));
        let queries = Arc::new(QueryService::new(pool.clone()));

        Self {
            pool,
            store,
            coefficients,
            orders,
            queries,
        }
    }
}
