//! 路由配置模块
//!
//! 定义 Bot 端 API 端点的路由映射

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::{handlers, state::AppState};

/// 构建注册相关的路由
fn start_routes() -> Router<AppState> {
    Router::new().route("/start", post(handlers::start::start))
}

/// 构建散步奖励路由
fn walk_routes() -> Router<AppState> {
    Router::new().route("/walks", post(handlers::walk::credit_walk))
}

/// 构建促销码路由
fn promo_routes() -> Router<AppState> {
    Router::new().route("/promo/redeem", post(handlers::promo::redeem))
}

/// 构建订单路由
fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(handlers::order::place_order))
        .route("/orders", get(handlers::order::list_orders))
        .route(
            "/orders/{order_id}/cancel",
            post(handlers::order::cancel_order),
        )
}

/// 构建用户档案路由
fn profile_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/profile/{telegram_id}",
            get(handlers::profile::get_profile),
        )
        .route(
            "/profile/{telegram_id}/contact",
            patch(handlers::profile::update_contact),
        )
}

/// 构建商品目录路由
fn catalog_routes() -> Router<AppState> {
    Router::new().route("/catalog", get(handlers::catalog::get_catalog))
}

/// 构建完整的 Bot API 路由
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(start_routes())
        .merge(walk_routes())
        .merge(promo_routes())
        .merge(order_routes())
        .merge(profile_routes())
        .merge(catalog_routes())
}
