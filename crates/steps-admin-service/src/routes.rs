//! 路由配置模块
//!
//! 定义所有 REST API 端点的路由映射

use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};

use crate::{handlers, state::AppState};

/// 构建用户管理路由
///
/// 包含列表、导出、详情、状态切换、账本流水和统计视图
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(handlers::user_view::list_users))
        .route("/users/export", get(handlers::export::export_users))
        .route("/users/{id}", get(handlers::user_view::get_user))
        .route(
            "/users/{id}/status",
            patch(handlers::user_view::update_user_status),
        )
        .route(
            "/users/{id}/ledger",
            get(handlers::user_view::get_user_ledger),
        )
        .route(
            "/users/{id}/stats",
            get(handlers::user_view::get_user_stats),
        )
}

/// 构建系数表管理路由
///
/// 基础系数整表替换，温度区间逐行维护
fn coefficient_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/coefficients/base",
            get(handlers::coefficient::list_base_coefficients),
        )
        .route(
            "/coefficients/base",
            put(handlers::coefficient::replace_base_coefficients),
        )
        .route(
            "/coefficients/temperature",
            get(handlers::coefficient::list_temperature_bands),
        )
        .route(
            "/coefficients/temperature",
            post(handlers::coefficient::create_temperature_band),
        )
        .route(
            "/coefficients/temperature/{id}",
            put(handlers::coefficient::update_temperature_band),
        )
        .route(
            "/coefficients/temperature/{id}",
            delete(handlers::coefficient::delete_temperature_band),
        )
}

/// 构建家庭管理路由
fn family_routes() -> Router<AppState> {
    Router::new()
        .route("/families", get(handlers::family::list_families))
        .route("/families", post(handlers::family::create_family))
        .route("/families/{id}", get(handlers::family::get_family))
        .route("/families/{id}", put(handlers::family::update_family))
        .route("/families/{id}", delete(handlers::family::delete_family))
        .route(
            "/families/{id}/members",
            get(handlers::family::list_family_members),
        )
}

/// 构建邀请归因路由
fn referral_routes() -> Router<AppState> {
    Router::new().route("/referrals", get(handlers::referral::list_referrals))
}

/// 构建商品目录管理路由
///
/// 包含分类与商品的 CRUD 操作路由
fn catalog_routes() -> Router<AppState> {
    Router::new()
        // 分类管理
        .route(
            "/catalog/categories",
            get(handlers::catalog::list_categories),
        )
        .route(
            "/catalog/categories",
            post(handlers::catalog::create_category),
        )
        .route(
            "/catalog/categories/{id}",
            put(handlers::catalog::update_category),
        )
        .route(
            "/catalog/categories/{id}",
            delete(handlers::catalog::delete_category),
        )
        // 商品管理
        .route("/catalog/products", get(handlers::catalog::list_products))
        .route("/catalog/products", post(handlers::catalog::create_product))
        .route(
            "/catalog/products/{id}",
            put(handlers::catalog::update_product),
        )
        .route(
            "/catalog/products/{id}",
            delete(handlers::catalog::delete_product),
        )
}

/// 构建订单管理路由
fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(handlers::order::list_orders))
        .route("/orders/{id}", get(handlers::order::get_order))
        .route(
            "/orders/{id}/status",
            post(handlers::order::update_order_status),
        )
}

/// 构建促销码管理路由
///
/// 包含促销组 CRUD、批量生成促销码和促销码状态管理
fn promo_routes() -> Router<AppState> {
    Router::new()
        .route("/promo/groups", get(handlers::promo::list_promo_groups))
        .route("/promo/groups", post(handlers::promo::create_promo_group))
        .route(
            "/promo/groups/{id}",
            put(handlers::promo::update_promo_group),
        )
        .route(
            "/promo/groups/{id}",
            delete(handlers::promo::delete_promo_group),
        )
        .route(
            "/promo/groups/{id}/codes",
            post(handlers::promo::generate_promo_codes),
        )
        .route(
            "/promo/groups/{id}/codes",
            get(handlers::promo::list_promo_codes),
        )
        .route(
            "/promo/codes/{id}/status",
            patch(handlers::promo::update_promo_code_status),
        )
}

/// 构建设置管理路由
fn settings_routes() -> Router<AppState> {
    Router::new()
        .route("/settings", get(handlers::settings::list_settings))
        .route("/settings/{key}", get(handlers::settings::get_setting))
        .route("/settings/{key}", put(handlers::settings::upsert_setting))
        .route(
            "/settings/{key}",
            delete(handlers::settings::delete_setting),
        )
}

/// 构建统计报表路由
fn stats_routes() -> Router<AppState> {
    Router::new().route("/stats/overview", get(handlers::stats::get_stats_overview))
}

/// 构建完整的 API 路由
///
/// 返回所有管理后台 API 路由（不含前缀，由调用方在 main.rs 中挂载）
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(user_routes())
        .merge(coefficient_routes())
        .merge(family_routes())
        .merge(referral_routes())
        .merge(catalog_routes())
        .merge(order_routes())
        .merge(promo_routes())
        .merge(settings_routes())
        .merge(stats_routes())
}
