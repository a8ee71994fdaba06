//! 积分账本服务（Bot 端）
//!
//! 提供注册、散步奖励、促销码、订单等 REST API。

use std::sync::Arc;

use axum::{Json, Router, routing::get};
use steps_ledger::{
    CoefficientRepository, routes, state::AppState, worker::CoefficientRefreshWorker,
};
use steps_shared::{config::AppConfig, database::Database, observability};
use tokio::net::TcpListener;
use tracing::{info, warn};
use walk_reward_engine::CoefficientStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 统一加载配置：从 config/{service_name}.toml 加载
    let config = AppConfig::load("steps-ledger-service").unwrap_or_default();

    observability::init(&config.service_name, &config.observability)?;

    info!("Starting steps-ledger-service on {}", config.server_addr());

    // 初始化基础设施
    let db = Database::connect(&config.database).await?;

    // 启动时加载系数表。加载失败不阻止服务启动：散步入账会在缺系数时
    // 报系统错误，后台 Worker 会在系数修复后跟进刷新
    let store = Arc::new(CoefficientStore::new());
    let coefficients = CoefficientRepository::new(db.pool().clone());
    match coefficients.load_table().await {
        Ok(table) => store.replace(&table),
        Err(e) => warn!(error = %e, "系数表加载失败，等待后台刷新"),
    }

    // 启动系数表刷新 Worker，跟进管理端的系数修改
    let refresh_pool = db.pool().clone();
    let refresh_store = store.clone();
    tokio::spawn(async move {
        let worker = CoefficientRefreshWorker::new(refresh_pool, refresh_store);
        worker.run().await;
    });

    let state = AppState::new(
        db.pool().clone(),
        store,
        config.reward.max_steps_per_walk,
    );

    let app = Router::new()
        .nest("/api/bot", routes::api_routes())
        .route("/health", get(health_check))
        .route(
            "/ready",
            get({
                let db_for_ready = db;
                move || readiness_check(db_for_ready.clone())
            }),
        )
        .with_state(state);

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    // 优雅关闭：收到 SIGTERM 或 Ctrl+C 时停止接收新连接，
    // 等待已有请求处理完毕
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");

    Ok(())
}

/// 监听关闭信号
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("注册 Ctrl+C 处理器失败");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("注册 SIGTERM 处理器失败")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}

/// 存活探针：服务进程正常即返回 ok
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "steps-ledger-service"
    }))
}

/// 就绪探针：检查数据库连接是否可用
async fn readiness_check(db: Database) -> Json<serde_json::Value> {
    let db_ok = db.health_check().await.is_ok();

    Json(serde_json::json!({
        "status": if db_ok { "ok" } else { "degraded" },
        "service": "steps-ledger-service",
        "checks": {
            "database": if db_ok { "ok" } else { "fail" }
        }
    }))
}
