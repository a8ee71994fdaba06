//! 日志与追踪初始化模块
//!
//! 基于 tracing-subscriber 构建：环境过滤器 + 格式化输出层。
//! 输出格式由配置决定（json 结构化或 pretty 人类可读）。

use anyhow::Result;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::config::ObservabilityConfig;

/// 初始化 tracing（日志）
///
/// 过滤级别优先级：RUST_LOG 环境变量 > 配置文件 log_level > "info"。
/// 重复调用会返回错误（全局 subscriber 只能设置一次）。
pub fn init(service_name: &str, config: &ObservabilityConfig) -> Result<()> {
    // 构建环境过滤器
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // 构建日志层
    let fmt_layer = if config.log_format == "json" {
        fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_thread_ids(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    ::tracing::info!(
        service = %service_name,
        log_level = %config.log_level,
        log_format = %config.log_format,
        "Logging initialized"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_single_shot() {
        let config = ObservabilityConfig::default();
        // 第一次初始化可能成功，也可能因为其他测试已初始化而失败；
        // 第二次必定失败（全局 subscriber 已设置）
        let _ = init("test-service", &config);
        assert!(init("test-service", &config).is_err());
    }

    #[test]
    fn test_bad_level_falls_back() {
        // 非法的 log_level 不应该 panic，而是回退到 info
        let config = ObservabilityConfig {
            log_level: "definitely/not/a/filter!!".to_string(),
            log_format: "pretty".to_string(),
        };
        let _ = init("test-service", &config);
    }
}
