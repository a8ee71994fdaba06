//! 统一可观测性模块
//!
//! 提供日志与 tracing 的统一初始化。所有服务通过单一入口点配置日志，
//! 确保一致的格式与过滤规则。

pub mod tracing;

pub use tracing::init;
