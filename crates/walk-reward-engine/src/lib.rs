//! 散步奖励计算引擎
//!
//! 提供独立于存储的奖励计算能力，支持：
//! - 按散步形式查找基础系数
//! - 按散步形式 + 温度区间查找温度系数
//! - 系数表完整性校验（每种形式恰好一行基础系数、温度区间不重叠）
//! - 固定的取整规则（四舍五入到最近整数）
//! - 线程安全的内存系数表（由管理后台在写库后刷新）

pub mod calculator;
pub mod error;
pub mod models;
pub mod store;

pub use calculator::{RewardBreakdown, RewardCalculator, WalkMeasurement, round_half_up};
pub use error::{Result, RewardError};
pub use models::{CoefficientTable, FormCoefficient, FormCoefficients, TemperatureBand, WalkForm};
pub use store::{CoefficientStore, CoefficientStoreStats};
