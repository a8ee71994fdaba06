//! 奖励计算器
//!
//! 计算公式：points = round(基础系数 × 温度系数 × 步数)。
//! 取整规则固定为"四舍五入到最近整数"（远离零方向），
//! 该规则是对外契约的一部分，积分百分比分成也使用同一规则。

use crate::error::{Result, RewardError};
use crate::models::{CoefficientTable, WalkForm};

/// 固定取整规则：四舍五入到最近整数（0.5 向远离零方向进位）
///
/// 奖励计算中所有乘积均为非负数，因此等价于"逢 0.5 进一"。
pub fn round_half_up(raw: f64) -> i64 {
    raw.round() as i64
}

/// 一次散步的输入数据
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkMeasurement {
    pub walk_form: WalkForm,
    pub temperature_c: f64,
    pub steps: i64,
}

/// 奖励计算明细
///
/// 除最终积分外保留参与计算的系数，便于日志排查和管理后台展示
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardBreakdown {
    pub walk_form: WalkForm,
    pub base_coefficient: f64,
    pub temperature_coefficient: f64,
    pub steps: i64,
    pub points: i64,
}

/// 奖励计算器
pub struct RewardCalculator;

impl RewardCalculator {
    /// 计算一次散步的奖励积分
    ///
    /// # Errors
    ///
    /// - 步数为负 → `InvalidSteps`
    /// - 散步形式缺少基础系数 → `MissingFormCoefficient`
    /// - 温度不落在任何已配置区间 → `TemperatureOutOfRange`
    pub fn compute(table: &CoefficientTable, measurement: &WalkMeasurement) -> Result<RewardBreakdown> {
        if measurement.steps < 0 {
            return Err(RewardError::InvalidSteps(measurement.steps));
        }

        let (base, temperature) = table.lookup(measurement.walk_form, measurement.temperature_c)?;

        Ok(Self::compute_with(base, temperature, measurement))
    }

    /// 按百分比分成（用于邀请人奖励），使用同一取整规则
    pub fn percent_share(points: i64, percent: i64) -> i64 {
        if points <= 0 || percent <= 0 {
            return 0;
        }
        round_half_up(points as f64 * percent as f64 / 100.0)
    }

    /// 已取得系数后的纯计算部分
    pub(crate) fn compute_with(
        base: f64,
        temperature: f64,
        measurement: &WalkMeasurement,
    ) -> RewardBreakdown {
        let raw = base * temperature * measurement.steps as f64;

        RewardBreakdown {
            walk_form: measurement.walk_form,
            base_coefficient: base,
            temperature_coefficient: temperature,
            steps: measurement.steps,
            points: round_half_up(raw),
        }
    }
}
