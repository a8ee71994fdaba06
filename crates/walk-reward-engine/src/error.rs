//! 奖励引擎错误类型

use crate::models::WalkForm;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RewardError {
    #[error("缺少散步形式的基础系数: {0:?}")]
    MissingFormCoefficient(WalkForm),

    #[error("温度超出所有已配置区间: form={walk_form:?}, temperature={temperature_c}°C")]
    TemperatureOutOfRange {
        walk_form: WalkForm,
        temperature_c: f64,
    },

    #[error("步数非法: {0}")]
    InvalidSteps(i64),

    #[error("基础系数重复定义: {0:?}")]
    DuplicateFormCoefficient(WalkForm),

    #[error("系数必须为正数: form={walk_form:?}, value={value}")]
    NonPositiveCoefficient { walk_form: WalkForm, value: f64 },

    #[error("温度区间非法: form={walk_form:?}, [{min_temp_c}, {max_temp_c})")]
    InvalidBand {
        walk_form: WalkForm,
        min_temp_c: f64,
        max_temp_c: f64,
    },

    #[error(
        "温度区间重叠: form={walk_form:?}, [{first_min}, {first_max}) 与 [{second_min}, {second_max})"
    )]
    OverlappingBands {
        walk_form: WalkForm,
        first_min: f64,
        first_max: f64,
        second_min: f64,
        second_max: f64,
    },
}

pub type Result<T> = std::result::Result<T, RewardError>;

impl RewardError {
    /// 是否为系数表配置错误（区别于输入数据错误）
    ///
    /// 配置错误说明运营配置有缺口，应当报警而不是回落到默认值。
    pub fn is_configuration_gap(&self) -> bool {
        !matches!(self, Self::InvalidSteps(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_gap_classification() {
        assert!(RewardError::MissingFormCoefficient(WalkForm::Dog).is_configuration_gap());
        assert!(
            RewardError::TemperatureOutOfRange {
                walk_form: WalkForm::Stroller,
                temperature_c: 45.0,
            }
            .is_configuration_gap()
        );
        assert!(!RewardError::InvalidSteps(-5).is_configuration_gap());
    }

    #[test]
    fn test_error_display_contains_form() {
        let err = RewardError::TemperatureOutOfRange {
            walk_form: WalkForm::StrollerDog,
            temperature_c: -40.0,
        };
        let text = err.to_string();
        assert!(text.contains("StrollerDog"));
        assert!(text.contains("-40"));
    }
}
