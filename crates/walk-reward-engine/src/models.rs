//! 奖励引擎模型定义
//!
//! 散步形式枚举与系数表结构，系数表在构造时完成完整性校验。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RewardError};

/// 散步形式
///
/// 决定基础系数与温度系数的查找维度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WalkForm {
    /// 推婴儿车散步
    Stroller,
    /// 遛狗散步
    Dog,
    /// 推婴儿车同时遛狗
    StrollerDog,
}

impl WalkForm {
    /// 所有散步形式（用于完整性检查和统计遍历）
    pub const ALL: [WalkForm; 3] = [WalkForm::Stroller, WalkForm::Dog, WalkForm::StrollerDog];
}

/// 单个散步形式的基础系数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormCoefficient {
    pub walk_form: WalkForm,
    pub coefficient: f64,
}

/// 温度区间系数
///
/// 区间为半开区间 [min_temp_c, max_temp_c)，相邻区间共享端点不算重叠
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureBand {
    pub walk_form: WalkForm,
    pub min_temp_c: f64,
    pub max_temp_c: f64,
    pub coefficient: f64,
}

impl TemperatureBand {
    /// 温度是否落在本区间内
    pub fn covers(&self, temperature_c: f64) -> bool {
        self.min_temp_c <= temperature_c && temperature_c < self.max_temp_c
    }

    /// 两个区间是否重叠（半开区间比较）
    pub fn overlaps(&self, other: &TemperatureBand) -> bool {
        self.min_temp_c < other.max_temp_c && other.min_temp_c < self.max_temp_c
    }
}

/// 单个散步形式的全部系数（基础系数 + 温度区间）
#[derive(Debug, Clone, PartialEq)]
pub struct FormCoefficients {
    pub base: f64,
    pub bands: Vec<TemperatureBand>,
}

impl FormCoefficients {
    /// 查找覆盖指定温度的区间系数
    pub fn temperature_coefficient(&self, temperature_c: f64) -> Option<f64> {
        self.bands
            .iter()
            .find(|band| band.covers(temperature_c))
            .map(|band| band.coefficient)
    }
}

/// 已校验的系数表
///
/// 通过 `from_parts` 构造，保证：
/// - 每种散步形式最多一行基础系数，且系数为正
/// - 温度区间 min < max、系数为正、同一形式的区间互不重叠
/// - 每个温度区间的形式都有对应的基础系数
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoefficientTable {
    entries: HashMap<WalkForm, FormCoefficients>,
}

impl CoefficientTable {
    /// 从基础系数行和温度区间行构造并校验系数表
    pub fn from_parts(base: Vec<FormCoefficient>, bands: Vec<TemperatureBand>) -> Result<Self> {
        let mut entries: HashMap<WalkForm, FormCoefficients> = HashMap::new();

        for row in base {
            if row.coefficient <= 0.0 || !row.coefficient.is_finite() {
                return Err(RewardError::NonPositiveCoefficient {
                    walk_form: row.walk_form,
                    value: row.coefficient,
                });
            }
            if entries.contains_key(&row.walk_form) {
                return Err(RewardError::DuplicateFormCoefficient(row.walk_form));
            }
            entries.insert(
                row.walk_form,
                FormCoefficients {
                    base: row.coefficient,
                    bands: Vec::new(),
                },
            );
        }

        for band in &bands {
            if band.min_temp_c >= band.max_temp_c
                || !band.min_temp_c.is_finite()
                || !band.max_temp_c.is_finite()
            {
                return Err(RewardError::InvalidBand {
                    walk_form: band.walk_form,
                    min_temp_c: band.min_temp_c,
                    max_temp_c: band.max_temp_c,
                });
            }
            if band.coefficient <= 0.0 || !band.coefficient.is_finite() {
                return Err(RewardError::NonPositiveCoefficient {
                    walk_form: band.walk_form,
                    value: band.coefficient,
                });
            }

            let entry = entries
                .get_mut(&band.walk_form)
                .ok_or(RewardError::MissingFormCoefficient(band.walk_form))?;

            for existing in &entry.bands {
                if existing.overlaps(band) {
                    return Err(RewardError::OverlappingBands {
                        walk_form: band.walk_form,
                        first_min: existing.min_temp_c,
                        first_max: existing.max_temp_c,
                        second_min: band.min_temp_c,
                        second_max: band.max_temp_c,
                    });
                }
            }
            entry.bands.push(*band);
        }

        // 按区间下界排序，便于展示和调试
        for entry in entries.values_mut() {
            entry
                .bands
                .sort_by(|a, b| a.min_temp_c.total_cmp(&b.min_temp_c));
        }

        Ok(Self { entries })
    }

    /// 获取指定形式的系数
    pub fn entry(&self, walk_form: WalkForm) -> Option<&FormCoefficients> {
        self.entries.get(&walk_form)
    }

    /// 查找 (基础系数, 温度系数)
    ///
    /// 缺少基础系数或温度不在任何区间内都返回配置缺口错误，从不回落默认值。
    pub fn lookup(&self, walk_form: WalkForm, temperature_c: f64) -> Result<(f64, f64)> {
        let entry = self
            .entries
            .get(&walk_form)
            .ok_or(RewardError::MissingFormCoefficient(walk_form))?;

        let temperature = entry.temperature_coefficient(temperature_c).ok_or(
            RewardError::TemperatureOutOfRange {
                walk_form,
                temperature_c,
            },
        )?;

        Ok((entry.base, temperature))
    }

    /// 已配置的散步形式数量
    pub fn form_count(&self) -> usize {
        self.entries.len()
    }

    /// 全部温度区间数量
    pub fn band_count(&self) -> usize {
        self.entries.values().map(|e| e.bands.len()).sum()
    }

    /// 遍历全部条目
    pub fn iter(&self) -> impl Iterator<Item = (&WalkForm, &FormCoefficients)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_rows() -> Vec<FormCoefficient> {
        vec![
            FormCoefficient {
                walk_form: WalkForm::Stroller,
                coefficient: 1.0,
            },
            FormCoefficient {
                walk_form: WalkForm::Dog,
                coefficient: 1.2,
            },
            FormCoefficient {
                walk_form: WalkForm::StrollerDog,
                coefficient: 1.5,
            },
        ]
    }

    fn band(form: WalkForm, min: f64, max: f64, k: f64) -> TemperatureBand {
        TemperatureBand {
            walk_form: form,
            min_temp_c: min,
            max_temp_c: max,
            coefficient: k,
        }
    }

    #[test]
    fn test_walk_form_serialization() {
        assert_eq!(
            serde_json::to_string(&WalkForm::StrollerDog).unwrap(),
            "\"STROLLER_DOG\""
        );
        assert_eq!(
            serde_json::from_str::<WalkForm>("\"DOG\"").unwrap(),
            WalkForm::Dog
        );
    }

    #[test]
    fn test_table_construction_and_lookup() {
        let table = CoefficientTable::from_parts(
            base_rows(),
            vec![
                band(WalkForm::Dog, -10.0, 0.0, 1.3),
                band(WalkForm::Dog, 0.0, 25.0, 1.0),
            ],
        )
        .unwrap();

        assert_eq!(table.form_count(), 3);
        assert_eq!(table.band_count(), 2);
        assert_eq!(table.lookup(WalkForm::Dog, -5.0).unwrap(), (1.2, 1.3));
        // 共享端点属于右侧区间
        assert_eq!(table.lookup(WalkForm::Dog, 0.0).unwrap(), (1.2, 1.0));
    }

    #[test]
    fn test_lookup_missing_form_is_loud() {
        let table = CoefficientTable::from_parts(
            vec![FormCoefficient {
                walk_form: WalkForm::Dog,
                coefficient: 1.2,
            }],
            vec![band(WalkForm::Dog, -10.0, 30.0, 1.0)],
        )
        .unwrap();

        assert_eq!(
            table.lookup(WalkForm::Stroller, 10.0),
            Err(RewardError::MissingFormCoefficient(WalkForm::Stroller))
        );
    }

    #[test]
    fn test_lookup_out_of_band_is_loud() {
        let table = CoefficientTable::from_parts(
            base_rows(),
            vec![band(WalkForm::Dog, -10.0, 30.0, 1.0)],
        )
        .unwrap();

        assert_eq!(
            table.lookup(WalkForm::Dog, 30.0),
            Err(RewardError::TemperatureOutOfRange {
                walk_form: WalkForm::Dog,
                temperature_c: 30.0,
            })
        );
        // 区间之外温度过低同样报错
        assert!(table.lookup(WalkForm::Dog, -10.1).is_err());
    }

    #[test]
    fn test_duplicate_base_rejected() {
        let mut rows = base_rows();
        rows.push(FormCoefficient {
            walk_form: WalkForm::Dog,
            coefficient: 2.0,
        });

        assert_eq!(
            CoefficientTable::from_parts(rows, vec![]).unwrap_err(),
            RewardError::DuplicateFormCoefficient(WalkForm::Dog)
        );
    }

    #[test]
    fn test_overlapping_bands_rejected() {
        let result = CoefficientTable::from_parts(
            base_rows(),
            vec![
                band(WalkForm::Dog, -10.0, 5.0, 1.3),
                band(WalkForm::Dog, 4.0, 25.0, 1.0),
            ],
        );

        assert!(matches!(
            result.unwrap_err(),
            RewardError::OverlappingBands { .. }
        ));
    }

    #[test]
    fn test_adjacent_bands_allowed() {
        let result = CoefficientTable::from_parts(
            base_rows(),
            vec![
                band(WalkForm::Dog, -10.0, 0.0, 1.3),
                band(WalkForm::Dog, 0.0, 25.0, 1.0),
            ],
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_same_range_different_forms_allowed() {
        let result = CoefficientTable::from_parts(
            base_rows(),
            vec![
                band(WalkForm::Dog, -10.0, 25.0, 1.3),
                band(WalkForm::Stroller, -10.0, 25.0, 1.1),
            ],
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_inverted_band_rejected() {
        let result =
            CoefficientTable::from_parts(base_rows(), vec![band(WalkForm::Dog, 5.0, 5.0, 1.0)]);
        assert!(matches!(
            result.unwrap_err(),
            RewardError::InvalidBand { .. }
        ));
    }

    #[test]
    fn test_non_positive_coefficient_rejected() {
        let result = CoefficientTable::from_parts(
            vec![FormCoefficient {
                walk_form: WalkForm::Dog,
                coefficient: 0.0,
            }],
            vec![],
        );
        assert!(matches!(
            result.unwrap_err(),
            RewardError::NonPositiveCoefficient { .. }
        ));
    }

    #[test]
    fn test_band_without_base_rejected() {
        let result = CoefficientTable::from_parts(
            vec![FormCoefficient {
                walk_form: WalkForm::Dog,
                coefficient: 1.2,
            }],
            vec![band(WalkForm::Stroller, 0.0, 10.0, 1.0)],
        );
        assert_eq!(
            result.unwrap_err(),
            RewardError::MissingFormCoefficient(WalkForm::Stroller)
        );
    }

    #[test]
    fn test_band_covers_half_open() {
        let b = band(WalkForm::Dog, 0.0, 10.0, 1.0);
        assert!(b.covers(0.0));
        assert!(b.covers(9.999));
        assert!(!b.covers(10.0));
        assert!(!b.covers(-0.001));
    }
}
