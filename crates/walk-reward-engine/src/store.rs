//! 系数表内存存储
//!
//! 使用 DashMap 提供线程安全的系数缓存。服务启动时从数据库加载一次，
//! 管理后台每次修改系数后写库成功再整表刷新，计算路径因此不查库。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{info, instrument};

use crate::calculator::{RewardBreakdown, RewardCalculator, WalkMeasurement};
use crate::error::{Result, RewardError};
use crate::models::{CoefficientTable, FormCoefficient, FormCoefficients, WalkForm};

/// 系数存储
#[derive(Clone)]
pub struct CoefficientStore {
    /// 按散步形式缓存的系数
    entries: Arc<DashMap<WalkForm, FormCoefficients>>,
    /// 最近一次整表刷新时间
    loaded_at: Arc<parking_lot::RwLock<Option<DateTime<Utc>>>>,
}

impl CoefficientStore {
    /// 创建空存储
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            loaded_at: Arc::new(parking_lot::RwLock::new(None)),
        }
    }

    /// 已配置的散步形式数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 检查存储是否为空（尚未加载）
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 整表替换
    ///
    /// 传入的表已在构造时校验，此处仅做原子替换：
    /// 先写入新条目，再移除表中已不存在的形式。
    #[instrument(skip(self, table), fields(forms = table.form_count(), bands = table.band_count()))]
    pub fn replace(&self, table: &CoefficientTable) {
        for (form, entry) in table.iter() {
            self.entries.insert(*form, entry.clone());
        }
        self.entries.retain(|form, _| table.entry(*form).is_some());

        *self.loaded_at.write() = Some(Utc::now());

        info!(
            "系数表已刷新: {} 种形式, {} 个温度区间",
            table.form_count(),
            table.band_count()
        );
    }

    /// 获取指定形式的系数
    pub fn get(&self, walk_form: WalkForm) -> Option<FormCoefficients> {
        self.entries.get(&walk_form).map(|e| e.clone())
    }

    /// 基于缓存的系数计算一次散步奖励
    ///
    /// 错误语义与 `RewardCalculator::compute` 一致
    pub fn compute(&self, measurement: &WalkMeasurement) -> Result<RewardBreakdown> {
        if measurement.steps < 0 {
            return Err(RewardError::InvalidSteps(measurement.steps));
        }

        let entry = self
            .entries
            .get(&measurement.walk_form)
            .ok_or(RewardError::MissingFormCoefficient(measurement.walk_form))?;

        let temperature = entry
            .temperature_coefficient(measurement.temperature_c)
            .ok_or(RewardError::TemperatureOutOfRange {
                walk_form: measurement.walk_form,
                temperature_c: measurement.temperature_c,
            })?;

        Ok(RewardCalculator::compute_with(
            entry.base,
            temperature,
            measurement,
        ))
    }

    /// 重建系数表快照（用于管理后台展示）
    pub fn snapshot(&self) -> Result<CoefficientTable> {
        let mut base = Vec::with_capacity(self.entries.len());
        let mut bands = Vec::new();

        for item in self.entries.iter() {
            base.push(FormCoefficient {
                walk_form: *item.key(),
                coefficient: item.value().base,
            });
            bands.extend(item.value().bands.iter().copied());
        }

        CoefficientTable::from_parts(base, bands)
    }

    /// 获取存储统计信息
    pub fn stats(&self) -> CoefficientStoreStats {
        let forms_count = self.entries.len();
        let bands_count: usize = self.entries.iter().map(|e| e.bands.len()).sum();

        CoefficientStoreStats {
            forms_count,
            bands_count,
            avg_bands_per_form: if forms_count > 0 {
                bands_count as f64 / forms_count as f64
            } else {
                0.0
            },
            loaded_at: *self.loaded_at.read(),
        }
    }
}

impl Default for CoefficientStore {
    fn default() -> Self {
        Self::new()
    }
}

/// 系数存储统计信息
#[derive(Debug, Clone)]
pub struct CoefficientStoreStats {
    /// 已配置的散步形式数量
    pub forms_count: usize,
    /// 温度区间总数
    pub bands_count: usize,
    /// 平均每种形式的区间数
    pub avg_bands_per_form: f64,
    /// 最近一次刷新时间
    pub loaded_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TemperatureBand;

    fn sample_table() -> CoefficientTable {
        CoefficientTable::from_parts(
            vec![
                FormCoefficient {
                    walk_form: WalkForm::Stroller,
                    coefficient: 1.0,
                },
                FormCoefficient {
                    walk_form: WalkForm::Dog,
                    coefficient: 1.2,
                },
            ],
            vec![
                TemperatureBand {
                    walk_form: WalkForm::Stroller,
                    min_temp_c: -20.0,
                    max_temp_c: 30.0,
                    coefficient: 1.0,
                },
                TemperatureBand {
                    walk_form: WalkForm::Dog,
                    min_temp_c: -20.0,
                    max_temp_c: 30.0,
                    coefficient: 1.1,
                },
            ],
        )
        .unwrap()
    }

    fn measurement(form: WalkForm, temp: f64, steps: i64) -> WalkMeasurement {
        WalkMeasurement {
            walk_form: form,
            temperature_c: temp,
            steps,
        }
    }

    #[test]
    fn test_empty_store_is_loud() {
        let store = CoefficientStore::new();
        assert!(store.is_empty());
        assert_eq!(
            store.compute(&measurement(WalkForm::Dog, 10.0, 100)),
            Err(RewardError::MissingFormCoefficient(WalkForm::Dog))
        );
    }

    #[test]
    fn test_replace_and_compute() {
        let store = CoefficientStore::new();
        store.replace(&sample_table());

        assert_eq!(store.len(), 2);
        let result = store.compute(&measurement(WalkForm::Dog, 10.0, 1000)).unwrap();
        // 1.2 × 1.1 × 1000 = 1320
        assert_eq!(result.points, 1320);
    }

    #[test]
    fn test_replace_removes_stale_forms() {
        let store = CoefficientStore::new();
        store.replace(&sample_table());
        assert!(store.get(WalkForm::Dog).is_some());

        let narrowed = CoefficientTable::from_parts(
            vec![FormCoefficient {
                walk_form: WalkForm::Stroller,
                coefficient: 1.0,
            }],
            vec![TemperatureBand {
                walk_form: WalkForm::Stroller,
                min_temp_c: -20.0,
                max_temp_c: 30.0,
                coefficient: 1.0,
            }],
        )
        .unwrap();
        store.replace(&narrowed);

        assert_eq!(store.len(), 1);
        assert!(store.get(WalkForm::Dog).is_none());
    }

    #[test]
    fn test_snapshot_round_trip() {
        let store = CoefficientStore::new();
        let table = sample_table();
        store.replace(&table);

        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.form_count(), table.form_count());
        assert_eq!(snapshot.band_count(), table.band_count());
        assert_eq!(
            snapshot.lookup(WalkForm::Dog, 0.0).unwrap(),
            table.lookup(WalkForm::Dog, 0.0).unwrap()
        );
    }

    #[test]
    fn test_stats() {
        let store = CoefficientStore::new();
        assert!(store.stats().loaded_at.is_none());

        store.replace(&sample_table());
        let stats = store.stats();

        assert_eq!(stats.forms_count, 2);
        assert_eq!(stats.bands_count, 2);
        assert_eq!(stats.avg_bands_per_form, 1.0);
        assert!(stats.loaded_at.is_some());
    }

    #[test]
    fn test_concurrent_access() {
        use std::thread;

        let store = CoefficientStore::new();
        store.replace(&sample_table());
        let store_clone = store.clone();

        let handle = thread::spawn(move || {
            for _ in 0..100 {
                store_clone.replace(&sample_table());
            }
        });

        for _ in 0..100 {
            let result = store.compute(&measurement(WalkForm::Dog, 10.0, 100));
            assert!(result.is_ok());
        }

        handle.join().unwrap();
        assert_eq!(store.len(), 2);
    }
}
