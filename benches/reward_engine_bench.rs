//! 奖励引擎性能基准测试
//!
//! 测试覆盖：
//! - 单次散步奖励计算性能
//! - 温度区间数量对查找的影响
//! - 内存系数存储的命中与错误路径
//! - 系数表构造校验性能
//! - 整表刷新性能
//! - 多线程并发读取性能

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use walk_reward_engine::{
    CoefficientStore, CoefficientTable, FormCoefficient, RewardCalculator, TemperatureBand,
    WalkForm, WalkMeasurement,
};

/// 构造每种形式含指定数量温度区间的系数行
///
/// 区间连续覆盖 [-40, 40)，相邻区间共享端点
fn make_parts(bands_per_form: usize) -> (Vec<FormCoefficient>, Vec<TemperatureBand>) {
    let base = vec![
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
    ];

    let width = 80.0 / bands_per_form as f64;
    let mut bands = Vec::with_capacity(bands_per_form * WalkForm::ALL.len());
    for form in WalkForm::ALL {
        for i in 0..bands_per_form {
            bands.push(TemperatureBand {
                walk_form: form,
                min_temp_c: -40.0 + width * i as f64,
                max_temp_c: -40.0 + width * (i + 1) as f64,
                coefficient: 1.0 + (i % 5) as f64 * 0.1,
            });
        }
    }

    (base, bands)
}

fn make_table(bands_per_form: usize) -> CoefficientTable {
    let (base, bands) = make_parts(bands_per_form);
    CoefficientTable::from_parts(base, bands).unwrap()
}

fn make_measurement(temperature_c: f64) -> WalkMeasurement {
    WalkMeasurement {
        walk_form: WalkForm::Dog,
        temperature_c,
        steps: 8500,
    }
}

// ============================================================================
// 基准测试函数
// ============================================================================

/// 单次奖励计算基准
fn bench_single_walk_compute(c: &mut Criterion) {
    let table = make_table(4);
    let measurement = make_measurement(10.0);

    c.bench_function("single_walk_compute", |b| {
        b.iter(|| {
            let result = RewardCalculator::compute(black_box(&table), black_box(&measurement));
            black_box(result)
        })
    });
}

/// 温度区间查找基准（不同区间数量）
///
/// 区间按下界排序后线性扫描，取最高在区间内的温度作为最坏情况
fn bench_band_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("band_scan");

    for bands_per_form in [2usize, 5, 10, 25, 50].iter() {
        let table = make_table(*bands_per_form);
        let measurement = make_measurement(39.9);

        group.throughput(Throughput::Elements(*bands_per_form as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(bands_per_form),
            bands_per_form,
            |b, _| {
                b.iter(|| {
                    let result =
                        RewardCalculator::compute(black_box(&table), black_box(&measurement));
                    black_box(result)
                })
            },
        );
    }

    group.finish();
}

/// 内存系数存储计算基准
fn bench_store_compute(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_compute");

    let store = CoefficientStore::new();
    store.replace(&make_table(4));

    // 命中路径
    let hit = make_measurement(10.0);
    group.bench_function("hit", |b| {
        b.iter(|| {
            let result = store.compute(black_box(&hit));
            black_box(result)
        })
    });

    // 温度不在任何区间（错误路径）
    let out_of_range = make_measurement(55.0);
    group.bench_function("out_of_range", |b| {
        b.iter(|| {
            let result = store.compute(black_box(&out_of_range));
            black_box(result)
        })
    });

    // 未配置形式（空存储错误路径）
    let empty = CoefficientStore::new();
    group.bench_function("missing_form", |b| {
        b.iter(|| {
            let result = empty.compute(black_box(&hit));
            black_box(result)
        })
    });

    group.finish();
}

/// 系数表构造校验基准（不同区间数量）
///
/// 区间重叠检查随区间数量平方增长，覆盖管理后台整表替换时的校验成本
fn bench_table_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_validation");

    for bands_per_form in [5usize, 10, 25, 50].iter() {
        let (base, bands) = make_parts(*bands_per_form);

        group.throughput(Throughput::Elements(bands.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(bands_per_form),
            bands_per_form,
            |b, _| {
                b.iter(|| {
                    let result = CoefficientTable::from_parts(
                        black_box(base.clone()),
                        black_box(bands.clone()),
                    );
                    black_box(result)
                })
            },
        );
    }

    group.finish();
}

/// 整表刷新基准
fn bench_store_replace(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_replace");

    for bands_per_form in [5usize, 25, 50].iter() {
        let table = make_table(*bands_per_form);
        let store = CoefficientStore::new();

        group.throughput(Throughput::Elements(table.band_count() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(bands_per_form),
            bands_per_form,
            |b, _| {
                b.iter(|| {
                    store.replace(black_box(&table));
                })
            },
        );
    }

    group.finish();
}

/// 并发读基准
///
/// 多线程同时从存储计算，验证读路径在并发下不退化
fn bench_concurrent_store_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_store_reads");

    let store = CoefficientStore::new();
    store.replace(&make_table(4));

    for threads in [2usize, 4, 8].iter() {
        let reads_per_thread = 250usize;

        group.throughput(Throughput::Elements((threads * reads_per_thread) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(threads), threads, |b, &n| {
            b.iter(|| {
                std::thread::scope(|scope| {
                    for _ in 0..n {
                        let store = &store;
                        scope.spawn(move || {
                            let measurement = make_measurement(10.0);
                            for _ in 0..reads_per_thread {
                                let result = store.compute(black_box(&measurement));
                                black_box(result).ok();
                            }
                        });
                    }
                });
            })
        });
    }

    group.finish();
}

/// 百分比分成基准（邀请奖励路径）
fn bench_percent_share(c: &mut Criterion) {
    c.bench_function("percent_share", |b| {
        b.iter(|| {
            let share = RewardCalculator::percent_share(black_box(12345), black_box(10));
            black_box(share)
        })
    });
}

// 配置 criterion
criterion_group!(
    benches,
    bench_single_walk_compute,
    bench_band_scan,
    bench_store_compute,
    bench_table_validation,
    bench_store_replace,
    bench_concurrent_store_reads,
    bench_percent_share,
);

criterion_main!(benches);
