//! Benchmarks for this crate's [`SkipList`].

use criterion::{AxisScale, BenchmarkId, Criterion, PlotConfiguration, black_box};
use circular_skiplist::SkipList;
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Benchmarking sizes.
const SIZES: [usize; 6] = [1, 10, 100, 1000, 10_000, 100_000];

/// Build a list of `size` random keys sized for its capacity.
fn random_list(rng: &mut StdRng, size: usize) -> SkipList {
    let mut sl = SkipList::with_capacity(size, 0x1234_abcd).expect("levels are non-zero");
    sl.try_extend(std::iter::repeat_with(|| rng.random()).take(size))
        .expect("allocation failed");
    sl
}

/// Benchmarking insertion.
#[inline]
pub fn insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("SkipList Insert");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES {
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            let mut rng = StdRng::seed_from_u64(0x1234_abcd);
            let mut sl = random_list(&mut rng, size);

            b.iter(|| {
                black_box(sl.insert(rng.random()).is_ok());
            });
        });
    }
}

/// Benchmarking search.
#[inline]
pub fn search(c: &mut Criterion) {
    let mut group = c.benchmark_group("SkipList Search");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES {
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            let mut rng = StdRng::seed_from_u64(0x1234_abcd);
            let sl = random_list(&mut rng, size);
            let keys: Vec<i64> = std::iter::repeat_with(|| rng.random()).take(10).collect();

            b.iter(|| {
                for &key in &keys {
                    black_box(sl.search(key));
                }
            });
        });
    }
}

/// Benchmarking ranked access.
#[inline]
pub fn rand_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("SkipList Random Access");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES {
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            let mut rng = StdRng::seed_from_u64(0x1234_abcd);
            let sl = random_list(&mut rng, size);
            let ranks: Vec<_> = std::iter::repeat_with(|| rng.random_range(0..sl.len()))
                .take(10)
                .collect();

            b.iter(|| {
                for &rank in &ranks {
                    black_box(sl.get(rank));
                }
            });
        });
    }
}

/// Benchmarking iteration.
#[inline]
pub fn iter(c: &mut Criterion) {
    c.bench_function("SkipList Iter", |b| {
        let mut rng = StdRng::seed_from_u64(0x1234_abcd);
        let sl = random_list(&mut rng, 100_000);

        b.iter(|| {
            for key in &sl {
                black_box(key);
            }
        });
    });
}

/// Run every benchmark in this module.
pub fn benchmark(c: &mut Criterion) {
    insert(c);
    search(c);
    rand_access(c);
    iter(c);
}
