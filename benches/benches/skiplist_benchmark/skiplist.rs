use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rankskip::SkipList;

const SIZES: [usize; 3] = [1_000, 10_000, 50_000];

fn make_sample_values(
    n: usize,
    seed: u64,
) -> Vec<i64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(0..(n as i64) * 2)).collect()
}

fn filled(
    n: usize,
    seed: u64,
) -> SkipList<i64> {
    let mut sl = SkipList::with_seed(seed);
    sl.extend(make_sample_values(n, seed));
    sl
}

fn bench_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("skiplist_add");
    for &n in &SIZES {
        let values = make_sample_values(n, 42);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &values, |b, values| {
            b.iter(|| {
                // Каждый прогон новый список
                let mut sl = SkipList::with_seed(42);
                for v in values {
                    sl.add(*v);
                }
                black_box(sl);
            })
        });
    }
    group.finish();
}

fn bench_index_of_hit_miss(c: &mut Criterion) {
    let mut group = c.benchmark_group("skiplist_index_of");
    for &n in &SIZES {
        let sl = filled(n, 123);

        // значения вне диапазона 0..2n гарантированно отсутствуют
        let hits: Vec<i64> = sl.iter().step_by(n / 1000).copied().collect();
        let misses: Vec<i64> = (0..1000).map(|i| -(i as i64) - 1).collect();

        group.bench_with_input(BenchmarkId::new("hit", n), &n, |b, &_n| {
            b.iter(|| {
                for v in &hits {
                    let _ = black_box(sl.index_of(v));
                }
            })
        });

        group.bench_with_input(BenchmarkId::new("miss", n), &n, |b, &_n| {
            b.iter(|| {
                for v in &misses {
                    let _ = black_box(sl.index_of(v));
                }
            })
        });
    }
    group.finish();
}

fn bench_get_by_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("skiplist_get");
    for &n in &SIZES {
        let sl = filled(n, 7);
        let mut rng = StdRng::seed_from_u64(7);
        let ranks: Vec<isize> = (0..1000).map(|_| rng.gen_range(0..n) as isize).collect();

        group.bench_with_input(BenchmarkId::from_parameter(n), &ranks, |b, ranks| {
            b.iter(|| {
                for &r in ranks {
                    let _ = black_box(sl.get(r));
                }
            })
        });
    }
    group.finish();
}

fn bench_delete_at(c: &mut Criterion) {
    let mut group = c.benchmark_group("skiplist_delete_at");
    for &n in &SIZES {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter_batched(
                || (filled(n, 777), StdRng::seed_from_u64(777)),
                |(mut sl, mut rng)| {
                    // удаляем всё со случайных позиций
                    while !sl.is_empty() {
                        let rank = rng.gen_range(0..sl.len()) as isize;
                        let _ = black_box(sl.delete_at(rank));
                    }
                },
                criterion::BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_preen(c: &mut Criterion) {
    let mut group = c.benchmark_group("skiplist_preen");
    for &n in &SIZES {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter_batched(
                || filled(n, 2026),
                |mut sl| {
                    sl.preen();
                    black_box(sl);
                },
                criterion::BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_iterate(c: &mut Criterion) {
    let mut group = c.benchmark_group("skiplist_iterate");
    for &n in &SIZES {
        let sl = filled(n, 2026);

        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &_n| {
            b.iter(|| {
                for v in sl.iter() {
                    black_box(v);
                }
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_add,
    bench_index_of_hit_miss,
    bench_get_by_rank,
    bench_delete_at,
    bench_preen,
    bench_iterate
);
criterion_main!(benches);
