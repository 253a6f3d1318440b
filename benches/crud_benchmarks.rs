use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rubra_tree::RBTreeMap;
use std::collections::BTreeMap;

const N: usize = 10_000;

// ─── Helper functions to generate key sequences ─────────────────────────────

fn ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

fn reverse_ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).rev().collect()
}

fn random_keys(n: usize) -> Vec<i64> {
    // Use a simple LCG for deterministic pseudo-random sequence
    let mut keys = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        keys.push((x >> 33) as i64);
    }
    keys
}

// ─── Insert Benchmarks ──────────────────────────────────────────────────────

fn bench_map_insert_ordered(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_insert_ordered");

    group.bench_function(BenchmarkId::new("RBTreeMap", N), |b| {
        b.iter(|| {
            let mut map = RBTreeMap::new();
            for i in 0..N as i64 {
                map.insert(i, i);
            }
            map
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut map = BTreeMap::new();
            for i in 0..N as i64 {
                map.insert(i, i);
            }
            map
        });
    });

    group.finish();
}

fn bench_map_insert_reverse(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_insert_reverse");

    group.bench_function(BenchmarkId::new("RBTreeMap", N), |b| {
        b.iter(|| {
            let mut map = RBTreeMap::new();
            for i in (0..N as i64).rev() {
                map.insert(i, i);
            }
            map
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut map = BTreeMap::new();
            for i in (0..N as i64).rev() {
                map.insert(i, i);
            }
            map
        });
    });

    group.finish();
}

fn bench_map_insert_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let mut group = c.benchmark_group("map_insert_random");

    group.bench_function(BenchmarkId::new("RBTreeMap", N), |b| {
        b.iter(|| {
            let mut map = RBTreeMap::new();
            for &k in &keys {
                map.insert(k, k);
            }
            map
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut map = BTreeMap::new();
            for &k in &keys {
                map.insert(k, k);
            }
            map
        });
    });

    group.finish();
}

// ─── Lookup Benchmarks ──────────────────────────────────────────────────────

fn bench_map_get_ordered(c: &mut Criterion) {
    let keys = ordered_keys(N);
    let rb_map: RBTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    let bt_map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();

    let mut group = c.benchmark_group("map_get_ordered");

    group.bench_function(BenchmarkId::new("RBTreeMap", N), |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for &k in &keys {
                if let Some(&v) = rb_map.get(&k) {
                    sum = sum.wrapping_add(v);
                }
            }
            sum
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for &k in &keys {
                if let Some(&v) = bt_map.get(&k) {
                    sum = sum.wrapping_add(v);
                }
            }
            sum
        });
    });

    group.finish();
}

fn bench_map_get_reverse(c: &mut Criterion) {
    let keys = ordered_keys(N);
    let rb_map: RBTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    let bt_map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    let reverse_keys = reverse_ordered_keys(N);

    let mut group = c.benchmark_group("map_get_reverse");

    group.bench_function(BenchmarkId::new("RBTreeMap", N), |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for &k in &reverse_keys {
                if let Some(&v) = rb_map.get(&k) {
                    sum = sum.wrapping_add(v);
                }
            }
            sum
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for &k in &reverse_keys {
                if let Some(&v) = bt_map.get(&k) {
                    sum = sum.wrapping_add(v);
                }
            }
            sum
        });
    });

    group.finish();
}

fn bench_map_get_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let rb_map: RBTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    let bt_map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();

    let mut group = c.benchmark_group("map_get_random");

    group.bench_function(BenchmarkId::new("RBTreeMap", N), |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for &k in &keys {
                if let Some(&v) = rb_map.get(&k) {
                    sum = sum.wrapping_add(v);
                }
            }
            sum
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for &k in &keys {
                if let Some(&v) = bt_map.get(&k) {
                    sum = sum.wrapping_add(v);
                }
            }
            sum
        });
    });

    group.finish();
}

// ─── Remove Benchmarks ──────────────────────────────────────────────────────

fn bench_map_remove_ordered(c: &mut Criterion) {
    let keys = ordered_keys(N);

    let mut group = c.benchmark_group("map_remove_ordered");

    group.bench_function(BenchmarkId::new("RBTreeMap", N), |b| {
        b.iter_batched(
            || keys.iter().map(|&k| (k, k)).collect::<RBTreeMap<i64, i64>>(),
            |mut map| {
                for &k in &keys {
                    map.remove(&k);
                }
                map
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter_batched(
            || keys.iter().map(|&k| (k, k)).collect::<BTreeMap<i64, i64>>(),
            |mut map| {
                for &k in &keys {
                    map.remove(&k);
                }
                map
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn bench_map_remove_reverse(c: &mut Criterion) {
    let keys = ordered_keys(N);
    let reverse_keys = reverse_ordered_keys(N);

    let mut group = c.benchmark_group("map_remove_reverse");

    group.bench_function(BenchmarkId::new("RBTreeMap", N), |b| {
        b.iter_batched(
            || keys.iter().map(|&k| (k, k)).collect::<RBTreeMap<i64, i64>>(),
            |mut map| {
                for &k in &reverse_keys {
                    map.remove(&k);
                }
                map
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter_batched(
            || keys.iter().map(|&k| (k, k)).collect::<BTreeMap<i64, i64>>(),
            |mut map| {
                for &k in &reverse_keys {
                    map.remove(&k);
                }
                map
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn bench_map_remove_random(c: &mut Criterion) {
    let keys = random_keys(N);

    let mut group = c.benchmark_group("map_remove_random");

    group.bench_function(BenchmarkId::new("RBTreeMap", N), |b| {
        b.iter_batched(
            || keys.iter().map(|&k| (k, k)).collect::<RBTreeMap<i64, i64>>(),
            |mut map| {
                for &k in &keys {
                    map.remove(&k);
                }
                map
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter_batched(
            || keys.iter().map(|&k| (k, k)).collect::<BTreeMap<i64, i64>>(),
            |mut map| {
                for &k in &keys {
                    map.remove(&k);
                }
                map
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

// ─── Iteration Benchmarks ───────────────────────────────────────────────────

fn bench_map_iterate(c: &mut Criterion) {
    let keys = random_keys(N);
    let rb_map: RBTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    let bt_map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();

    let mut group = c.benchmark_group("map_iterate");

    group.bench_function(BenchmarkId::new("RBTreeMap", N), |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for (&k, &v) in rb_map.iter() {
                sum = sum.wrapping_add(k).wrapping_add(v);
            }
            sum
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for (&k, &v) in bt_map.iter() {
                sum = sum.wrapping_add(k).wrapping_add(v);
            }
            sum
        });
    });

    group.finish();
}

// ─── Criterion Groups ───────────────────────────────────────────────────────

criterion_group!(map_insert_benches, bench_map_insert_ordered, bench_map_insert_reverse, bench_map_insert_random,);

criterion_group!(map_get_benches, bench_map_get_ordered, bench_map_get_reverse, bench_map_get_random,);

criterion_group!(map_remove_benches, bench_map_remove_ordered, bench_map_remove_reverse, bench_map_remove_random,);

criterion_group!(map_iterate_benches, bench_map_iterate,);

criterion_main!(map_insert_benches, map_get_benches, map_remove_benches, map_iterate_benches,);
