use core::hint::black_box;

use chain_hash::HashMap as ChainHashMap;
use criterion::BatchSize;
use criterion::Criterion;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use hashbrown::HashMap as HashbrownHashMap;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

const N: usize = 10_000;

fn generate_keys(seed: u64, count: usize) -> Vec<u64> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..count).map(|_| rng.random::<u64>()).collect()
}

fn build_chain_map(keys: &[u64]) -> ChainHashMap<u64, u64> {
    let mut map = ChainHashMap::with_capacity(keys.len());
    for &k in keys {
        let _ = map.insert(k, k);
    }
    map
}

fn bench_insert(c: &mut Criterion) {
    let keys = generate_keys(0x5EED, N);

    let mut group = c.benchmark_group("insert_10k");
    group.throughput(Throughput::Elements(N as u64));

    group.bench_function("chain_hash", |b| {
        b.iter_batched(
            || keys.clone(),
            |keys| {
                let mut map = ChainHashMap::with_capacity(N);
                for k in keys {
                    let _ = map.insert(k, k);
                }
                black_box(map)
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("std", |b| {
        b.iter_batched(
            || keys.clone(),
            |keys| {
                let mut map = std::collections::HashMap::with_capacity(N);
                for k in keys {
                    map.insert(k, k);
                }
                black_box(map)
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("hashbrown", |b| {
        b.iter_batched(
            || keys.clone(),
            |keys| {
                let mut map = HashbrownHashMap::with_capacity(N);
                for k in keys {
                    map.insert(k, k);
                }
                black_box(map)
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let keys = generate_keys(0x5EED, N);
    let misses = generate_keys(0xD15, N);

    let chain_map = build_chain_map(&keys);
    let std_map: std::collections::HashMap<u64, u64> = keys.iter().map(|&k| (k, k)).collect();
    let brown_map: HashbrownHashMap<u64, u64> = keys.iter().map(|&k| (k, k)).collect();

    let mut group = c.benchmark_group("lookup_hit_10k");
    group.throughput(Throughput::Elements(N as u64));
    group.bench_function("chain_hash", |b| {
        b.iter(|| {
            for k in &keys {
                black_box(chain_map.get(k));
            }
        });
    });
    group.bench_function("std", |b| {
        b.iter(|| {
            for k in &keys {
                black_box(std_map.get(k));
            }
        });
    });
    group.bench_function("hashbrown", |b| {
        b.iter(|| {
            for k in &keys {
                black_box(brown_map.get(k));
            }
        });
    });
    group.finish();

    let mut group = c.benchmark_group("lookup_miss_10k");
    group.throughput(Throughput::Elements(N as u64));
    group.bench_function("chain_hash", |b| {
        b.iter(|| {
            for k in &misses {
                black_box(chain_map.get(k));
            }
        });
    });
    group.bench_function("std", |b| {
        b.iter(|| {
            for k in &misses {
                black_box(std_map.get(k));
            }
        });
    });
    group.bench_function("hashbrown", |b| {
        b.iter(|| {
            for k in &misses {
                black_box(brown_map.get(k));
            }
        });
    });
    group.finish();
}

fn bench_churn(c: &mut Criterion) {
    let keys = generate_keys(0x5EED, N);
    let replacements = generate_keys(0xF00D, N / 2);
    let chain_map = build_chain_map(&keys);

    let mut group = c.benchmark_group("churn_remove_reinsert_5k");
    group.throughput(Throughput::Elements((N / 2) as u64));

    // Removal vacates slots onto the free list; the reinserts that follow
    // should reuse them without growing the arena.
    group.bench_function("chain_hash", |b| {
        b.iter_batched(
            || chain_map.clone(),
            |mut map| {
                for k in &keys[..N / 2] {
                    black_box(map.remove(k));
                }
                for &k in &replacements {
                    let _ = map.insert(k, k);
                }
                black_box(map)
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_insert, bench_lookup, bench_churn);
criterion_main!(benches);
