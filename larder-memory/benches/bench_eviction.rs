// Copyright 2026 larder Project Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! micro benchmark for larder in-memory cache operations

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use larder_memory::{Cache, CacheBuilder, IndexedHeap};
use rand::{rngs::SmallRng, Rng, SeedableRng};

const CAPACITY: usize = 10_000;
const KEYS: usize = 100_000;

fn keys(range: u64) -> Vec<u64> {
    let mut rng = SmallRng::seed_from_u64(114514);
    (0..KEYS).map(|_| rng.random_range(0..range)).collect()
}

fn cache(percentage: usize) -> Cache<u64, ()> {
    CacheBuilder::new(CAPACITY)
        .with_eviction_percentage(percentage)
        .build()
        .unwrap()
}

/*
cargo bench --bench bench_eviction
*/
fn bench_insert(c: &mut Criterion) {
    let keys = keys(CAPACITY as u64 * 4);

    let mut group = c.benchmark_group("insert");
    for percentage in [1, 30, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(percentage), &percentage, |b, &percentage| {
            let cache = cache(percentage);
            let mut i = 0;
            b.iter(|| {
                let key = keys[i % keys.len()];
                i += 1;
                black_box(cache.insert(key, ()).unwrap());
            })
        });
    }
    group.finish();
}

fn bench_get(c: &mut Criterion) {
    let keys = keys(CAPACITY as u64 * 2);
    let cache = cache(30);
    for key in keys.iter().take(CAPACITY) {
        cache.insert(*key, ()).unwrap();
    }

    c.bench_function("get", |b| {
        let mut i = 0;
        b.iter(|| {
            let key = keys[i % keys.len()];
            i += 1;
            black_box(cache.get(&key).unwrap());
        })
    });
}

fn bench_heap(c: &mut Criterion) {
    let keys = keys(u64::MAX);

    c.bench_function("heap push pop", |b| {
        b.iter(|| {
            let mut heap = IndexedHeap::with_capacity(CAPACITY);
            for (stamp, key) in keys.iter().take(CAPACITY).enumerate() {
                heap.push(*key, stamp);
            }
            while let Some(item) = heap.pop() {
                black_box(item);
            }
        })
    });
}

criterion_group!(benches, bench_insert, bench_get, bench_heap);
criterion_main!(benches);
