use criterion::{black_box, BatchSize, BenchmarkId, Criterion};
use criterion::{criterion_group, criterion_main};
use tempfile::tempdir;

use feedlog::FeedStore;

const POSTS_PER_ITER: u32 = 1_000;

fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("post_append");
    group.bench_function("monotonic", |b| {
        b.iter_batched(
            || {
                let dir = tempdir().expect("tempdir");
                let store = FeedStore::open(dir.path());
                store.create_feed(1);
                (dir, store)
            },
            |(_dir, store)| {
                for i in 0..POSTS_PER_ITER {
                    store.post(1, black_box(1_000 + i), i as f32).expect("post");
                }
            },
            BatchSize::LargeInput,
        );
    });
    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("post_update");
    for &records in &[1_000_u32, 100_000] {
        let dir = tempdir().expect("tempdir");
        let store = FeedStore::open(dir.path());
        store.create_feed(1);
        for i in 0..records {
            store.post(1, i * 10, i as f32).expect("seed");
        }
        group.bench_with_input(BenchmarkId::from_parameter(records), &records, |b, &records| {
            let mut i = 0u32;
            b.iter(|| {
                let time = (i % records) * 10;
                store.post(1, black_box(time), 1.0).expect("update");
                i = i.wrapping_add(7919);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_append, bench_update);
criterion_main!(benches);
