use criterion::{criterion_group, criterion_main, Criterion};

use lispmem::arena::Arena;
use lispmem::options::CoreOptions;

fn bench_fast_path(c: &mut Criterion) {
    let mut options = CoreOptions::default();
    options.default_reserve.set(1 << 24);
    options.initial_commit.set(1 << 24);
    let mut arena = Arena::new(&options);
    c.bench_function("arena_alloc_16b", |b| {
        b.iter(|| {
            let _addr = arena.alloc(16).unwrap();
        })
    });
}

fn bench_snapshot_rewind(c: &mut Criterion) {
    let mut options = CoreOptions::default();
    options.default_reserve.set(1 << 24);
    options.initial_commit.set(1 << 24);
    let mut arena = Arena::new(&options);
    c.bench_function("arena_snapshot_rewind", |b| {
        b.iter(|| {
            let mark = arena.snapshot();
            for _ in 0..16 {
                arena.alloc(32).unwrap();
            }
            arena.rewind(mark);
        })
    });
}

criterion_group!(benches, bench_fast_path, bench_snapshot_rewind);
criterion_main!(benches);
