//! Basic benchmarks for the `byte_arena` crate.
#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;

use byte_arena::ByteArena;
use criterion::{Criterion, criterion_group, criterion_main};

criterion_group!(benches, entrypoint);
criterion_main!(benches);

fn entrypoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("arena_basic");

    group.bench_function("allocate_release_one", |b| {
        let mut arena = ByteArena::default();

        b.iter(|| {
            let block = arena.allocate(black_box(100)).unwrap();

            // SAFETY: The handle came from this arena and is released once.
            unsafe {
                arena.release(block.cast::<u8>());
            }
        });
    });

    group.bench_function("allocate_release_eight_mixed", |b| {
        let mut arena = ByteArena::default();
        let sizes = [16_usize, 256, 64, 1024, 32, 512, 128, 8];

        b.iter(|| {
            let blocks = sizes.map(|size| arena.allocate(black_box(size)).unwrap());

            for block in blocks {
                // SAFETY: Each handle came from this arena, released once.
                unsafe {
                    arena.release(block.cast::<u8>());
                }
            }
        });
    });

    group.finish();
}
