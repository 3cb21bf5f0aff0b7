//! Basic benchmarks for the `typed_buffer` crate.
#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use typed_buffer::TypedBuffer;

criterion_group!(benches, entrypoint);
criterion_main!(benches);

const CAPACITY: usize = 64 * 1024;

fn entrypoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer_basic");

    group.bench_function("put_u64", |b| {
        let mut buffer = TypedBuffer::with_capacity(CAPACITY).unwrap();

        b.iter(|| {
            if !buffer.is_enough(size_of::<u64>()) {
                buffer = TypedBuffer::with_capacity(CAPACITY).unwrap();
            }

            buffer.put(black_box(u64::MAX)).unwrap();
        });
    });

    group.bench_function("put_string_16", |b| {
        let payload = [0x55_u8; 16];
        let mut buffer = TypedBuffer::with_capacity(CAPACITY).unwrap();

        b.iter(|| {
            if !buffer.is_enough(payload.len() + size_of::<u64>()) {
                buffer = TypedBuffer::with_capacity(CAPACITY).unwrap();
            }

            buffer.put_string(black_box(&payload)).unwrap();
        });
    });

    group.bench_function("get_u64", |b| {
        let mut source = TypedBuffer::with_capacity(CAPACITY).unwrap();
        while source.is_enough(size_of::<u64>()) {
            source.put(0x0123_4567_89AB_CDEF_u64).unwrap();
        }

        let mut reader = TypedBuffer::from_bytes(source.written()).unwrap();

        b.iter(|| {
            if !reader.is_enough(size_of::<u64>()) {
                reader = TypedBuffer::from_bytes(source.written()).unwrap();
            }

            black_box(reader.get::<u64>().unwrap());
        });
    });

    group.finish();
}
