//! Access front-end benchmarks: the checked path against the native fast
//! paths for scoped and raw memory.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ioaccess_bench::utils::{bench_access, random_data, random_offsets, random_u64s};
use ioaccess_core::{BackendKind, ByteOrder, TextEncoding};

const MEMORY_KINDS: [BackendKind; 3] = [BackendKind::Heap, BackendKind::Scoped, BackendKind::Raw];

/// Benchmark sequential u64 writes filling the access.
fn bench_sequential_u64(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequential_u64");
    let size = 64 * 1024;
    let values = random_u64s(size / 8);
    group.throughput(Throughput::Bytes(size as u64));

    for kind in MEMORY_KINDS {
        group.bench_with_input(BenchmarkId::new("write", kind), &kind, |b, &kind| {
            let (mut access, _dir) = bench_access(kind, size);
            b.iter(|| {
                access.flip().unwrap();
                for &value in &values {
                    access.write_u64(black_box(value)).unwrap();
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("read", kind), &kind, |b, &kind| {
            let (mut access, _dir) = bench_access(kind, size);
            b.iter(|| {
                access.flip().unwrap();
                let mut sum = 0u64;
                for _ in 0..size / 8 {
                    sum = sum.wrapping_add(access.read_u64().unwrap());
                }
                black_box(sum);
            });
        });
    }

    group.finish();
}

/// Benchmark random indexed i32 gets, both byte orders.
fn bench_indexed_i32(c: &mut Criterion) {
    let mut group = c.benchmark_group("indexed_i32");
    let size = 16 * 1024;
    let offsets = random_offsets(1024, size, 4);
    group.throughput(Throughput::Elements(offsets.len() as u64));

    for kind in MEMORY_KINDS {
        for order in [ByteOrder::native(), ByteOrder::native().swapped()] {
            let id = format!("{kind}/{}", if order.is_native() { "native" } else { "swapped" });
            group.bench_function(BenchmarkId::from_parameter(id), |b| {
                let (mut access, _dir) = bench_access(kind, size);
                access.set_byte_order(order).unwrap();
                b.iter(|| {
                    let mut acc = 0i32;
                    for &offset in &offsets {
                        acc = acc.wrapping_add(access.get_i32(black_box(offset)).unwrap());
                    }
                    black_box(acc);
                });
            });
        }
    }

    group.finish();
}

/// Benchmark bulk copies between two accesses of the same kind.
fn bench_copy(c: &mut Criterion) {
    let mut group = c.benchmark_group("copy");

    for size in [256usize, 4096, 65536] {
        group.throughput(Throughput::Bytes(size as u64));
        for kind in MEMORY_KINDS {
            group.bench_with_input(BenchmarkId::new(kind.to_string(), size), &size, |b, &size| {
                let (mut source, _src_dir) = bench_access(kind, size);
                let (mut target, _dst_dir) = bench_access(kind, size);
                source.set_bytes(0, &random_data(size)).unwrap();

                b.iter(|| {
                    target.copy_from_at(&mut source, 0, 0, black_box(size)).unwrap();
                });
            });
        }
    }

    group.finish();
}

/// Benchmark length-prefixed string writes and reads.
fn bench_strings(c: &mut Criterion) {
    let mut group = c.benchmark_group("string_short");
    let text = "benchmark text ".repeat(16);

    for kind in MEMORY_KINDS {
        group.bench_with_input(BenchmarkId::from_parameter(kind), &kind, |b, &kind| {
            let (mut access, _dir) = bench_access(kind, 1024);
            b.iter(|| {
                access.flip().unwrap();
                access.write_string_short(black_box(&text), TextEncoding::Utf8).unwrap();
                access.flip().unwrap();
                black_box(access.read_string_short(TextEncoding::Utf8).unwrap());
            });
        });
    }

    group.finish();
}

/// Benchmark fill over the whole access.
fn bench_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill");
    let size = 64 * 1024;
    group.throughput(Throughput::Bytes(size as u64));

    for kind in [BackendKind::Heap, BackendKind::Scoped, BackendKind::Raw, BackendKind::File] {
        group.bench_with_input(BenchmarkId::from_parameter(kind), &kind, |b, &kind| {
            let (mut access, _dir) = bench_access(kind, size);
            b.iter(|| {
                if access.length().is_some() {
                    access.flip().unwrap();
                    access.fill(black_box(0xA5)).unwrap();
                } else {
                    access.set_bytes(0, &vec![0xA5; size]).unwrap();
                }
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_sequential_u64,
    bench_indexed_i32,
    bench_copy,
    bench_strings,
    bench_fill
);
criterion_main!(benches);
