//! Criterion micro-benchmarks for ghost exchange.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use halo_field::{Execution, ExchangePlan};
use halo_test_utils::{layout, periodic_square, random_field};

/// Benchmark: build the exchange plan for a 256x256 grid in 16 tiles.
fn bench_plan_build_256(c: &mut Criterion) {
    let domain = periodic_square(256);
    let layout = layout(&domain, 64, 4);

    c.bench_function("plan_build_256_16tiles", |b| {
        b.iter(|| {
            let plan = ExchangePlan::build(&layout, &domain, 1).unwrap();
            black_box(plan.copies().len());
        });
    });
}

/// Benchmark: execute one exchange, serial and parallel.
fn bench_exchange_256(c: &mut Criterion) {
    let domain = periodic_square(256);
    let layout = layout(&domain, 64, 4);
    let plan = ExchangePlan::build(&layout, &domain, 1).unwrap();
    let mut field = random_field(layout, 1, 1, 42);

    for (name, exec) in [
        ("exchange_256_serial", Execution::Serial),
        ("exchange_256_parallel", Execution::Parallel),
    ] {
        c.bench_function(name, |b| {
            b.iter(|| {
                plan.execute(&mut field, exec).unwrap();
                black_box(&field);
            });
        });
    }
}

/// Benchmark: exchange with many small tiles, where copy count dominates.
fn bench_exchange_small_tiles(c: &mut Criterion) {
    let domain = periodic_square(128);
    let layout = layout(&domain, 8, 4);
    let plan = ExchangePlan::build(&layout, &domain, 2).unwrap();
    let mut field = random_field(layout, 1, 2, 7);

    c.bench_function("exchange_128_256tiles_ghost2", |b| {
        b.iter(|| {
            plan.execute(&mut field, Execution::Parallel).unwrap();
            black_box(&field);
        });
    });
}

criterion_group!(
    benches,
    bench_plan_build_256,
    bench_exchange_256,
    bench_exchange_small_tiles
);
criterion_main!(benches);
