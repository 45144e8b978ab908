//! Criterion benchmarks for whole-model evaluations.

use cohort_bench::{reference_profile, stress_profile};
use cohort_core::RunMode;
use cohort_engine::Model;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_evaluate_reference(c: &mut Criterion) {
    let mut model = Model::new(reference_profile().unwrap()).unwrap();

    // Warm up: one evaluation so every buffer is allocated.
    model.evaluate(RunMode::Basic).unwrap();

    c.bench_function("evaluate_reference", |b| {
        b.iter(|| {
            let summary = model.evaluate(RunMode::Basic).unwrap();
            black_box(&summary);
        });
    });
}

fn bench_evaluate_stress(c: &mut Criterion) {
    let mut model = Model::new(stress_profile().unwrap()).unwrap();
    model.evaluate(RunMode::Basic).unwrap();

    c.bench_function("evaluate_stress", |b| {
        b.iter(|| {
            let summary = model.evaluate(RunMode::Basic).unwrap();
            black_box(&summary);
        });
    });
}

/// The loop an optimiser drives: set one parameter, then evaluate.
fn bench_estimation_step(c: &mut Criterion) {
    let mut model = Model::new(reference_profile().unwrap()).unwrap();
    model.evaluate(RunMode::Estimation).unwrap();

    let mut r0 = 2.0e6;
    c.bench_function("estimation_step_reference", |b| {
        b.iter(|| {
            r0 *= 1.0001;
            model.set_addressable("process[recruitment].r0", r0).unwrap();
            let summary = model.evaluate(RunMode::Estimation).unwrap();
            black_box(summary.penalty_score);
        });
    });
}

fn bench_build_reference(c: &mut Criterion) {
    c.bench_function("build_reference", |b| {
        b.iter(|| {
            let model = Model::new(reference_profile().unwrap()).unwrap();
            black_box(&model);
        });
    });
}

criterion_group!(
    benches,
    bench_evaluate_reference,
    bench_evaluate_stress,
    bench_estimation_step,
    bench_build_reference
);
criterion_main!(benches);
