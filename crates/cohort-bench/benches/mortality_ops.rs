//! Criterion micro-benchmarks for the instantaneous mortality solver.

use cohort_bench::catch_series;
use cohort_core::{AgeRange, Table};
use cohort_process::{Process, ProcessPenalty};
use cohort_processes::{LogisticSelectivity, MortalityInstantaneous};
use cohort_test_utils::{catches_table, FlatSelectivity, ProcessHarness};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const YEAR: u32 = 2000;

/// Harness with `categories` categories over ages 1–50, each holding
/// 1000 fish at every age.
fn harness(categories: &[String]) -> ProcessHarness {
    let ages = AgeRange::new(1, 50).unwrap();
    let mut h = ProcessHarness::new(YEAR, YEAR, ages);
    h.add_selectivity("one", FlatSelectivity(1.0));
    h.add_selectivity("logistic", LogisticSelectivity::new(6.0, 3.0).unwrap());
    h.add_penalty(ProcessPenalty::new("catch_penalty"));
    for category in categories {
        h.add_category(category, ages, None);
    }
    h
}

fn fill(h: &mut ProcessHarness, categories: &[String]) {
    for category in categories {
        h.set_numbers(category, &[1000.0; 50]);
    }
}

/// Mortality with `fisheries` fisheries each fishing every category.
fn mortality(categories: &[String], fisheries: usize) -> MortalityInstantaneous {
    let labels: Vec<String> = (0..fisheries).map(|i| format!("fishery_{i}")).collect();
    let label_refs: Vec<&str> = labels.iter().map(String::as_str).collect();
    let catches: Vec<f64> = (0..fisheries).map(|i| catch_series(i, YEAR)).collect();

    let mut method = Table::new(
        "method",
        ["method", "category", "selectivity", "time_step", "u_max", "penalty"],
    );
    for label in &labels {
        method.push_row([
            label.clone(),
            categories.join(","),
            vec!["logistic"; categories.len()].join(","),
            "step_one".to_string(),
            "0.7".to_string(),
            "catch_penalty".to_string(),
        ]);
    }

    MortalityInstantaneous::builder("mortality")
        .categories(categories.iter().cloned())
        .m([0.2])
        .relative_m_by_age(["one"])
        .catches(catches_table(&label_refs, &[(YEAR, &catches[..])]))
        .method(method)
        .build()
        .unwrap()
}

fn bench_execute(c: &mut Criterion, name: &str, n_categories: usize, fisheries: usize) {
    let categories: Vec<String> = (0..n_categories).map(|i| format!("stock_{i}")).collect();
    let mut h = harness(&categories);
    let mut process = mortality(&categories, fisheries);
    h.prepare(&mut process).unwrap();
    h.reset(&mut process).unwrap();

    c.bench_function(name, |b| {
        b.iter(|| {
            fill(&mut h, &categories);
            h.execute(&mut process, YEAR, 0).unwrap();
            black_box(h.numbers(&categories[0])[0]);
        });
    });
}

fn bench_mortality_1x1(c: &mut Criterion) {
    bench_execute(c, "mortality_1_category_1_fishery", 1, 1);
}

fn bench_mortality_4x10(c: &mut Criterion) {
    bench_execute(c, "mortality_4_categories_10_fisheries", 4, 10);
}

fn bench_mortality_reset(c: &mut Criterion) {
    let categories: Vec<String> = (0..4).map(|i| format!("stock_{i}")).collect();
    let mut h = harness(&categories);
    let mut process = mortality(&categories, 10);
    h.prepare(&mut process).unwrap();

    c.bench_function("mortality_reset_4x10", |b| {
        b.iter(|| {
            process.reset().unwrap();
            black_box(&process);
        });
    });
}

criterion_group!(
    benches,
    bench_mortality_1x1,
    bench_mortality_4x10,
    bench_mortality_reset
);
criterion_main!(benches);
