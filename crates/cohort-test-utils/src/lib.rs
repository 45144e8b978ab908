//! Test utilities and mock types for Cohort development.
//!
//! Provides mock selectivities, table helpers, reusable process fixtures
//! and a [`ProcessHarness`] that drives one process through its lifecycle
//! without building a whole model.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod harness;

pub use fixtures::{NegativeProcess, ScaleProcess};
pub use harness::ProcessHarness;

use cohort_core::{Selectivity, Table};

/// Install a `tracing` subscriber honouring `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Selectivity that returns the same value at every age.
#[derive(Clone, Copy, Debug)]
pub struct FlatSelectivity(pub f64);

impl Selectivity for FlatSelectivity {
    fn age_result(&self, _age: u32) -> f64 {
        self.0
    }
}

/// Selectivity with an explicit value per age, starting at `first_age`.
///
/// Ages outside the table return zero.
#[derive(Clone, Debug)]
pub struct MockSelectivity {
    pub first_age: u32,
    pub values: Vec<f64>,
}

impl MockSelectivity {
    pub fn new(first_age: u32, values: Vec<f64>) -> Self {
        Self { first_age, values }
    }
}

impl Selectivity for MockSelectivity {
    fn age_result(&self, age: u32) -> f64 {
        age.checked_sub(self.first_age)
            .and_then(|i| self.values.get(i as usize))
            .copied()
            .unwrap_or(0.0)
    }
}

/// A `catches` table with one column per fishery.
///
/// `rows` are `(year, catch per fishery)` in the order of `fisheries`.
pub fn catches_table(fisheries: &[&str], rows: &[(u32, &[f64])]) -> Table {
    let mut table = Table::new(
        "catches",
        std::iter::once("year").chain(fisheries.iter().copied()),
    );
    for (year, catches) in rows {
        table.push_row(
            std::iter::once(year.to_string()).chain(catches.iter().map(f64::to_string)),
        );
    }
    table
}

/// A `method` table with the six required columns.
///
/// Each row is `[method, category, selectivity, time_step, u_max, penalty]`.
pub fn method_table(rows: &[[&str; 6]]) -> Table {
    let mut table = Table::new(
        "method",
        ["method", "category", "selectivity", "time_step", "u_max", "penalty"],
    );
    for row in rows {
        table.push_row(row.iter().copied());
    }
    table
}

/// A retained-catch `method` table.
///
/// Each row is `[method, category, selectivity, retained_selectivity,
/// discard_mortality_selectivity, time_step, u_max, penalty]`.
pub fn retained_method_table(rows: &[[&str; 8]]) -> Table {
    let mut table = Table::new(
        "method",
        [
            "method",
            "category",
            "selectivity",
            "retained_selectivity",
            "discard_mortality_selectivity",
            "time_step",
            "u_max",
            "penalty",
        ],
    );
    for row in rows {
        table.push_row(row.iter().copied());
    }
    table
}
