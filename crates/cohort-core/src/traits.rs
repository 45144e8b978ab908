//! Collaborator traits consumed by processes.
//!
//! Selectivities and growth sub-models live outside the core. Processes see
//! them only through these traits, resolved to handles at Build time and
//! evaluated through the execution context.

use crate::mode::AgeRange;
use crate::units::WeightUnits;

/// An age-dependent proportion in `[0, 1]`.
///
/// Implementations must be pure: the same age always yields the same value
/// between two parameter changes. Processes cache the values once per
/// execution, so a selectivity is never queried inside an age loop.
///
/// # Examples
///
/// ```
/// use cohort_core::Selectivity;
///
/// struct KnifeEdge { edge: u32 }
///
/// impl Selectivity for KnifeEdge {
///     fn age_result(&self, age: u32) -> f64 {
///         if age >= self.edge { 1.0 } else { 0.0 }
///     }
/// }
///
/// let s = KnifeEdge { edge: 3 };
/// assert_eq!(s.age_result(2), 0.0);
/// assert_eq!(s.age_result(3), 1.0);
/// ```
pub trait Selectivity: Send + 'static {
    /// Proportion selected at `age`.
    fn age_result(&self, age: u32) -> f64;
}

/// A growth sub-model converting age to mean length and mean weight.
pub trait AgeLength: Send + 'static {
    /// Mean length at `age` during `time_step`.
    fn mean_length(&self, time_step: usize, age: u32) -> f64;

    /// Mean weight of one individual at `age` during `time_step` of `year`,
    /// in [`weight_units`](AgeLength::weight_units).
    ///
    /// `ages` is the model age range, needed by sub-models whose length
    /// variability is interpolated between the youngest and oldest age.
    fn mean_weight(&self, year: u32, time_step: usize, age: u32, ages: AgeRange) -> f64;

    /// Unit of the values returned by [`mean_weight`](AgeLength::mean_weight).
    fn weight_units(&self) -> WeightUnits;
}

/// Answers whether a category label names a known category.
///
/// Used by Validate to fail fast on misspelt labels.
pub trait CategoryValidator {
    /// Whether `label` is a known category.
    fn is_valid(&self, label: &str) -> bool;
}
