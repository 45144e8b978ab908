//! A single population stratum.

use cohort_core::{AgeLengthId, AgeRange, PartitionError};

/// Construction input for a [`Category`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryDef {
    /// Unique category name.
    pub name: String,
    /// Ages held by the category.
    pub ages: AgeRange,
    /// Growth sub-model supplying mean weights, if any.
    pub age_length: Option<AgeLengthId>,
}

/// Numbers-at-age for one population stratum, plus its mean-weight cache.
///
/// Every element of `numbers_at_age` is non-negative at every point a
/// process boundary can observe. Only the executing process mutates it.
#[derive(Clone, Debug)]
pub struct Category {
    name: String,
    ages: AgeRange,
    age_length: Option<AgeLengthId>,
    numbers: Vec<f64>,
    /// `mean_weights[time_step][age_index]`, in model base units.
    mean_weights: Vec<Vec<f64>>,
}

impl Category {
    pub(crate) fn new(def: CategoryDef, time_steps: usize) -> Self {
        let spread = def.ages.spread();
        let mean_weights = match def.age_length {
            Some(_) => vec![vec![0.0; spread]; time_steps],
            None => Vec::new(),
        };
        Self {
            name: def.name,
            ages: def.ages,
            age_length: def.age_length,
            numbers: vec![0.0; spread],
            mean_weights,
        }
    }

    /// Category name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ages held by this category.
    pub fn ages(&self) -> AgeRange {
        self.ages
    }

    /// Youngest age.
    pub fn min_age(&self) -> u32 {
        self.ages.min
    }

    /// Oldest age.
    pub fn max_age(&self) -> u32 {
        self.ages.max
    }

    /// Number of age classes.
    pub fn age_spread(&self) -> usize {
        self.numbers.len()
    }

    /// Growth sub-model bound to this category.
    pub fn age_length(&self) -> Option<AgeLengthId> {
        self.age_length
    }

    /// Position of `age` in [`numbers_at_age`](Category::numbers_at_age).
    pub fn age_index(&self, age: u32) -> Option<usize> {
        self.ages
            .contains(age)
            .then(|| (age - self.ages.min) as usize)
    }

    /// Numbers at each age, youngest first.
    pub fn numbers_at_age(&self) -> &[f64] {
        &self.numbers
    }

    /// Mutable numbers at each age, youngest first.
    pub fn numbers_at_age_mut(&mut self) -> &mut [f64] {
        &mut self.numbers
    }

    /// Numbers at a single age.
    pub fn numbers_at(&self, age: u32) -> Result<f64, PartitionError> {
        self.age_index(age)
            .map(|i| self.numbers[i])
            .ok_or_else(|| self.out_of_range(age))
    }

    /// Replace every age class at once.
    pub fn set_numbers_at_age(&mut self, values: &[f64]) -> Result<(), PartitionError> {
        if values.len() != self.numbers.len() {
            return Err(PartitionError::LengthMismatch {
                category: self.name.clone(),
                expected: self.numbers.len(),
                actual: values.len(),
            });
        }
        self.numbers.copy_from_slice(values);
        Ok(())
    }

    /// Total numbers over all ages.
    pub fn total(&self) -> f64 {
        self.numbers.iter().sum()
    }

    /// Mean weight at each age during `time_step`, or `None` when the
    /// category has no growth sub-model.
    pub fn mean_weights(&self, time_step: usize) -> Option<&[f64]> {
        self.mean_weights.get(time_step).map(Vec::as_slice)
    }

    /// Mean weight at `age_index` during `time_step`.
    pub fn mean_weight(&self, time_step: usize, age_index: usize) -> Option<f64> {
        self.mean_weights(time_step)?.get(age_index).copied()
    }

    pub(crate) fn mean_weights_mut(&mut self) -> &mut [Vec<f64>] {
        &mut self.mean_weights
    }

    pub(crate) fn clear(&mut self) {
        self.numbers.fill(0.0);
    }

    fn out_of_range(&self, age: u32) -> PartitionError {
        PartitionError::AgeOutOfRange {
            category: self.name.clone(),
            age,
            min: self.ages.min,
            max: self.ages.max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock() -> Category {
        Category::new(
            CategoryDef {
                name: "stock".into(),
                ages: AgeRange::new(3, 7).unwrap(),
                age_length: None,
            },
            2,
        )
    }

    #[test]
    fn starts_empty_with_age_spread() {
        let c = stock();
        assert_eq!(c.age_spread(), 5);
        assert!(c.numbers_at_age().iter().all(|&n| n == 0.0));
        assert!(c.mean_weights(0).is_none());
    }

    #[test]
    fn age_index_is_offset_by_min_age() {
        let c = stock();
        assert_eq!(c.age_index(3), Some(0));
        assert_eq!(c.age_index(7), Some(4));
        assert_eq!(c.age_index(8), None);
    }

    #[test]
    fn set_numbers_checks_length() {
        let mut c = stock();
        c.set_numbers_at_age(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(c.numbers_at(5), Ok(3.0));
        assert_eq!(c.total(), 15.0);
        assert!(matches!(
            c.set_numbers_at_age(&[1.0]),
            Err(PartitionError::LengthMismatch { expected: 5, .. })
        ));
        assert!(matches!(
            c.numbers_at(2),
            Err(PartitionError::AgeOutOfRange { min: 3, max: 7, .. })
        ));
    }
}
