//! The population partition: arena of categories for one evaluation.

use indexmap::IndexMap;

use cohort_core::{
    AgeRange, CategoryId, CategoryValidator, ConfigError, ExecutionError, PartitionError,
    Provenance, WeightUnits,
};

use crate::category::{Category, CategoryDef};
use crate::growth::AgeLengths;

/// Sole owner of the population counts for one model evaluation.
///
/// Categories are stored in declaration order and addressed by
/// [`CategoryId`]. Name lookups go through an `IndexMap` so iteration is
/// deterministic.
#[derive(Clone, Debug)]
pub struct Partition {
    categories: Vec<Category>,
    index: IndexMap<String, CategoryId>,
    model_ages: AgeRange,
    time_steps: usize,
    base_units: WeightUnits,
}

impl Partition {
    /// An empty partition for a model spanning `model_ages` with
    /// `time_steps` time steps per year.
    pub fn new(model_ages: AgeRange, time_steps: usize, base_units: WeightUnits) -> Self {
        Self {
            categories: Vec::new(),
            index: IndexMap::new(),
            model_ages,
            time_steps,
            base_units,
        }
    }

    /// Add a category, returning its handle.
    ///
    /// Names must be unique and the category's ages must lie within the
    /// model's age range.
    pub fn add_category(&mut self, def: CategoryDef) -> Result<CategoryId, ConfigError> {
        if self.index.contains_key(&def.name) {
            return Err(ConfigError::DuplicateLabel {
                kind: "category",
                label: def.name,
            });
        }
        if !self.model_ages.contains(def.ages.min) || !self.model_ages.contains(def.ages.max) {
            return Err(ConfigError::InvalidValue {
                parameter: format!("category '{}' ages", def.name),
                value: format!("{}..={}", def.ages.min, def.ages.max),
                reason: format!(
                    "must lie within the model ages {}..={}",
                    self.model_ages.min, self.model_ages.max
                ),
                at: Provenance::inline(),
            });
        }
        let id = CategoryId(self.categories.len() as u32);
        self.index.insert(def.name.clone(), id);
        self.categories.push(Category::new(def, self.time_steps));
        Ok(id)
    }

    /// Model age range.
    pub fn model_ages(&self) -> AgeRange {
        self.model_ages
    }

    /// Number of time steps in the annual cycle.
    pub fn time_steps(&self) -> usize {
        self.time_steps
    }

    /// Units of the cached mean weights.
    pub fn base_units(&self) -> WeightUnits {
        self.base_units
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Whether the partition holds no categories.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Whether a category with this name exists.
    pub fn has_category(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Resolve a name to its handle.
    pub fn category_id(&self, name: &str) -> Result<CategoryId, PartitionError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| PartitionError::CategoryNotFound {
                name: name.to_string(),
            })
    }

    /// Category by name.
    pub fn category(&self, name: &str) -> Result<&Category, PartitionError> {
        let id = self.category_id(name)?;
        Ok(&self.categories[id.index()])
    }

    /// Mutable category by name.
    pub fn category_mut(&mut self, name: &str) -> Result<&mut Category, PartitionError> {
        let id = self.category_id(name)?;
        Ok(&mut self.categories[id.index()])
    }

    /// Category by handle.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this partition.
    pub fn get(&self, id: CategoryId) -> &Category {
        &self.categories[id.index()]
    }

    /// Mutable category by handle.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this partition.
    pub fn get_mut(&mut self, id: CategoryId) -> &mut Category {
        &mut self.categories[id.index()]
    }

    /// Categories in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (CategoryId, &Category)> {
        self.categories
            .iter()
            .enumerate()
            .map(|(i, c)| (CategoryId(i as u32), c))
    }

    /// Zero every category. Called at the start of each evaluation.
    pub fn reset(&mut self) {
        for category in &mut self.categories {
            category.clear();
        }
    }

    /// Recompute the mean-weight cache of every category with a growth
    /// sub-model for `year`, converting to the partition's base units.
    pub fn update_mean_weights(&mut self, year: u32, age_lengths: &AgeLengths) {
        let model_ages = self.model_ages;
        let base_units = self.base_units;
        for category in &mut self.categories {
            let Some(age_length) = category.age_length().and_then(|id| age_lengths.get(id)) else {
                continue;
            };
            let factor = age_length.weight_units().factor_to(base_units);
            let ages = category.ages();
            for (time_step, weights) in category.mean_weights_mut().iter_mut().enumerate() {
                for (slot, age) in weights.iter_mut().zip(ages.ages()) {
                    *slot = age_length.mean_weight(year, time_step, age, model_ages) * factor;
                }
            }
        }
        tracing::trace!(year, "mean weights updated");
    }

    /// Check every cell is finite and non-negative.
    ///
    /// Returns the first offending cell in declaration and age order.
    pub fn check_non_negative(&self) -> Result<(), ExecutionError> {
        for category in &self.categories {
            for (value, age) in category.numbers_at_age().iter().zip(category.ages().ages()) {
                if !value.is_finite() {
                    return Err(ExecutionError::NonFinite {
                        category: category.name().to_string(),
                        age,
                        value: *value,
                    });
                }
                if *value < 0.0 {
                    return Err(ExecutionError::NegativePartition {
                        category: category.name().to_string(),
                        age,
                        value: *value,
                    });
                }
            }
        }
        Ok(())
    }

    /// Total numbers over every category and age.
    pub fn total(&self) -> f64 {
        self.categories.iter().map(Category::total).sum()
    }
}

impl CategoryValidator for Partition {
    fn is_valid(&self, label: &str) -> bool {
        self.has_category(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cohort_core::{AgeLength, AgeLengthId};
    use proptest::prelude::*;

    struct LinearWeight;

    impl AgeLength for LinearWeight {
        fn mean_length(&self, _time_step: usize, age: u32) -> f64 {
            age as f64
        }

        fn mean_weight(&self, _year: u32, time_step: usize, age: u32, _ages: AgeRange) -> f64 {
            (age as f64) * 1000.0 + time_step as f64
        }

        fn weight_units(&self) -> WeightUnits {
            WeightUnits::Kilograms
        }
    }

    fn partition() -> Partition {
        let mut p = Partition::new(AgeRange::new(1, 10).unwrap(), 2, WeightUnits::Tonnes);
        p.add_category(CategoryDef {
            name: "male".into(),
            ages: AgeRange::new(1, 10).unwrap(),
            age_length: Some(AgeLengthId(0)),
        })
        .unwrap();
        p.add_category(CategoryDef {
            name: "female".into(),
            ages: AgeRange::new(2, 10).unwrap(),
            age_length: None,
        })
        .unwrap();
        p
    }

    #[test]
    fn lookup_by_name_and_handle() {
        let p = partition();
        assert_eq!(p.category_id("female"), Ok(CategoryId(1)));
        assert_eq!(p.get(CategoryId(1)).age_spread(), 9);
        assert!(p.is_valid("male"));
        assert!(!p.is_valid("juvenile"));
    }

    #[test]
    fn unknown_category_is_not_found() {
        let p = partition();
        assert_eq!(
            p.category("juvenile").unwrap_err(),
            PartitionError::CategoryNotFound {
                name: "juvenile".into()
            }
        );
    }

    #[test]
    fn duplicate_and_out_of_range_categories_rejected() {
        let mut p = partition();
        let dup = p.add_category(CategoryDef {
            name: "male".into(),
            ages: AgeRange::new(1, 10).unwrap(),
            age_length: None,
        });
        assert!(matches!(dup, Err(ConfigError::DuplicateLabel { .. })));

        let wide = p.add_category(CategoryDef {
            name: "old".into(),
            ages: AgeRange::new(1, 12).unwrap(),
            age_length: None,
        });
        assert!(matches!(wide, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn mean_weights_converted_to_base_units() {
        let mut p = partition();
        let mut growth = AgeLengths::new();
        growth.insert("vb", Box::new(LinearWeight)).unwrap();
        p.update_mean_weights(2000, &growth);

        let male = p.category("male").unwrap();
        assert!((male.mean_weight(0, 0).unwrap() - 1.0).abs() < 1e-12);
        assert!((male.mean_weight(1, 2).unwrap() - 3.001).abs() < 1e-12);
        assert!(p.category("female").unwrap().mean_weights(0).is_none());
    }

    #[test]
    fn check_non_negative_reports_first_negative_cell() {
        let mut p = partition();
        p.get_mut(CategoryId(1)).numbers_at_age_mut()[3] = -0.5;
        assert_eq!(
            p.check_non_negative(),
            Err(ExecutionError::NegativePartition {
                category: "female".into(),
                age: 5,
                value: -0.5,
            })
        );
        p.get_mut(CategoryId(0)).numbers_at_age_mut()[0] = f64::NAN;
        assert!(matches!(
            p.check_non_negative(),
            Err(ExecutionError::NonFinite { age: 1, .. })
        ));
    }

    proptest! {
        #[test]
        fn reset_zeroes_everything(values in prop::collection::vec(0.0f64..1e6, 10)) {
            let mut p = partition();
            p.category_mut("male").unwrap().set_numbers_at_age(&values).unwrap();
            p.reset();
            prop_assert_eq!(p.total(), 0.0);
            prop_assert!(p.check_non_negative().is_ok());
        }
    }
}
