//! Reusable process test fixtures.
//!
//! Two minimal processes for scheduler and engine testing:
//!
//! - [`ScaleProcess`] multiplies the numbers of some categories by a factor.
//! - [`NegativeProcess`] writes a negative value into one cell, so the
//!   scheduler's partition check can be exercised.

use cohort_core::{CategoryId, ConfigError, ExecutionError, Provenance, Usage};
use cohort_process::{
    Addressable, AddressableRegistry, BuildContext, ExecuteContext, Process, ValidateContext,
};

/// Multiplies every cell of its categories by `factor` each execution.
///
/// `factor` is exposed as the scalar addressable `factor`, so engine tests
/// can drive it through addressable paths.
pub struct ScaleProcess {
    pub label: String,
    pub categories: Vec<String>,
    pub factor: f64,
    ids: Vec<CategoryId>,
    executions: usize,
    addressables: AddressableRegistry,
}

impl ScaleProcess {
    pub fn new<I, S>(label: impl Into<String>, categories: I, factor: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            label: label.into(),
            categories: categories.into_iter().map(Into::into).collect(),
            factor,
            ids: Vec::new(),
            executions: 0,
            addressables: AddressableRegistry::new(),
        }
    }

    /// Executions since the last reset.
    pub fn executions(&self) -> usize {
        self.executions
    }
}

impl Process for ScaleProcess {
    fn label(&self) -> &str {
        &self.label
    }

    fn type_name(&self) -> &'static str {
        "scale"
    }

    fn validate(&mut self, ctx: &ValidateContext<'_>) -> Result<(), ConfigError> {
        let at = Provenance::inline();
        for category in &self.categories {
            ctx.check_category(category, &at)?;
        }
        self.addressables
            .register("factor", Addressable::Scalar(self.factor), Usage::all())?;
        Ok(())
    }

    fn build(&mut self, ctx: &BuildContext<'_>) -> Result<(), ConfigError> {
        let at = Provenance::inline();
        self.ids = self
            .categories
            .iter()
            .map(|c| ctx.category_id(c, &at))
            .collect::<Result<_, _>>()?;
        Ok(())
    }

    fn reset(&mut self) -> Result<(), ExecutionError> {
        self.factor = self.addressables.scalar("factor")?;
        self.executions = 0;
        Ok(())
    }

    fn execute(&mut self, ctx: &mut ExecuteContext<'_>) -> Result<(), ExecutionError> {
        for &id in &self.ids {
            for n in ctx.partition_mut().get_mut(id).numbers_at_age_mut() {
                *n *= self.factor;
            }
        }
        self.executions += 1;
        Ok(())
    }

    fn addressables(&self) -> &AddressableRegistry {
        &self.addressables
    }

    fn addressables_mut(&mut self) -> &mut AddressableRegistry {
        &mut self.addressables
    }
}

/// Sets the youngest age of `category` to `-1` once `year` is reached.
pub struct NegativeProcess {
    pub label: String,
    pub category: String,
    pub year: u32,
    id: Option<CategoryId>,
    addressables: AddressableRegistry,
}

impl NegativeProcess {
    pub fn new(label: impl Into<String>, category: impl Into<String>, year: u32) -> Self {
        Self {
            label: label.into(),
            category: category.into(),
            year,
            id: None,
            addressables: AddressableRegistry::new(),
        }
    }
}

impl Process for NegativeProcess {
    fn label(&self) -> &str {
        &self.label
    }

    fn type_name(&self) -> &'static str {
        "negative"
    }

    fn validate(&mut self, ctx: &ValidateContext<'_>) -> Result<(), ConfigError> {
        ctx.check_category(&self.category, &Provenance::inline())
    }

    fn build(&mut self, ctx: &BuildContext<'_>) -> Result<(), ConfigError> {
        self.id = Some(ctx.category_id(&self.category, &Provenance::inline())?);
        Ok(())
    }

    fn reset(&mut self) -> Result<(), ExecutionError> {
        Ok(())
    }

    fn execute(&mut self, ctx: &mut ExecuteContext<'_>) -> Result<(), ExecutionError> {
        if ctx.year() < self.year {
            return Ok(());
        }
        if let Some(id) = self.id {
            if let Some(first) = ctx.partition_mut().get_mut(id).numbers_at_age_mut().first_mut() {
                *first = -1.0;
            }
        }
        Ok(())
    }

    fn addressables(&self) -> &AddressableRegistry {
        &self.addressables
    }

    fn addressables_mut(&mut self) -> &mut AddressableRegistry {
        &mut self.addressables
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProcessHarness;
    use cohort_core::AgeRange;

    #[test]
    fn scale_process_multiplies_numbers() {
        let ages = AgeRange::new(1, 3).unwrap();
        let mut h = ProcessHarness::new(2000, 2001, ages);
        h.add_category("stock", ages, None);
        let mut p = ScaleProcess::new("scale", ["stock"], 0.5);
        h.prepare(&mut p).unwrap();
        h.reset(&mut p).unwrap();
        h.set_numbers("stock", &[2.0, 4.0, 8.0]);
        h.execute(&mut p, 2000, 0).unwrap();
        assert_eq!(h.numbers("stock"), [1.0, 2.0, 4.0]);
        assert_eq!(p.executions(), 1);
    }

    #[test]
    fn negative_process_trips_partition_check() {
        let ages = AgeRange::new(1, 3).unwrap();
        let mut h = ProcessHarness::new(2000, 2001, ages);
        h.add_category("stock", ages, None);
        let mut p = NegativeProcess::new("bad", "stock", 2001);
        h.prepare(&mut p).unwrap();
        h.execute(&mut p, 2000, 0).unwrap();
        assert!(h.partition.check_non_negative().is_ok());
        h.execute(&mut p, 2001, 0).unwrap();
        assert!(matches!(
            h.partition.check_non_negative(),
            Err(ExecutionError::NegativePartition { age: 1, .. })
        ));
    }
}
