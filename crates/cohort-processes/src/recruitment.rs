//! Constant recruitment.

use cohort_core::math::is_one;
use cohort_core::{CategoryId, ConfigError, ExecutionError, Provenance, Usage};
use cohort_process::{
    Addressable, AddressableRegistry, BuildContext, ExecuteContext, Process, ValidateContext,
};

/// Addressable label of the recruitment level.
pub const ADDRESSABLE_R0: &str = "r0";

/// Adds `r0 · proportion` fish to the recruitment age of each category.
///
/// The recruitment age defaults to each category's youngest age.
#[derive(Debug)]
pub struct RecruitmentConstant {
    label: String,
    category_labels: Vec<String>,
    proportions: Vec<f64>,
    age: Option<u32>,
    r0: f64,
    categories: Vec<(CategoryId, usize)>,
    addressables: AddressableRegistry,
}

impl RecruitmentConstant {
    /// Recruit `r0` fish split over `categories` by `proportions`.
    pub fn new<I, S>(
        label: impl Into<String>,
        categories: I,
        proportions: Vec<f64>,
        r0: f64,
    ) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let category_labels: Vec<String> = categories.into_iter().map(Into::into).collect();
        let at = Provenance::inline();
        if proportions.len() != category_labels.len() {
            return Err(ConfigError::LengthMismatch {
                parameter: "proportions".into(),
                expected: category_labels.len(),
                actual: proportions.len(),
                at,
            });
        }
        if let Some(p) = proportions.iter().find(|p| !(0.0..=1.0).contains(*p)) {
            return Err(ConfigError::InvalidValue {
                parameter: "proportions".into(),
                value: p.to_string(),
                reason: "must lie in [0, 1]".into(),
                at,
            });
        }
        let total: f64 = proportions.iter().sum();
        if !is_one(total) {
            return Err(ConfigError::ProportionsNotOne {
                parameter: "proportions".into(),
                total,
            });
        }
        if !(r0.is_finite() && r0 >= 0.0) {
            return Err(ConfigError::InvalidValue {
                parameter: ADDRESSABLE_R0.into(),
                value: r0.to_string(),
                reason: "must be finite and non-negative".into(),
                at,
            });
        }
        Ok(Self {
            label: label.into(),
            category_labels,
            proportions,
            age: None,
            r0,
            categories: Vec::new(),
            addressables: AddressableRegistry::new(),
        })
    }

    /// Recruit at `age` instead of each category's youngest age.
    pub fn at_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    /// Recruitment level of the current evaluation.
    pub fn r0(&self) -> f64 {
        self.r0
    }
}

impl Process for RecruitmentConstant {
    fn label(&self) -> &str {
        &self.label
    }

    fn type_name(&self) -> &'static str {
        "recruitment_constant"
    }

    fn validate(&mut self, ctx: &ValidateContext<'_>) -> Result<(), ConfigError> {
        let at = Provenance::inline();
        for category in &self.category_labels {
            ctx.check_category(category, &at)?;
        }
        if let Some(age) = self.age {
            if !ctx.model().ages.contains(age) {
                return Err(ConfigError::InvalidValue {
                    parameter: "age".into(),
                    value: age.to_string(),
                    reason: "must be a model age".into(),
                    at,
                });
            }
        }
        self.addressables
            .register(ADDRESSABLE_R0, Addressable::Scalar(self.r0), Usage::all())?;
        Ok(())
    }

    fn build(&mut self, ctx: &BuildContext<'_>) -> Result<(), ConfigError> {
        let at = Provenance::inline();
        let mut categories = Vec::with_capacity(self.category_labels.len());
        for label in &self.category_labels {
            let id = ctx.category_id(label, &at)?;
            let category = ctx.partition().get(id);
            let age = self.age.unwrap_or_else(|| category.min_age());
            let index = category.age_index(age).ok_or_else(|| ConfigError::InvalidValue {
                parameter: "age".into(),
                value: age.to_string(),
                reason: format!("is outside the ages of category '{label}'"),
                at: at.clone(),
            })?;
            categories.push((id, index));
        }
        self.categories = categories;
        Ok(())
    }

    fn reset(&mut self) -> Result<(), ExecutionError> {
        self.r0 = self.addressables.scalar(ADDRESSABLE_R0)?;
        Ok(())
    }

    fn execute(&mut self, ctx: &mut ExecuteContext<'_>) -> Result<(), ExecutionError> {
        for (&(id, index), proportion) in self.categories.iter().zip(&self.proportions) {
            let numbers = ctx.partition_mut().get_mut(id).numbers_at_age_mut();
            numbers[index] += self.r0 * proportion;
        }
        tracing::trace!(process = %self.label, year = ctx.year(), r0 = self.r0, "recruited");
        Ok(())
    }

    fn addressables(&self) -> &AddressableRegistry {
        &self.addressables
    }

    fn addressables_mut(&mut self) -> &mut AddressableRegistry {
        &mut self.addressables
    }
}
