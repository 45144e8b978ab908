//! Annual ageing.

use cohort_core::{CategoryId, ConfigError, ExecutionError, Provenance};
use cohort_process::{AddressableRegistry, BuildContext, ExecuteContext, Process, ValidateContext};

/// Moves every fish in the listed categories one age up.
///
/// The youngest age is emptied. When the model has a plus group the
/// oldest age keeps its fish and receives the next-oldest; otherwise the
/// oldest age is lost.
#[derive(Debug)]
pub struct Ageing {
    label: String,
    category_labels: Vec<String>,
    categories: Vec<CategoryId>,
    age_plus: bool,
    addressables: AddressableRegistry,
}

impl Ageing {
    /// An ageing process over `categories`.
    pub fn new<I, S>(label: impl Into<String>, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            label: label.into(),
            category_labels: categories.into_iter().map(Into::into).collect(),
            categories: Vec::new(),
            age_plus: false,
            addressables: AddressableRegistry::new(),
        }
    }
}

impl Process for Ageing {
    fn label(&self) -> &str {
        &self.label
    }

    fn type_name(&self) -> &'static str {
        "ageing"
    }

    fn validate(&mut self, ctx: &ValidateContext<'_>) -> Result<(), ConfigError> {
        if self.category_labels.is_empty() {
            return Err(ConfigError::InvalidValue {
                parameter: "categories".into(),
                value: String::new(),
                reason: format!("process '{}' needs at least one category", self.label),
                at: Provenance::inline(),
            });
        }
        let at = Provenance::inline();
        for category in &self.category_labels {
            ctx.check_category(category, &at)?;
        }
        self.age_plus = ctx.model().age_plus;
        Ok(())
    }

    fn build(&mut self, ctx: &BuildContext<'_>) -> Result<(), ConfigError> {
        let at = Provenance::inline();
        self.categories = self
            .category_labels
            .iter()
            .map(|label| ctx.category_id(label, &at))
            .collect::<Result<_, _>>()?;
        Ok(())
    }

    fn reset(&mut self) -> Result<(), ExecutionError> {
        Ok(())
    }

    fn execute(&mut self, ctx: &mut ExecuteContext<'_>) -> Result<(), ExecutionError> {
        for &id in &self.categories {
            let numbers = ctx.partition_mut().get_mut(id).numbers_at_age_mut();
            let Some(&oldest) = numbers.last() else {
                continue;
            };
            numbers.rotate_right(1);
            numbers[0] = 0.0;
            if self.age_plus {
                if let Some(last) = numbers.last_mut() {
                    *last += oldest;
                }
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
