//! Registry of selectivities.

use std::fmt;

use indexmap::IndexMap;

use cohort_core::{AgeRange, ConfigError, Selectivity, SelectivityId};

/// Selectivities keyed by label, in declaration order.
///
/// `SelectivityId(n)` is the n-th registered selectivity.
#[derive(Default)]
pub struct Selectivities {
    entries: IndexMap<String, Box<dyn Selectivity>>,
}

impl Selectivities {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `selectivity` under `label`.
    pub fn insert(
        &mut self,
        label: impl Into<String>,
        selectivity: Box<dyn Selectivity>,
    ) -> Result<SelectivityId, ConfigError> {
        let label = label.into();
        if self.entries.contains_key(&label) {
            return Err(ConfigError::DuplicateLabel {
                kind: "selectivity",
                label,
            });
        }
        let id = SelectivityId(self.entries.len() as u32);
        self.entries.insert(label, selectivity);
        Ok(id)
    }

    /// Handle for `label`.
    pub fn id(&self, label: &str) -> Option<SelectivityId> {
        self.entries
            .get_index_of(label)
            .map(|i| SelectivityId(i as u32))
    }

    /// Label of a handle issued by this registry.
    pub fn label(&self, id: SelectivityId) -> Option<&str> {
        self.entries.get_index(id.index()).map(|(l, _)| l.as_str())
    }

    /// Selectivity for a handle issued by this registry.
    pub fn get(&self, id: SelectivityId) -> Option<&dyn Selectivity> {
        self.entries.get_index(id.index()).map(|(_, s)| s.as_ref())
    }

    /// Evaluate `id` at each age of `ages` into `out`.
    ///
    /// `out` must hold `ages.spread()` values; unknown handles yield zeros.
    pub fn fill(&self, id: SelectivityId, ages: AgeRange, out: &mut [f64]) {
        match self.get(id) {
            Some(selectivity) => {
                for (slot, age) in out.iter_mut().zip(ages.ages()) {
                    *slot = selectivity.age_result(age);
                }
            }
            None => out.fill(0.0),
        }
    }

    /// Number of registered selectivities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Selectivities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selectivities")
            .field("labels", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}
