//! Registry of growth sub-models.

use std::fmt;

use indexmap::IndexMap;

use cohort_core::{AgeLength, AgeLengthId, ConfigError};

/// Growth sub-models keyed by label, in declaration order.
///
/// `AgeLengthId(n)` is the n-th registered sub-model.
#[derive(Default)]
pub struct AgeLengths {
    entries: IndexMap<String, Box<dyn AgeLength>>,
}

impl AgeLengths {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sub-model under `label`.
    pub fn insert(
        &mut self,
        label: impl Into<String>,
        age_length: Box<dyn AgeLength>,
    ) -> Result<AgeLengthId, ConfigError> {
        let label = label.into();
        if self.entries.contains_key(&label) {
            return Err(ConfigError::DuplicateLabel {
                kind: "age length",
                label,
            });
        }
        let id = AgeLengthId(self.entries.len() as u32);
        self.entries.insert(label, age_length);
        Ok(id)
    }

    /// Handle for `label`.
    pub fn id(&self, label: &str) -> Option<AgeLengthId> {
        self.entries
            .get_index_of(label)
            .map(|i| AgeLengthId(i as u32))
    }

    /// Sub-model for a handle issued by this registry.
    pub fn get(&self, id: AgeLengthId) -> Option<&dyn AgeLength> {
        self.entries.get_index(id.index()).map(|(_, a)| a.as_ref())
    }

    /// Number of registered sub-models.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no sub-model is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for AgeLengths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgeLengths")
            .field("labels", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}
