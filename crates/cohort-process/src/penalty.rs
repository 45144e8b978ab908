//! Process penalties: soft-constraint violations fed to the objective.
//!
//! A process triggers a penalty when a business rule cannot be honoured
//! exactly (a fishery asking for more than its exploitation cap allows).
//! Triggering records the amount requested and the amount actually
//! permitted and never interrupts execution. The objective-function layer
//! converts the records into a score after the evaluation.

use indexmap::IndexMap;

use cohort_core::math::zero_fun;
use cohort_core::{ConfigError, PenaltyId, Provenance};

/// Definition of a process penalty.
#[derive(Clone, Debug, PartialEq)]
pub struct ProcessPenalty {
    /// Unique label referenced from process configuration.
    pub label: String,
    /// Score on the log scale.
    pub log_scale: bool,
    /// Multiplier applied to each squared discrepancy.
    pub multiplier: f64,
}

impl ProcessPenalty {
    /// A penalty scored on the natural scale with multiplier 1.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            log_scale: false,
            multiplier: 1.0,
        }
    }

    /// Score each record on the log scale.
    pub fn log_scale(mut self, log_scale: bool) -> Self {
        self.log_scale = log_scale;
        self
    }

    /// Set the multiplier.
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.multiplier.is_finite() || self.multiplier <= 0.0 {
            return Err(ConfigError::InvalidValue {
                parameter: format!("penalty '{}' multiplier", self.label),
                value: self.multiplier.to_string(),
                reason: "must be finite and positive".into(),
                at: Provenance::inline(),
            });
        }
        Ok(())
    }

    /// Score contribution of one record.
    ///
    /// `multiplier · (ln(requested) − ln(permitted))²` on the log scale,
    /// `multiplier · (requested − permitted)²` otherwise. Log arguments are
    /// bounded away from zero.
    pub fn score(&self, record: &PenaltyRecord) -> f64 {
        let diff = if self.log_scale {
            zero_fun(record.requested).ln() - zero_fun(record.permitted).ln()
        } else {
            record.requested - record.permitted
        };
        self.multiplier * diff * diff
    }
}

/// One soft-constraint violation.
#[derive(Clone, Debug, PartialEq)]
pub struct PenaltyRecord {
    /// What triggered it: `<process>/<fishery>` for catch penalties.
    pub source: String,
    /// Amount the configuration asked for.
    pub requested: f64,
    /// Amount actually permitted.
    pub permitted: f64,
}

#[derive(Clone, Debug)]
struct Entry {
    def: ProcessPenalty,
    records: Vec<PenaltyRecord>,
}

/// Registry of process penalties and their records for one evaluation.
#[derive(Clone, Debug, Default)]
pub struct Penalties {
    entries: IndexMap<String, Entry>,
}

impl Penalties {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a penalty definition.
    pub fn insert(&mut self, def: ProcessPenalty) -> Result<PenaltyId, ConfigError> {
        def.validate()?;
        if self.entries.contains_key(&def.label) {
            return Err(ConfigError::DuplicateLabel {
                kind: "penalty",
                label: def.label,
            });
        }
        let id = PenaltyId(self.entries.len() as u32);
        self.entries.insert(
            def.label.clone(),
            Entry {
                def,
                records: Vec::new(),
            },
        );
        Ok(id)
    }

    /// Handle for `label`.
    pub fn id(&self, label: &str) -> Option<PenaltyId> {
        self.entries
            .get_index_of(label)
            .map(|i| PenaltyId(i as u32))
    }

    /// Record a violation. Never fails; an unknown handle is ignored.
    pub fn trigger(&mut self, id: PenaltyId, source: &str, requested: f64, permitted: f64) {
        let Some((label, entry)) = self.entries.get_index_mut(id.index()) else {
            return;
        };
        tracing::trace!(
            penalty = %label,
            source,
            requested,
            permitted,
            "penalty triggered"
        );
        entry.records.push(PenaltyRecord {
            source: source.to_string(),
            requested,
            permitted,
        });
    }

    /// Definition of `label`.
    pub fn definition(&self, label: &str) -> Option<&ProcessPenalty> {
        self.entries.get(label).map(|e| &e.def)
    }

    /// Records of `label` for the current evaluation.
    pub fn records(&self, label: &str) -> Option<&[PenaltyRecord]> {
        self.entries.get(label).map(|e| e.records.as_slice())
    }

    /// Total shortfall `Σ (requested − permitted)` of `label`.
    pub fn total_violation(&self, label: &str) -> Option<f64> {
        self.records(label)
            .map(|records| records.iter().map(|r| r.requested - r.permitted).sum())
    }

    /// Score of `label`.
    pub fn score(&self, label: &str) -> Option<f64> {
        self.entries
            .get(label)
            .map(|e| e.records.iter().map(|r| e.def.score(r)).sum())
    }

    /// Sum of the scores of every penalty.
    pub fn total_score(&self) -> f64 {
        self.entries
            .values()
            .flat_map(|e| e.records.iter().map(|r| e.def.score(r)))
            .sum()
    }

    /// Number of records over every penalty.
    pub fn trigger_count(&self) -> usize {
        self.entries.values().map(|e| e.records.len()).sum()
    }

    /// Labels in registration order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Drop every record. Called at the start of each evaluation.
    pub fn clear(&mut self) {
        for entry in self.entries.values_mut() {
            entry.records.clear();
        }
    }
}
