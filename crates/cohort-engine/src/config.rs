//! Model configuration and its structural validation.
//!
//! [`ModelConfig`] is the constructor input for a [`Model`](crate::Model).
//! [`validate()`](ModelConfig::validate) checks the model-level invariants
//! that do not need any process to be built. Process-level checks run
//! afterwards, inside [`Model::new`](crate::Model::new).

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;

use cohort_core::{
    AgeLength, AgeRange, ConfigError, Provenance, RunMode, Selectivity, WeightUnits,
};
use cohort_process::{AddressablePath, Process};
use cohort_processes::ProcessKind;

// ── TimeStepConfig ─────────────────────────────────────────────────

/// One time step of the annual cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeStepConfig {
    /// Unique time step label.
    pub label: String,
    /// Process labels executed in this time step, in order.
    pub processes: Vec<String>,
}

impl TimeStepConfig {
    /// A time step running `processes` in the given order.
    pub fn new<I, S>(label: impl Into<String>, processes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            label: label.into(),
            processes: processes.into_iter().map(Into::into).collect(),
        }
    }
}

// ── CategoryConfig ─────────────────────────────────────────────────

/// One partition category.
///
/// `min_age` and `max_age` default to the model ages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryConfig {
    /// Unique category name.
    pub name: String,
    /// Youngest age held, if narrower than the model.
    pub min_age: Option<u32>,
    /// Oldest age held, if narrower than the model.
    pub max_age: Option<u32>,
    /// Label of the growth sub-model supplying mean weights.
    pub age_length: Option<String>,
}

impl CategoryConfig {
    /// A category spanning the model ages with no growth sub-model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min_age: None,
            max_age: None,
            age_length: None,
        }
    }

    /// Restrict the category to `min..=max`.
    pub fn ages(mut self, min: u32, max: u32) -> Self {
        self.min_age = Some(min);
        self.max_age = Some(max);
        self
    }

    /// Bind a growth sub-model by label.
    pub fn age_length(mut self, label: impl Into<String>) -> Self {
        self.age_length = Some(label.into());
        self
    }

    pub(crate) fn age_range(&self, model: AgeRange) -> Option<AgeRange> {
        AgeRange::new(
            self.min_age.unwrap_or(model.min),
            self.max_age.unwrap_or(model.max),
        )
    }
}

// ── InitialisationPhaseConfig ──────────────────────────────────────

/// A phase run before the first model year to reach a starting state.
#[derive(Clone, Debug, PartialEq)]
pub enum InitialisationPhaseConfig {
    /// Run the whole annual cycle `years` times in the initialisation state.
    Iterative {
        /// Phase label.
        label: String,
        /// Number of annual cycles.
        years: u32,
    },
    /// Overwrite numbers-at-age directly, one vector per category.
    StateByAge {
        /// Phase label.
        label: String,
        /// Category name → numbers at age over the category's ages.
        values: IndexMap<String, Vec<f64>>,
    },
}

impl InitialisationPhaseConfig {
    /// Phase label.
    pub fn label(&self) -> &str {
        match self {
            Self::Iterative { label, .. } | Self::StateByAge { label, .. } => label,
        }
    }
}

// ── ProcessPenaltyConfig ───────────────────────────────────────────

/// A process penalty definition.
#[derive(Clone, Debug, PartialEq)]
pub struct ProcessPenaltyConfig {
    /// Label referenced from process configuration.
    pub label: String,
    /// Score on the log scale.
    pub log_scale: bool,
    /// Multiplier applied to each squared discrepancy.
    pub multiplier: f64,
}

impl ProcessPenaltyConfig {
    /// A natural-scale penalty with multiplier 1.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            log_scale: false,
            multiplier: 1.0,
        }
    }
}

// ── AddressableTarget ──────────────────────────────────────────────

/// An addressable an external driver intends to vary in one run mode.
///
/// Targets are checked against the addressable's usage flags when the
/// model is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddressableTarget {
    /// Model path, `process[<label>].<addressable>{<index>}`.
    pub path: String,
    /// Mode the target is used in.
    pub mode: RunMode,
}

impl AddressableTarget {
    /// Target `path` in `mode`.
    pub fn new(path: impl Into<String>, mode: RunMode) -> Self {
        Self {
            path: path.into(),
            mode,
        }
    }
}

// ── ModelConfig ────────────────────────────────────────────────────

/// Complete configuration for constructing a [`Model`](crate::Model).
pub struct ModelConfig {
    /// First modelled year.
    pub start_year: u32,
    /// Last modelled year.
    pub final_year: u32,
    /// Last projection year. `None` disables projection.
    pub projection_final_year: Option<u32>,
    /// Youngest model age.
    pub min_age: u32,
    /// Oldest model age.
    pub max_age: u32,
    /// Whether the oldest age accumulates older fish.
    pub age_plus: bool,
    /// Unit every mean weight is converted to.
    pub base_weight_units: WeightUnits,
    /// The annual cycle, in order.
    pub time_steps: Vec<TimeStepConfig>,
    /// Partition categories. `CategoryId(n)` is `categories[n]`.
    pub categories: Vec<CategoryConfig>,
    /// Phases run before the first year, in order.
    pub initialisation_phases: Vec<InitialisationPhaseConfig>,
    /// Processes in declaration order.
    pub processes: Vec<ProcessKind>,
    /// Selectivities by label.
    pub selectivities: Vec<(String, Box<dyn Selectivity>)>,
    /// Growth sub-models by label.
    pub age_lengths: Vec<(String, Box<dyn AgeLength>)>,
    /// Process penalties.
    pub penalties: Vec<ProcessPenaltyConfig>,
    /// Addressables the driver will vary, checked against usage flags.
    pub addressable_targets: Vec<AddressableTarget>,
}

impl ModelConfig {
    /// A configuration with no time steps, categories or processes.
    ///
    /// Callers fill in the rest through the public fields.
    pub fn new(start_year: u32, final_year: u32, min_age: u32, max_age: u32) -> Self {
        Self {
            start_year,
            final_year,
            projection_final_year: None,
            min_age,
            max_age,
            age_plus: true,
            base_weight_units: WeightUnits::default(),
            time_steps: Vec::new(),
            categories: Vec::new(),
            initialisation_phases: Vec::new(),
            processes: Vec::new(),
            selectivities: Vec::new(),
            age_lengths: Vec::new(),
            penalties: Vec::new(),
            addressable_targets: Vec::new(),
        }
    }

    /// Model age range, once validated.
    pub(crate) fn ages(&self) -> Option<AgeRange> {
        AgeRange::new(self.min_age, self.max_age)
    }

    /// Validate the model-level structural invariants.
    ///
    /// Checks performed:
    ///
    /// 1. `start_year <= final_year <= projection_final_year`.
    /// 2. `min_age <= max_age`.
    /// 3. At least one category; names unique; ages within the model.
    /// 4. Process labels unique.
    /// 5. Every time step lists only known processes.
    /// 6. Initialisation phase labels unique; iterative phases run at
    ///    least one year; state-by-age values name known categories, have
    ///    one value per age and are finite and non-negative.
    /// 7. Every addressable target path parses and names a process.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Years.
        if self.start_year > self.final_year {
            return Err(ConfigError::InvalidModel {
                reason: format!(
                    "start_year ({}) is after final_year ({})",
                    self.start_year, self.final_year
                ),
            });
        }
        if let Some(projection) = self.projection_final_year {
            if projection < self.final_year {
                return Err(ConfigError::InvalidModel {
                    reason: format!(
                        "projection_final_year ({projection}) is before final_year ({})",
                        self.final_year
                    ),
                });
            }
        }

        // 2. Ages.
        let Some(ages) = self.ages() else {
            return Err(ConfigError::InvalidModel {
                reason: format!(
                    "min_age ({}) is greater than max_age ({})",
                    self.min_age, self.max_age
                ),
            });
        };

        // 3. Categories.
        if self.categories.is_empty() {
            return Err(ConfigError::InvalidModel {
                reason: "no categories defined".into(),
            });
        }
        let mut names = HashSet::with_capacity(self.categories.len());
        for category in &self.categories {
            if !names.insert(category.name.as_str()) {
                return Err(ConfigError::DuplicateLabel {
                    kind: "category",
                    label: category.name.clone(),
                });
            }
            match category.age_range(ages) {
                Some(range) if ages.contains(range.min) && ages.contains(range.max) => {}
                _ => {
                    return Err(ConfigError::InvalidModel {
                        reason: format!(
                            "category '{}' ages must lie within {}..={}",
                            category.name, ages.min, ages.max
                        ),
                    })
                }
            }
        }

        // 4. Process labels.
        let mut labels = HashSet::with_capacity(self.processes.len());
        for process in &self.processes {
            if !labels.insert(process.label()) {
                return Err(ConfigError::DuplicateLabel {
                    kind: "process",
                    label: process.label().to_string(),
                });
            }
        }

        // 5. Time steps reference known processes.
        for step in &self.time_steps {
            if let Some(unknown) = step.processes.iter().find(|p| !labels.contains(p.as_str())) {
                return Err(ConfigError::UnknownProcess {
                    label: unknown.clone(),
                    time_step: step.label.clone(),
                });
            }
        }

        // 6. Initialisation phases.
        let mut phases = HashSet::with_capacity(self.initialisation_phases.len());
        for phase in &self.initialisation_phases {
            if !phases.insert(phase.label()) {
                return Err(ConfigError::DuplicateLabel {
                    kind: "initialisation phase",
                    label: phase.label().to_string(),
                });
            }
            match phase {
                InitialisationPhaseConfig::Iterative { label, years } if *years == 0 => {
                    return Err(ConfigError::InvalidModel {
                        reason: format!("initialisation phase '{label}' runs no years"),
                    });
                }
                InitialisationPhaseConfig::Iterative { .. } => {}
                InitialisationPhaseConfig::StateByAge { label, values } => {
                    self.validate_state_by_age(label, values, ages)?;
                }
            }
        }

        // 7. Addressable targets.
        for target in &self.addressable_targets {
            let path = AddressablePath::parse(&target.path)?;
            if !labels.contains(path.process.as_str()) {
                return Err(ConfigError::InvalidModel {
                    reason: format!(
                        "addressable target '{}' names unknown process '{}'",
                        target.path, path.process
                    ),
                });
            }
        }

        Ok(())
    }

    fn validate_state_by_age(
        &self,
        phase: &str,
        values: &IndexMap<String, Vec<f64>>,
        ages: AgeRange,
    ) -> Result<(), ConfigError> {
        for (name, numbers) in values {
            let Some(category) = self.categories.iter().find(|c| &c.name == name) else {
                return Err(ConfigError::UnknownCategory {
                    label: name.clone(),
                    at: Provenance::inline(),
                });
            };
            let spread = category.age_range(ages).map_or(0, AgeRange::spread);
            if numbers.len() != spread {
                return Err(ConfigError::LengthMismatch {
                    parameter: format!("{phase} values for '{name}'"),
                    expected: spread,
                    actual: numbers.len(),
                    at: Provenance::inline(),
                });
            }
            if let Some(bad) = numbers.iter().find(|n| !n.is_finite() || **n < 0.0) {
                return Err(ConfigError::InvalidValue {
                    parameter: format!("{phase} values for '{name}'"),
                    value: bad.to_string(),
                    reason: "must be finite and non-negative".into(),
                    at: Provenance::inline(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("start_year", &self.start_year)
            .field("final_year", &self.final_year)
            .field("projection_final_year", &self.projection_final_year)
            .field("min_age", &self.min_age)
            .field("max_age", &self.max_age)
            .field("age_plus", &self.age_plus)
            .field("base_weight_units", &self.base_weight_units)
            .field("time_steps", &self.time_steps.len())
            .field("categories", &self.categories.len())
            .field("initialisation_phases", &self.initialisation_phases.len())
            .field("processes", &self.processes.len())
            .field("selectivities", &self.selectivities.len())
            .field("age_lengths", &self.age_lengths.len())
            .field("penalties", &self.penalties.len())
            .field("addressable_targets", &self.addressable_targets.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cohort_processes::Ageing;

    fn valid_config() -> ModelConfig {
        let mut cfg = ModelConfig::new(2000, 2005, 1, 5);
        cfg.categories.push(CategoryConfig::new("stock"));
        cfg.processes.push(Ageing::new("ageing", ["stock"]).into());
        cfg.time_steps.push(TimeStepConfig::new("one", ["ageing"]));
        cfg
    }

    #[test]
    fn validate_valid_config_succeeds() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn validate_reversed_years_fails() {
        let mut cfg = valid_config();
        cfg.start_year = 2010;
        match cfg.validate() {
            Err(ConfigError::InvalidModel { reason }) => assert!(reason.contains("start_year")),
            other => panic!("expected InvalidModel, got {other:?}"),
        }
    }

    #[test]
    fn validate_projection_before_final_year_fails() {
        let mut cfg = valid_config();
        cfg.projection_final_year = Some(2004);
        match cfg.validate() {
            Err(ConfigError::InvalidModel { reason }) => {
                assert!(reason.contains("projection_final_year"))
            }
            other => panic!("expected InvalidModel, got {other:?}"),
        }
    }

    #[test]
    fn validate_reversed_ages_fails() {
        let mut cfg = valid_config();
        cfg.min_age = 6;
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidModel { .. })));
    }

    #[test]
    fn validate_no_categories_fails() {
        let mut cfg = valid_config();
        cfg.categories.clear();
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidModel { .. })));
    }

    #[test]
    fn validate_duplicate_category_fails() {
        let mut cfg = valid_config();
        cfg.categories.push(CategoryConfig::new("stock"));
        match cfg.validate() {
            Err(ConfigError::DuplicateLabel {
                kind: "category", ..
            }) => {}
            other => panic!("expected DuplicateLabel, got {other:?}"),
        }
    }

    #[test]
    fn validate_category_outside_model_ages_fails() {
        let mut cfg = valid_config();
        cfg.categories.push(CategoryConfig::new("old").ages(3, 9));
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidModel { .. })));
    }

    #[test]
    fn validate_duplicate_process_fails() {
        let mut cfg = valid_config();
        cfg.processes.push(Ageing::new("ageing", ["stock"]).into());
        match cfg.validate() {
            Err(ConfigError::DuplicateLabel { kind: "process", .. }) => {}
            other => panic!("expected DuplicateLabel, got {other:?}"),
        }
    }

    #[test]
    fn validate_unknown_process_in_time_step_fails() {
        let mut cfg = valid_config();
        cfg.time_steps
            .push(TimeStepConfig::new("two", ["recruitment"]));
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::UnknownProcess {
                label: "recruitment".into(),
                time_step: "two".into(),
            })
        );
    }

    #[test]
    fn validate_zero_year_iterative_phase_fails() {
        let mut cfg = valid_config();
        cfg.initialisation_phases
            .push(InitialisationPhaseConfig::Iterative {
                label: "phase1".into(),
                years: 0,
            });
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidModel { .. })));
    }

    #[test]
    fn validate_state_by_age_checks_values() {
        let mut cfg = valid_config();
        cfg.initialisation_phases
            .push(InitialisationPhaseConfig::StateByAge {
                label: "fixed".into(),
                values: IndexMap::from([("stock".to_string(), vec![1.0, 2.0])]),
            });
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::LengthMismatch {
                expected: 5,
                actual: 2,
                ..
            })
        ));

        cfg.initialisation_phases[0] = InitialisationPhaseConfig::StateByAge {
            label: "fixed".into(),
            values: IndexMap::from([("tagged".to_string(), vec![0.0; 5])]),
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::UnknownCategory { .. })
        ));

        cfg.initialisation_phases[0] = InitialisationPhaseConfig::StateByAge {
            label: "fixed".into(),
            values: IndexMap::from([("stock".to_string(), vec![1.0, 1.0, -1.0, 1.0, 1.0])]),
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn validate_addressable_target_paths() {
        let mut cfg = valid_config();
        cfg.addressable_targets
            .push(AddressableTarget::new("process[ageing]", RunMode::Estimation));
        assert!(matches!(cfg.validate(), Err(ConfigError::Addressable(_))));

        cfg.addressable_targets[0] = AddressableTarget::new("process[growth].k", RunMode::Estimation);
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidModel { .. })));
    }

    #[test]
    fn debug_summarises_counts() {
        let text = format!("{:?}", valid_config());
        assert!(text.contains("processes: 1"));
        assert!(text.contains("start_year: 2000"));
    }
}
