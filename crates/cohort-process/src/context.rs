//! Contexts passed to processes during each lifecycle phase.
//!
//! - [`ValidateContext`]: static model facts and a category validator.
//! - [`BuildContext`]: label resolvers for categories, selectivities,
//!   penalties and time steps, plus the resolved schedule.
//! - [`ExecuteContext`]: split-borrow access to the partition, the
//!   selectivities and the penalty recorder at one (year, time step).

use std::ops::RangeInclusive;

use cohort_core::{
    AgeRange, CategoryId, CategoryValidator, ConfigError, ModelState, PenaltyId, Provenance,
    SelectivityId,
};
use cohort_partition::Partition;

use crate::penalty::Penalties;
use crate::schedule::Schedule;
use crate::selectivity::Selectivities;

/// Label that disables an optional penalty binding.
pub const NO_PENALTY: &str = "none";

/// Static facts about the model a process runs in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelInfo {
    /// First modelled year.
    pub start_year: u32,
    /// Last modelled year.
    pub final_year: u32,
    /// Last projection year (equal to `final_year` when not projecting).
    pub projection_final_year: u32,
    /// Model age range.
    pub ages: AgeRange,
    /// Whether the oldest age is a plus group.
    pub age_plus: bool,
    /// Number of time steps in the annual cycle.
    pub time_steps: usize,
}

impl ModelInfo {
    /// Modelled years, ascending.
    pub fn years(&self) -> RangeInclusive<u32> {
        self.start_year..=self.final_year
    }

    /// Whether `year` is a modelled year.
    pub fn is_model_year(&self, year: u32) -> bool {
        self.years().contains(&year)
    }

    /// Whether `year` lies after the final modelled year.
    pub fn is_projection_year(&self, year: u32) -> bool {
        year > self.final_year && year <= self.projection_final_year
    }
}

// ── Validate ───────────────────────────────────────────────────────

/// Context for [`Process::validate`](crate::Process::validate).
pub struct ValidateContext<'a> {
    model: &'a ModelInfo,
    categories: &'a dyn CategoryValidator,
}

impl<'a> ValidateContext<'a> {
    /// Construct a validate context.
    pub fn new(model: &'a ModelInfo, categories: &'a dyn CategoryValidator) -> Self {
        Self { model, categories }
    }

    /// Model facts.
    pub fn model(&self) -> &ModelInfo {
        self.model
    }

    /// Fail with [`ConfigError::UnknownCategory`] unless `label` is known.
    pub fn check_category(&self, label: &str, at: &Provenance) -> Result<(), ConfigError> {
        if self.categories.is_valid(label) {
            Ok(())
        } else {
            Err(ConfigError::UnknownCategory {
                label: label.to_string(),
                at: at.clone(),
            })
        }
    }
}

// ── Build ──────────────────────────────────────────────────────────

/// Context for [`Process::build`](crate::Process::build).
///
/// Holds every registry a process may resolve labels against. Handles
/// obtained here stay valid for the lifetime of the model.
pub struct BuildContext<'a> {
    model: &'a ModelInfo,
    partition: &'a Partition,
    selectivities: &'a Selectivities,
    penalties: &'a Penalties,
    schedule: &'a Schedule,
    process_index: usize,
}

impl<'a> BuildContext<'a> {
    /// Construct a build context for the process at `process_index`.
    pub fn new(
        model: &'a ModelInfo,
        partition: &'a Partition,
        selectivities: &'a Selectivities,
        penalties: &'a Penalties,
        schedule: &'a Schedule,
        process_index: usize,
    ) -> Self {
        Self {
            model,
            partition,
            selectivities,
            penalties,
            schedule,
            process_index,
        }
    }

    /// Model facts.
    pub fn model(&self) -> &ModelInfo {
        self.model
    }

    /// The partition, read-only.
    pub fn partition(&self) -> &Partition {
        self.partition
    }

    /// The resolved annual cycle.
    pub fn schedule(&self) -> &Schedule {
        self.schedule
    }

    /// Time steps in which the process being built executes.
    pub fn active_time_steps(&self) -> Vec<usize> {
        self.schedule.active_time_steps(self.process_index)
    }

    /// Resolve a category label.
    pub fn category_id(&self, label: &str, at: &Provenance) -> Result<CategoryId, ConfigError> {
        self.partition
            .category_id(label)
            .map_err(|_| ConfigError::UnknownCategory {
                label: label.to_string(),
                at: at.clone(),
            })
    }

    /// Resolve a selectivity label.
    pub fn selectivity_id(
        &self,
        label: &str,
        at: &Provenance,
    ) -> Result<SelectivityId, ConfigError> {
        self.selectivities
            .id(label)
            .ok_or_else(|| ConfigError::UnknownSelectivity {
                label: label.to_string(),
                at: at.clone(),
            })
    }

    /// Resolve an optional penalty label; [`NO_PENALTY`] resolves to `None`.
    pub fn penalty_id(&self, label: &str, at: &Provenance) -> Result<Option<PenaltyId>, ConfigError> {
        if label.eq_ignore_ascii_case(NO_PENALTY) {
            return Ok(None);
        }
        self.penalties
            .id(label)
            .map(Some)
            .ok_or_else(|| ConfigError::UnknownPenalty {
                label: label.to_string(),
                at: at.clone(),
            })
    }

    /// Resolve a time step label.
    pub fn time_step_index(&self, label: &str, at: &Provenance) -> Result<usize, ConfigError> {
        self.schedule
            .index_of(label)
            .ok_or_else(|| ConfigError::UnknownTimeStep {
                label: label.to_string(),
                at: at.clone(),
            })
    }
}

// ── Execute ────────────────────────────────────────────────────────

/// Context for [`Process::execute`](crate::Process::execute).
///
/// Borrows are split so a process can hold cached selectivity values
/// while mutating the partition, then record penalties afterwards.
pub struct ExecuteContext<'a> {
    model: &'a ModelInfo,
    partition: &'a mut Partition,
    selectivities: &'a Selectivities,
    penalties: &'a mut Penalties,
    year: u32,
    time_step: usize,
    state: ModelState,
}

impl<'a> ExecuteContext<'a> {
    /// Construct an execute context.
    ///
    /// Typically called by the scheduler, not by processes directly.
    pub fn new(
        model: &'a ModelInfo,
        partition: &'a mut Partition,
        selectivities: &'a Selectivities,
        penalties: &'a mut Penalties,
        year: u32,
        time_step: usize,
        state: ModelState,
    ) -> Self {
        Self {
            model,
            partition,
            selectivities,
            penalties,
            year,
            time_step,
            state,
        }
    }

    /// Model facts.
    pub fn model(&self) -> &ModelInfo {
        self.model
    }

    /// The partition, read-only.
    pub fn partition(&self) -> &Partition {
        self.partition
    }

    /// The partition, mutable.
    pub fn partition_mut(&mut self) -> &mut Partition {
        self.partition
    }

    /// Selectivity registry.
    pub fn selectivities(&self) -> &Selectivities {
        self.selectivities
    }

    /// Penalty recorder.
    pub fn penalties_mut(&mut self) -> &mut Penalties {
        self.penalties
    }

    /// Current year.
    pub fn year(&self) -> u32 {
        self.year
    }

    /// Current time step index.
    pub fn time_step(&self) -> usize {
        self.time_step
    }

    /// Whether the model is initialising or executing modelled years.
    pub fn state(&self) -> ModelState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::penalty::ProcessPenalty;
    use crate::schedule::{validate_schedule, TimeStepDef};
    use cohort_core::{Selectivity, WeightUnits};
    use cohort_partition::CategoryDef;

    struct Flat;

    impl Selectivity for Flat {
        fn age_result(&self, _age: u32) -> f64 {
            1.0
        }
    }

    fn info() -> ModelInfo {
        ModelInfo {
            start_year: 1990,
            final_year: 2000,
            projection_final_year: 2005,
            ages: AgeRange::new(1, 10).unwrap(),
            age_plus: true,
            time_steps: 2,
        }
    }

    #[test]
    fn model_info_year_classification() {
        let m = info();
        assert!(m.is_model_year(1990));
        assert!(!m.is_model_year(2001));
        assert!(m.is_projection_year(2001));
        assert!(!m.is_projection_year(2006));
    }

    #[test]
    fn build_context_resolves_labels() {
        let m = info();
        let mut partition = Partition::new(m.ages, 2, WeightUnits::Tonnes);
        partition
            .add_category(CategoryDef {
                name: "stock".into(),
                ages: m.ages,
                age_length: None,
            })
            .unwrap();
        let mut selectivities = Selectivities::new();
        selectivities.insert("flat", Box::new(Flat)).unwrap();
        let mut penalties = Penalties::new();
        penalties.insert(ProcessPenalty::new("catch")).unwrap();
        let schedule = validate_schedule(
            &[
                TimeStepDef::new("summer", ["mortality"]),
                TimeStepDef::new("winter", Vec::<String>::new()),
            ],
            &["mortality"],
        )
        .unwrap();

        let ctx = BuildContext::new(&m, &partition, &selectivities, &penalties, &schedule, 0);
        let at = Provenance::inline();
        assert_eq!(ctx.category_id("stock", &at), Ok(CategoryId(0)));
        assert!(matches!(
            ctx.category_id("juvenile", &at),
            Err(ConfigError::UnknownCategory { .. })
        ));
        assert_eq!(ctx.selectivity_id("flat", &at), Ok(SelectivityId(0)));
        assert_eq!(ctx.penalty_id("none", &at), Ok(None));
        assert_eq!(ctx.penalty_id("catch", &at), Ok(Some(PenaltyId(0))));
        assert!(ctx.penalty_id("other", &at).is_err());
        assert_eq!(ctx.time_step_index("winter", &at), Ok(1));
        assert_eq!(ctx.active_time_steps(), vec![0]);
    }

    #[test]
    fn validate_context_checks_categories() {
        let m = info();
        let mut partition = Partition::new(m.ages, 1, WeightUnits::Tonnes);
        partition
            .add_category(CategoryDef {
                name: "stock".into(),
                ages: m.ages,
                age_length: None,
            })
            .unwrap();
        let ctx = ValidateContext::new(&m, &partition);
        let at = Provenance::new("model.csl2", 3);
        assert!(ctx.check_category("stock", &at).is_ok());
        assert_eq!(
            ctx.check_category("tagged", &at).unwrap_err().to_string(),
            "category 'tagged' was not found (model.csl2:3)"
        );
    }
}
