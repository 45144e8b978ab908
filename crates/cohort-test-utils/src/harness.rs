//! Drive a single process through validate, build, reset and execute.

use cohort_core::{
    AgeLength, AgeRange, CategoryId, ConfigError, ExecutionError, ModelState, Selectivity,
    WeightUnits,
};
use cohort_partition::{AgeLengths, CategoryDef, Partition};
use cohort_process::{
    validate_schedule, BuildContext, ExecuteContext, ModelInfo, Penalties, Process,
    ProcessPenalty, Selectivities, TimeStepDef, ValidateContext,
};

/// Minimal model scaffold around one process under test.
///
/// The process is the only process of the model. By default the annual
/// cycle is a single time step `step_one` that runs it.
pub struct ProcessHarness {
    pub info: ModelInfo,
    pub partition: Partition,
    pub selectivities: Selectivities,
    pub penalties: Penalties,
    pub age_lengths: AgeLengths,
    time_steps: Vec<(String, bool)>,
}

impl ProcessHarness {
    /// A one-time-step model over `start_year..=final_year` and `ages` with a
    /// plus group.
    pub fn new(start_year: u32, final_year: u32, ages: AgeRange) -> Self {
        let info = ModelInfo {
            start_year,
            final_year,
            projection_final_year: final_year,
            ages,
            age_plus: true,
            time_steps: 1,
        };
        Self {
            info,
            partition: Partition::new(ages, 1, WeightUnits::Tonnes),
            selectivities: Selectivities::new(),
            penalties: Penalties::new(),
            age_lengths: AgeLengths::new(),
            time_steps: vec![("step_one".to_string(), true)],
        }
    }

    /// Replace the annual cycle. Must be called before adding categories.
    ///
    /// Each entry is a time step label and whether the process under test
    /// runs in it.
    pub fn with_time_steps(mut self, steps: &[(&str, bool)]) -> Self {
        self.info.time_steps = steps.len();
        self.partition = Partition::new(self.info.ages, steps.len(), WeightUnits::Tonnes);
        self.time_steps = steps
            .iter()
            .map(|(label, active)| ((*label).to_string(), *active))
            .collect();
        self
    }

    pub fn with_age_plus(mut self, age_plus: bool) -> Self {
        self.info.age_plus = age_plus;
        self
    }

    pub fn with_projection_to(mut self, year: u32) -> Self {
        self.info.projection_final_year = year;
        self
    }

    pub fn add_category(
        &mut self,
        name: &str,
        ages: AgeRange,
        age_length: Option<&str>,
    ) -> CategoryId {
        let age_length = age_length.and_then(|l| self.age_lengths.id(l));
        self.partition
            .add_category(CategoryDef {
                name: name.to_string(),
                ages,
                age_length,
            })
            .expect("category")
    }

    pub fn add_selectivity(&mut self, label: &str, selectivity: impl Selectivity) {
        self.selectivities
            .insert(label, Box::new(selectivity))
            .expect("selectivity");
    }

    pub fn add_age_length(&mut self, label: &str, age_length: impl AgeLength) {
        self.age_lengths
            .insert(label, Box::new(age_length))
            .expect("age length");
    }

    pub fn add_penalty(&mut self, penalty: ProcessPenalty) {
        self.penalties.insert(penalty).expect("penalty");
    }

    pub fn set_numbers(&mut self, category: &str, values: &[f64]) {
        self.partition
            .category_mut(category)
            .expect("category")
            .set_numbers_at_age(values)
            .expect("numbers");
    }

    pub fn numbers(&self, category: &str) -> &[f64] {
        self.partition
            .category(category)
            .expect("category")
            .numbers_at_age()
    }

    /// Run validate and build.
    pub fn prepare(&mut self, process: &mut dyn Process) -> Result<(), ConfigError> {
        let label = process.label().to_string();
        let time_steps: Vec<TimeStepDef> = self
            .time_steps
            .iter()
            .map(|(step, active)| {
                let processes = if *active { vec![label.clone()] } else { Vec::new() };
                TimeStepDef::new(step.clone(), processes)
            })
            .collect();
        process.validate(&ValidateContext::new(&self.info, &self.partition))?;
        let schedule = validate_schedule(&time_steps, &[label.as_str()])?;
        process.build(&BuildContext::new(
            &self.info,
            &self.partition,
            &self.selectivities,
            &self.penalties,
            &schedule,
            0,
        ))
    }

    /// Clear the partition and every penalty record, then reset `process`.
    pub fn reset(&mut self, process: &mut dyn Process) -> Result<(), ExecutionError> {
        self.partition.reset();
        self.penalties.clear();
        process.reset()
    }

    /// Recompute mean weights for `year`.
    pub fn update_mean_weights(&mut self, year: u32) {
        self.partition.update_mean_weights(year, &self.age_lengths);
    }

    /// Execute once at (`year`, `time_step`) in the execute state.
    pub fn execute(
        &mut self,
        process: &mut dyn Process,
        year: u32,
        time_step: usize,
    ) -> Result<(), ExecutionError> {
        self.execute_in(process, year, time_step, ModelState::Execute)
    }

    /// Execute once in `state`.
    pub fn execute_in(
        &mut self,
        process: &mut dyn Process,
        year: u32,
        time_step: usize,
        state: ModelState,
    ) -> Result<(), ExecutionError> {
        let mut ctx = ExecuteContext::new(
            &self.info,
            &mut self.partition,
            &self.selectivities,
            &mut self.penalties,
            year,
            time_step,
            state,
        );
        process.execute(&mut ctx)
    }
}
