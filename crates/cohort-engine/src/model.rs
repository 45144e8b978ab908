//! The model: partition, registries and the annual-cycle scheduler.
//!
//! [`Model`] owns everything one evaluation touches. An external driver
//! (estimator, profiler, projection runner) builds it once, then repeats
//! `set_addressable → reset → run` for every evaluation.
//!
//! # Ownership model
//!
//! `Model` is [`Send`] but not shared: every mutating method takes
//! `&mut self`. Independent evaluations run in parallel by building one
//! model per thread; nothing is locked across models.
//!
//! # Scheduling
//!
//! ```text
//! reset ─▶ initialisation phases ─▶ for year in start..=last
//!                                      update mean weights
//!                                      for time step in order
//!                                        for process in order
//!                                          execute, then check partition
//! ```

use std::fmt;
use std::time::Instant;

use cohort_core::{AgeRange, ConfigError, ModelState, RunMode};
use cohort_partition::{AgeLengths, CategoryDef, Partition};
use cohort_process::{
    validate_schedule, AddressablePath, BuildContext, ExecuteContext, ModelInfo, Penalties,
    Process, ProcessPenalty, Schedule, Selectivities, TimeStepDef, ValidateContext,
};
use cohort_processes::ProcessKind;

use crate::config::{AddressableTarget, InitialisationPhaseConfig, ModelConfig};
use crate::error::{ModelError, ModelPhase};
use crate::metrics::RunSummary;

// Compile-time assertion: Model is Send, so whole models can be moved
// into worker threads.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<Model>();
    }
};

// ── Model ──────────────────────────────────────────────────────────

/// A validated, built population model.
///
/// # Example
///
/// ```ignore
/// let mut model = Model::new(config)?;
/// for candidate in candidates {
///     model.set_addressable("process[recruitment].r0", candidate)?;
///     model.reset()?;
///     let summary = model.run(RunMode::Estimation)?;
///     objective += summary.penalty_score;
/// }
/// ```
pub struct Model {
    info: ModelInfo,
    partition: Partition,
    age_lengths: AgeLengths,
    selectivities: Selectivities,
    penalties: Penalties,
    schedule: Schedule,
    processes: Vec<ProcessKind>,
    initialisation: Vec<InitialisationPhaseConfig>,
    targets: Vec<AddressableTarget>,
    phase: ModelPhase,
}

impl Model {
    /// Validate `config` and build every process.
    ///
    /// Runs [`ModelConfig::validate`], creates the partition and the
    /// registries, resolves the annual cycle, then validates and builds
    /// each process in declaration order. Finally every addressable
    /// target is checked against its usage flags.
    pub fn new(config: ModelConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let ModelConfig {
            start_year,
            final_year,
            projection_final_year,
            min_age,
            max_age,
            age_plus,
            base_weight_units,
            time_steps,
            categories,
            initialisation_phases,
            mut processes,
            selectivities: selectivity_defs,
            age_lengths: age_length_defs,
            penalties: penalty_defs,
            addressable_targets,
        } = config;

        let ages = AgeRange::new(min_age, max_age).ok_or_else(|| ConfigError::InvalidModel {
            reason: format!("min_age ({min_age}) is greater than max_age ({max_age})"),
        })?;
        let info = ModelInfo {
            start_year,
            final_year,
            projection_final_year: projection_final_year.unwrap_or(final_year),
            ages,
            age_plus,
            time_steps: time_steps.len(),
        };

        let mut age_lengths = AgeLengths::new();
        for (label, age_length) in age_length_defs {
            age_lengths.insert(label, age_length)?;
        }

        let mut partition = Partition::new(ages, time_steps.len(), base_weight_units);
        for category in &categories {
            let age_length = match &category.age_length {
                Some(label) => Some(age_lengths.id(label).ok_or_else(|| {
                    ConfigError::UnknownAgeLength {
                        label: label.clone(),
                    }
                })?),
                None => None,
            };
            let range = category
                .age_range(ages)
                .ok_or_else(|| ConfigError::InvalidModel {
                    reason: format!("category '{}' has an empty age range", category.name),
                })?;
            partition.add_category(CategoryDef {
                name: category.name.clone(),
                ages: range,
                age_length,
            })?;
        }

        let mut selectivities = Selectivities::new();
        for (label, selectivity) in selectivity_defs {
            selectivities.insert(label, selectivity)?;
        }

        let mut penalties = Penalties::new();
        for def in penalty_defs {
            penalties.insert(
                ProcessPenalty::new(def.label)
                    .log_scale(def.log_scale)
                    .multiplier(def.multiplier),
            )?;
        }

        let defs: Vec<TimeStepDef> = time_steps
            .into_iter()
            .map(|step| TimeStepDef {
                label: step.label,
                processes: step.processes,
            })
            .collect();
        let labels: Vec<&str> = processes.iter().map(|p| p.label()).collect();
        let schedule = validate_schedule(&defs, &labels)?;

        for (index, process) in processes.iter().enumerate() {
            if schedule.active_time_steps(index).is_empty() {
                tracing::warn!(
                    process = process.label(),
                    "process is not executed in any time step"
                );
            }
        }

        let validate_ctx = ValidateContext::new(&info, &partition);
        for process in &mut processes {
            process.validate(&validate_ctx)?;
        }
        for (index, process) in processes.iter_mut().enumerate() {
            let ctx = BuildContext::new(
                &info,
                &partition,
                &selectivities,
                &penalties,
                &schedule,
                index,
            );
            process.build(&ctx)?;
            tracing::debug!(
                process = process.label(),
                type_name = process.type_name(),
                "process built"
            );
        }

        for target in &addressable_targets {
            let path = AddressablePath::parse(&target.path)?;
            let process = processes
                .iter()
                .find(|p| p.label() == path.process)
                .ok_or_else(|| ConfigError::InvalidModel {
                    reason: format!(
                        "addressable target '{}' names unknown process '{}'",
                        target.path, path.process
                    ),
                })?;
            let usage = process.addressables().usage(&path.addressable)?;
            if !usage.permits(target.mode) {
                return Err(ConfigError::UsageNotPermitted {
                    addressable: target.path.clone(),
                    mode: target.mode,
                });
            }
        }

        tracing::info!(
            start_year,
            final_year,
            projection_final_year = info.projection_final_year,
            categories = partition.len(),
            processes = processes.len(),
            time_steps = schedule.len(),
            "model built"
        );

        Ok(Self {
            info,
            partition,
            age_lengths,
            selectivities,
            penalties,
            schedule,
            processes,
            initialisation: initialisation_phases,
            targets: addressable_targets,
            phase: ModelPhase::Built,
        })
    }

    /// Prepare a fresh evaluation.
    ///
    /// Zeroes the partition, clears penalty records, and resets every
    /// process so it re-reads its inputs from its addressables.
    pub fn reset(&mut self) -> Result<(), ModelError> {
        self.partition.reset();
        self.penalties.clear();
        for process in &mut self.processes {
            if let Err(source) = process.reset() {
                self.phase = ModelPhase::Failed;
                return Err(ModelError::Reset {
                    process: process.label().to_string(),
                    source,
                });
            }
        }
        self.phase = ModelPhase::Reset;
        tracing::debug!("model reset");
        Ok(())
    }

    /// Run one evaluation from the reset state.
    ///
    /// Executes the initialisation phases, then every model year. In
    /// [`RunMode::Projection`] the years continue to the projection final
    /// year.
    ///
    /// # Errors
    ///
    /// [`ModelError::Lifecycle`] unless the model was reset since the
    /// last run. Any process failure or invalid partition aborts the
    /// evaluation; the model must be reset before running again.
    pub fn run(&mut self, mode: RunMode) -> Result<RunSummary, ModelError> {
        let last_year = match mode {
            RunMode::Projection => self.info.projection_final_year,
            _ => self.info.final_year,
        };
        self.require(ModelPhase::Reset)?;

        let started = Instant::now();
        let mut summary = RunSummary::new(mode, self.info.start_year, last_year);
        let mut timings = vec![0u64; self.processes.len()];
        let result = self.execute(last_year, &mut summary, &mut timings);
        self.phase = if result.is_ok() {
            ModelPhase::Executed
        } else {
            ModelPhase::Failed
        };
        result?;

        summary.total_us = started.elapsed().as_micros() as u64;
        summary.process_us = self
            .processes
            .iter()
            .map(|p| p.label().to_string())
            .zip(timings)
            .collect();
        summary.penalty_triggers = self.penalties.trigger_count();
        summary.penalty_score = self.penalties.total_score();

        tracing::info!(
            mode = %mode,
            first_year = summary.first_year,
            last_year = summary.last_year,
            total_us = summary.total_us,
            penalty_triggers = summary.penalty_triggers,
            penalty_score = summary.penalty_score,
            "evaluation complete"
        );
        Ok(summary)
    }

    /// Run one evaluation through the projection years.
    pub fn run_projection(&mut self) -> Result<RunSummary, ModelError> {
        self.run(RunMode::Projection)
    }

    /// Reset, then run.
    pub fn evaluate(&mut self, mode: RunMode) -> Result<RunSummary, ModelError> {
        self.reset()?;
        self.run(mode)
    }

    fn require(&self, expected: ModelPhase) -> Result<(), ModelError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(ModelError::Lifecycle {
                expected,
                actual: self.phase,
            })
        }
    }

    fn execute(
        &mut self,
        last_year: u32,
        summary: &mut RunSummary,
        timings: &mut [u64],
    ) -> Result<(), ModelError> {
        let started = Instant::now();
        let start_year = self.info.start_year;
        for phase in &self.initialisation {
            let wrap = |source: ModelError| ModelError::Initialisation {
                phase: phase.label().to_string(),
                source: Box::new(source),
            };
            match phase {
                InitialisationPhaseConfig::Iterative { years, .. } => {
                    self.partition
                        .update_mean_weights(start_year, &self.age_lengths);
                    let mut cycle = Cycle {
                        info: &self.info,
                        schedule: &self.schedule,
                        processes: &mut self.processes,
                        partition: &mut self.partition,
                        selectivities: &self.selectivities,
                        penalties: &mut self.penalties,
                        timings: &mut *timings,
                    };
                    for _ in 0..*years {
                        cycle
                            .run_year(start_year, ModelState::Initialise)
                            .map_err(wrap)?;
                    }
                    summary.initialisation_years += years;
                }
                InitialisationPhaseConfig::StateByAge { values, .. } => {
                    for (name, numbers) in values {
                        self.partition
                            .category_mut(name)
                            .and_then(|c| c.set_numbers_at_age(numbers))
                            .map_err(|e| wrap(e.into()))?;
                    }
                }
            }
            tracing::debug!(phase = phase.label(), "initialisation phase complete");
        }
        summary.initialisation_us = started.elapsed().as_micros() as u64;

        for year in start_year..=last_year {
            self.partition.update_mean_weights(year, &self.age_lengths);
            let mut cycle = Cycle {
                info: &self.info,
                schedule: &self.schedule,
                processes: &mut self.processes,
                partition: &mut self.partition,
                selectivities: &self.selectivities,
                penalties: &mut self.penalties,
                timings: &mut *timings,
            };
            cycle.run_year(year, ModelState::Execute)?;
            tracing::trace!(year, total = self.partition.total(), "year complete");
        }
        Ok(())
    }

    // ── Addressables ───────────────────────────────────────────────

    /// Read an addressable by model path,
    /// `process[<label>].<addressable>{<index>}`.
    pub fn addressable(&self, path: &str) -> Result<f64, ModelError> {
        let path = AddressablePath::parse(path)?;
        let process = self.find(&path.process)?;
        Ok(process
            .addressables()
            .value(&path.addressable, path.index.as_deref())?)
    }

    /// Write an addressable by model path. Takes effect at the next
    /// [`reset`](Model::reset).
    pub fn set_addressable(&mut self, path: &str, value: f64) -> Result<(), ModelError> {
        let parsed = AddressablePath::parse(path)?;
        let index = self
            .processes
            .iter()
            .position(|p| p.label() == parsed.process)
            .ok_or_else(|| ModelError::UnknownProcess {
                label: parsed.process.clone(),
            })?;
        self.processes[index].addressables_mut().set_value(
            &parsed.addressable,
            parsed.index.as_deref(),
            value,
        )?;
        tracing::debug!(path, value, "addressable set");
        Ok(())
    }

    /// Addressable targets accepted at build time.
    pub fn addressable_targets(&self) -> &[AddressableTarget] {
        &self.targets
    }

    // ── Accessors ──────────────────────────────────────────────────

    fn find(&self, label: &str) -> Result<&ProcessKind, ModelError> {
        self.process(label).ok_or_else(|| ModelError::UnknownProcess {
            label: label.to_string(),
        })
    }

    /// The process labelled `label`.
    pub fn process(&self, label: &str) -> Option<&ProcessKind> {
        self.processes.iter().find(|p| p.label() == label)
    }

    /// Every process in declaration order.
    pub fn processes(&self) -> &[ProcessKind] {
        &self.processes
    }

    /// The population state after the last run.
    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Penalty records of the last run.
    pub fn penalties(&self) -> &Penalties {
        &self.penalties
    }

    /// Static model facts.
    pub fn info(&self) -> &ModelInfo {
        &self.info
    }

    /// The resolved annual cycle.
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> ModelPhase {
        self.phase
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("info", &self.info)
            .field("categories", &self.partition.len())
            .field("processes", &self.processes.len())
            .field("time_steps", &self.schedule.len())
            .field("phase", &self.phase)
            .finish()
    }
}

// ── Cycle ──────────────────────────────────────────────────────────

/// Split borrow of the model for running annual cycles.
struct Cycle<'m> {
    info: &'m ModelInfo,
    schedule: &'m Schedule,
    processes: &'m mut [ProcessKind],
    partition: &'m mut Partition,
    selectivities: &'m Selectivities,
    penalties: &'m mut Penalties,
    timings: &'m mut [u64],
}

impl Cycle<'_> {
    fn run_year(&mut self, year: u32, state: ModelState) -> Result<(), ModelError> {
        for time_step in 0..self.schedule.len() {
            for &index in self.schedule.processes_in(time_step) {
                let Some(process) = self.processes.get_mut(index) else {
                    continue;
                };
                let started = Instant::now();
                let result = {
                    let mut ctx = ExecuteContext::new(
                        self.info,
                        self.partition,
                        self.selectivities,
                        self.penalties,
                        year,
                        time_step,
                        state,
                    );
                    process.execute(&mut ctx)
                };
                if let Some(slot) = self.timings.get_mut(index) {
                    *slot += started.elapsed().as_micros() as u64;
                }
                result
                    .and_then(|()| self.partition.check_non_negative())
                    .map_err(|source| ModelError::Execution {
                        year,
                        time_step: self.schedule.label(time_step).unwrap_or_default().to_string(),
                        process: process.label().to_string(),
                        source,
                    })?;
            }
        }
        Ok(())
    }
}
