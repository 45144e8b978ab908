//! Annual-cycle schedule validation.
//!
//! [`validate_schedule`] runs once while a model is built. It resolves the
//! process labels listed by each time step into process indices so the
//! scheduler's per-year loop never looks up a label.

use indexmap::IndexMap;

use cohort_core::ConfigError;

/// A time step of the annual cycle, as configured.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeStepDef {
    /// Unique time step label.
    pub label: String,
    /// Labels of the processes executed in this time step, in order.
    pub processes: Vec<String>,
}

impl TimeStepDef {
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

/// Resolved annual cycle: per time step, the indices of the processes to
/// execute in declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub struct Schedule {
    labels: IndexMap<String, Vec<usize>>,
}

impl Schedule {
    /// Number of time steps.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the cycle has no time steps.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label of time step `index`.
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get_index(index).map(|(l, _)| l.as_str())
    }

    /// Index of the time step labelled `label`.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.get_index_of(label)
    }

    /// Process indices executed in time step `index`.
    pub fn processes_in(&self, index: usize) -> &[usize] {
        self.labels
            .get_index(index)
            .map(|(_, p)| p.as_slice())
            .unwrap_or(&[])
    }

    /// Time steps in which process `process` executes, ascending.
    pub fn active_time_steps(&self, process: usize) -> Vec<usize> {
        self.labels
            .values()
            .enumerate()
            .filter(|(_, procs)| procs.contains(&process))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Validate the annual cycle and resolve it into a [`Schedule`].
///
/// Checks performed:
///
/// 1. At least one time step is defined.
/// 2. Time step labels are unique.
/// 3. Every listed process label names a defined process.
pub fn validate_schedule(
    time_steps: &[TimeStepDef],
    process_labels: &[&str],
) -> Result<Schedule, ConfigError> {
    // 1. Non-empty.
    if time_steps.is_empty() {
        return Err(ConfigError::InvalidModel {
            reason: "no time steps defined".into(),
        });
    }

    let mut labels = IndexMap::with_capacity(time_steps.len());
    for step in time_steps {
        // 3. Resolve process labels.
        let mut indices = Vec::with_capacity(step.processes.len());
        for label in &step.processes {
            let index = process_labels
                .iter()
                .position(|p| *p == label.as_str())
                .ok_or_else(|| ConfigError::UnknownProcess {
                    label: label.clone(),
                    time_step: step.label.clone(),
                })?;
            indices.push(index);
        }

        // 2. Unique labels.
        if labels.insert(step.label.clone(), indices).is_some() {
            return Err(ConfigError::DuplicateLabel {
                kind: "time step",
                label: step.label.clone(),
            });
        }
    }

    Ok(Schedule { labels })
}
