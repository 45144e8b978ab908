//! Per-evaluation summary returned by [`Model::run`](crate::Model::run).

use cohort_core::RunMode;

/// Timing and penalty totals collected during one evaluation.
///
/// All durations are in microseconds.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    /// Mode the evaluation ran in.
    pub mode: RunMode,
    /// First executed year.
    pub first_year: u32,
    /// Last executed year (the projection year for projections).
    pub last_year: u32,
    /// Annual cycles run by iterative initialisation phases.
    pub initialisation_years: u32,
    /// Wall-clock time for the whole evaluation.
    pub total_us: u64,
    /// Time spent in initialisation phases.
    pub initialisation_us: u64,
    /// Per-process execution time: `(label, microseconds)`, in declaration
    /// order.
    pub process_us: Vec<(String, u64)>,
    /// Process penalty records triggered.
    pub penalty_triggers: usize,
    /// Sum of every penalty score.
    pub penalty_score: f64,
}

impl RunSummary {
    pub(crate) fn new(mode: RunMode, first_year: u32, last_year: u32) -> Self {
        Self {
            mode,
            first_year,
            last_year,
            initialisation_years: 0,
            total_us: 0,
            initialisation_us: 0,
            process_us: Vec::new(),
            penalty_triggers: 0,
            penalty_score: 0.0,
        }
    }

    /// Number of model (and projection) years executed.
    pub fn years(&self) -> u32 {
        self.last_year - self.first_year + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_summary_is_zero() {
        let s = RunSummary::new(RunMode::Basic, 1990, 2010);
        assert_eq!(s.years(), 21);
        assert_eq!(s.total_us, 0);
        assert!(s.process_us.is_empty());
        assert_eq!(s.penalty_triggers, 0);
        assert_eq!(s.penalty_score, 0.0);
    }
}
