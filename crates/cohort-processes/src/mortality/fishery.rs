//! Fisheries, their category bindings and per-year reports.

use std::collections::BTreeMap;

use smallvec::SmallVec;

use cohort_core::{AgeRange, CategoryId, PenaltyId, Provenance, SelectivityId};

/// Per-year quantities recorded for one fishery.
///
/// Maps grow as years execute and are cleared on reset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FisheryReport {
    /// Total catch requested. For retained-catch fisheries this is the
    /// retained catch scaled up by total over retained vulnerability.
    pub catches: BTreeMap<u32, f64>,
    /// Total catch actually removed.
    pub actual_catches: BTreeMap<u32, f64>,
    /// Retained catch requested (retained-catch fisheries only).
    pub retained_catches: BTreeMap<u32, f64>,
    /// Retained catch actually landed (retained-catch fisheries only).
    pub actual_retained_catches: BTreeMap<u32, f64>,
    /// Catch minus retained catch (retained-catch fisheries only).
    pub discards: BTreeMap<u32, f64>,
    /// Discards that die, in catch units (retained-catch fisheries only).
    pub discards_dead: BTreeMap<u32, f64>,
    /// Exploitation rate after any rescaling.
    pub exploitation_by_year: BTreeMap<u32, f64>,
    /// Maximum combined per-age exploitation before rescaling.
    pub uobs_by_year: BTreeMap<u32, f64>,
}

impl FisheryReport {
    fn clear(&mut self) {
        self.catches.clear();
        self.actual_catches.clear();
        self.retained_catches.clear();
        self.actual_retained_catches.clear();
        self.discards.clear();
        self.discards_dead.clear();
        self.exploitation_by_year.clear();
        self.uobs_by_year.clear();
    }
}

/// One named catch-removal mechanism.
#[derive(Clone, Debug)]
pub struct Fishery {
    pub(crate) label: String,
    pub(crate) time_step_label: String,
    pub(crate) time_step: usize,
    pub(crate) u_max: f64,
    pub(crate) penalty_label: String,
    pub(crate) penalty: Option<PenaltyId>,
    pub(crate) initialisation: bool,
    pub(crate) at: Provenance,
    /// Catch inputs by year, copied from the addressable on reset.
    pub(crate) inputs: BTreeMap<u32, f64>,
    /// Bindings (indices into the process's binding list) of this fishery.
    pub(crate) bindings: SmallVec<[usize; 4]>,
    pub(crate) vulnerability: f64,
    pub(crate) retained_vulnerability: f64,
    /// Total catch target of the current execution.
    pub(crate) catch: f64,
    pub(crate) exploitation: f64,
    pub(crate) uobs: f64,
    pub(crate) report: FisheryReport,
}

impl Fishery {
    pub(crate) fn new(
        label: String,
        time_step_label: String,
        u_max: f64,
        penalty_label: String,
        initialisation: bool,
        at: Provenance,
    ) -> Self {
        Self {
            label,
            time_step_label,
            time_step: 0,
            u_max,
            penalty_label,
            penalty: None,
            initialisation,
            at,
            inputs: BTreeMap::new(),
            bindings: SmallVec::new(),
            vulnerability: 0.0,
            retained_vulnerability: 0.0,
            catch: 0.0,
            exploitation: 0.0,
            uobs: 0.0,
            report: FisheryReport::default(),
        }
    }

    /// Fishery label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Label of the time step the fishery operates in.
    pub fn time_step_label(&self) -> &str {
        &self.time_step_label
    }

    /// Index of the time step the fishery operates in.
    pub fn time_step(&self) -> usize {
        self.time_step
    }

    /// Maximum permitted exploitation rate.
    pub fn u_max(&self) -> f64 {
        self.u_max
    }

    /// Whether the fishery also operates during initialisation phases.
    pub fn applies_in_initialisation(&self) -> bool {
        self.initialisation
    }

    /// Bound penalty, if any.
    pub fn penalty(&self) -> Option<PenaltyId> {
        self.penalty
    }

    /// Vulnerable population in the most recent execution.
    pub fn vulnerability(&self) -> f64 {
        self.vulnerability
    }

    /// Retained vulnerable population in the most recent execution.
    pub fn retained_vulnerability(&self) -> f64 {
        self.retained_vulnerability
    }

    /// Exploitation rate in the most recent execution.
    pub fn exploitation(&self) -> f64 {
        self.exploitation
    }

    /// Maximum combined per-age exploitation in the most recent execution.
    pub fn uobs(&self) -> f64 {
        self.uobs
    }

    /// Catch input for `year` (retained catch for retained fisheries).
    pub fn catch_input(&self, year: u32) -> Option<f64> {
        self.inputs.get(&year).copied()
    }

    /// Per-year report.
    pub fn report(&self) -> &FisheryReport {
        &self.report
    }

    pub(crate) fn reset(&mut self) {
        self.vulnerability = 0.0;
        self.retained_vulnerability = 0.0;
        self.catch = 0.0;
        self.exploitation = 0.0;
        self.uobs = 0.0;
        self.report.clear();
    }
}

/// Units of the catch inputs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CatchUnits {
    /// Catches are numbers of fish.
    #[default]
    Abundance,
    /// Catches are weights in the partition's base units.
    Biomass,
}

/// Natural-mortality state for one category of the process.
#[derive(Clone, Debug)]
pub(crate) struct CategoryMortality {
    pub(crate) label: String,
    pub(crate) id: CategoryId,
    pub(crate) ages: AgeRange,
    pub(crate) m: f64,
    pub(crate) relm_label: String,
    pub(crate) relm: SelectivityId,
    pub(crate) relm_values: Vec<f64>,
    pub(crate) exp_half_m: Vec<f64>,
    /// Combined exploitation at age over every active fishery.
    pub(crate) exploitation: Vec<f64>,
}

impl CategoryMortality {
    pub(crate) fn new(label: String, m: f64, relm_label: String) -> Self {
        Self {
            label,
            id: CategoryId(0),
            ages: AgeRange { min: 0, max: 0 },
            m,
            relm_label,
            relm: SelectivityId(0),
            relm_values: Vec::new(),
            exp_half_m: Vec::new(),
            exploitation: Vec::new(),
        }
    }

    pub(crate) fn allocate(&mut self, id: CategoryId, ages: AgeRange, relm: SelectivityId) {
        let spread = ages.spread();
        self.id = id;
        self.ages = ages;
        self.relm = relm;
        self.relm_values = vec![0.0; spread];
        self.exp_half_m = vec![1.0; spread];
        self.exploitation = vec![0.0; spread];
    }
}

/// Retention inputs of a binding in the retained-catch variant.
#[derive(Clone, Debug)]
pub(crate) struct Retention {
    pub(crate) retained_label: String,
    pub(crate) discard_mortality_label: String,
    pub(crate) retained: SelectivityId,
    pub(crate) discard_mortality: SelectivityId,
    pub(crate) retained_values: Vec<f64>,
    pub(crate) discard_mortality_values: Vec<f64>,
}

/// One (fishery, category, selectivity) binding.
#[derive(Clone, Debug)]
pub(crate) struct FisheryBinding {
    pub(crate) fishery: usize,
    pub(crate) category: usize,
    pub(crate) selectivity_label: String,
    pub(crate) selectivity: SelectivityId,
    pub(crate) retention: Option<Retention>,
    pub(crate) at: Provenance,
    pub(crate) selectivity_values: Vec<f64>,
    /// Per-age share of the fishery's exploitation that dies: the
    /// selectivity, times `retained + discard_mortality · (1 − retained)`
    /// when retention applies.
    pub(crate) removal_values: Vec<f64>,
    /// Per-age weight multiplier for vulnerability: mean weight when catches
    /// are biomass, one when they are numbers.
    pub(crate) weights: Vec<f64>,
}

impl FisheryBinding {
    pub(crate) fn allocate(&mut self, spread: usize) {
        self.selectivity_values = vec![0.0; spread];
        self.removal_values = vec![0.0; spread];
        self.weights = vec![1.0; spread];
        if let Some(retention) = &mut self.retention {
            retention.retained_values = vec![0.0; spread];
            retention.discard_mortality_values = vec![0.0; spread];
        }
    }
}
