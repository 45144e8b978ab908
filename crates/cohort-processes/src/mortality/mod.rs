//! Instantaneous natural and fishing mortality with catch allocation.
//!
//! Each execution applies half of the time step's natural mortality,
//! removes the configured catch of every fishery active in the time step,
//! then applies the other half:
//!
//! ```text
//! N' = N · exp(−½·ratio·M·relm)² · (1 − Σ_f U_f · s_f)
//! ```
//!
//! A fishery's exploitation rate `U_f` is its catch over its vulnerable
//! population. When the combined rate at any age of a category it fishes
//! exceeds the fishery's `u_max`, `U_f` is scaled down so that fishery
//! takes at most `u_max`, the shortfall is reported to the fishery's
//! penalty, and execution carries on.
//!
//! Built with [`MortalityInstantaneous::builder`].

mod fishery;
mod report;
mod tables;

use std::collections::BTreeSet;

use indexmap::IndexMap;

use cohort_core::math::{is_one, zero_fun};
use cohort_core::{
    AddressableError, ConfigError, ExecutionError, ModelState, Provenance, SelectivityId, Table,
    Usage,
};
use cohort_process::{
    Addressable, AddressableRegistry, BuildContext, ExecuteContext, Process, ValidateContext,
};

pub use fishery::{CatchUnits, Fishery, FisheryReport};
pub use report::Removals;

use fishery::{CategoryMortality, FisheryBinding, Retention};
use tables::{read_catches, read_methods, MethodRow};

/// Addressable label of the natural mortality rates.
pub const ADDRESSABLE_M: &str = "m";
/// Addressable label of the time step proportions.
pub const ADDRESSABLE_TIME_STEP_PROPORTIONS: &str = "time_step_proportions";

/// Addressable label holding the catches of `fishery`.
pub fn catch_addressable(fishery: &str) -> String {
    format!("method_{}", fishery.to_lowercase())
}

/// Instantaneous mortality process.
///
/// See the [module documentation](self) for the equations.
#[derive(Debug)]
pub struct MortalityInstantaneous {
    label: String,
    category_labels: Vec<String>,
    m_input: Vec<f64>,
    relm_labels: Vec<String>,
    proportions_input: Vec<f64>,
    units: CatchUnits,
    retained: bool,
    catches_table: Table,
    method_table: Table,

    categories: Vec<CategoryMortality>,
    fisheries: IndexMap<String, Fishery>,
    bindings: Vec<FisheryBinding>,
    catch_years: BTreeSet<u32>,
    active_time_steps: Vec<usize>,
    ratios: Vec<f64>,
    removals: Removals,
    retained_removals: Removals,
    discard_removals: Removals,
    addressables: AddressableRegistry,
}

/// Builder for [`MortalityInstantaneous`].
///
/// Required: at least one category, `m`, `relative_m_by_age`, and both
/// tables. `m` and `relative_m_by_age` may hold a single value that is
/// applied to every category.
#[derive(Clone, Debug)]
pub struct MortalityInstantaneousBuilder {
    label: String,
    categories: Vec<String>,
    m: Vec<f64>,
    relative_m_by_age: Vec<String>,
    time_step_proportions: Vec<f64>,
    units: CatchUnits,
    retained: bool,
    catches: Option<Table>,
    method: Option<Table>,
}

impl MortalityInstantaneousBuilder {
    /// Categories subject to natural mortality, in order.
    pub fn categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Natural mortality rate per category, or one rate for all.
    pub fn m(mut self, m: impl IntoIterator<Item = f64>) -> Self {
        self.m = m.into_iter().collect();
        self
    }

    /// Relative M at age selectivity per category, or one for all.
    pub fn relative_m_by_age<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relative_m_by_age = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Share of the annual M applied in each time step the process runs
    /// in. May be omitted when it runs in exactly one time step.
    pub fn time_step_proportions(mut self, proportions: impl IntoIterator<Item = f64>) -> Self {
        self.time_step_proportions = proportions.into_iter().collect();
        self
    }

    /// Whether catches are biomass (`true`) or numbers (`false`, default).
    pub fn biomass(mut self, biomass: bool) -> Self {
        self.units = if biomass {
            CatchUnits::Biomass
        } else {
            CatchUnits::Abundance
        };
        self
    }

    /// Whether catches are retained catches with discarding.
    pub fn retained(mut self, retained: bool) -> Self {
        self.retained = retained;
        self
    }

    /// The `catches` table: a `year` column plus one column per fishery.
    pub fn catches(mut self, table: Table) -> Self {
        self.catches = Some(table);
        self
    }

    /// The `method` table: one row per fishery and category list.
    pub fn method(mut self, table: Table) -> Self {
        self.method = Some(table);
        self
    }

    /// Check the inputs that do not depend on the model and build.
    pub fn build(self) -> Result<MortalityInstantaneous, ConfigError> {
        let at = Provenance::inline();
        if self.label.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                parameter: "label".into(),
                value: self.label,
                reason: "must not be empty".into(),
                at,
            });
        }
        if self.categories.is_empty() {
            return Err(ConfigError::InvalidValue {
                parameter: "categories".into(),
                value: String::new(),
                reason: "at least one category is required".into(),
                at,
            });
        }
        for (i, category) in self.categories.iter().enumerate() {
            if self.categories[..i].contains(category) {
                return Err(ConfigError::DuplicateLabel {
                    kind: "mortality category",
                    label: category.clone(),
                });
            }
        }
        let n = self.categories.len();
        let m = broadcast(self.m, n, "m", &at)?;
        if let Some(bad) = m.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(ConfigError::InvalidValue {
                parameter: "m".into(),
                value: bad.to_string(),
                reason: "must be finite and non-negative".into(),
                at,
            });
        }
        let relm_labels = broadcast(self.relative_m_by_age, n, "relative_m_by_age", &at)?;
        let catches_table = self.catches.ok_or_else(|| missing_table("catches"))?;
        let method_table = self.method.ok_or_else(|| missing_table("method"))?;

        Ok(MortalityInstantaneous {
            label: self.label,
            category_labels: self.categories,
            m_input: m,
            relm_labels,
            proportions_input: self.time_step_proportions,
            units: self.units,
            retained: self.retained,
            catches_table,
            method_table,
            categories: Vec::new(),
            fisheries: IndexMap::new(),
            bindings: Vec::new(),
            catch_years: BTreeSet::new(),
            active_time_steps: Vec::new(),
            ratios: Vec::new(),
            removals: Removals::default(),
            retained_removals: Removals::default(),
            discard_removals: Removals::default(),
            addressables: AddressableRegistry::new(),
        })
    }
}

fn broadcast<T: Clone>(
    values: Vec<T>,
    n: usize,
    parameter: &str,
    at: &Provenance,
) -> Result<Vec<T>, ConfigError> {
    match values.len() {
        len if len == n => Ok(values),
        1 => Ok(vec![values[0].clone(); n]),
        len => Err(ConfigError::LengthMismatch {
            parameter: parameter.into(),
            expected: n,
            actual: len,
            at: at.clone(),
        }),
    }
}

fn missing_table(name: &str) -> ConfigError {
    ConfigError::InvalidValue {
        parameter: name.into(),
        value: String::new(),
        reason: "a table is required".into(),
        at: Provenance::inline(),
    }
}

/// Whether `fishery` removes catch in this execution.
fn fishes(fishery: &Fishery, time_step: usize, initialising: bool) -> bool {
    fishery.time_step == time_step && (!initialising || fishery.initialisation)
}

impl MortalityInstantaneous {
    /// Create a builder for a process labelled `label`.
    pub fn builder(label: impl Into<String>) -> MortalityInstantaneousBuilder {
        MortalityInstantaneousBuilder {
            label: label.into(),
            categories: Vec::new(),
            m: Vec::new(),
            relative_m_by_age: Vec::new(),
            time_step_proportions: Vec::new(),
            units: CatchUnits::Abundance,
            retained: false,
            catches: None,
            method: None,
        }
    }

    /// Whether catches are retained catches.
    pub fn is_retained(&self) -> bool {
        self.retained
    }

    /// Units of the catch inputs.
    pub fn catch_units(&self) -> CatchUnits {
        self.units
    }

    /// Labels of the categories the process applies to.
    pub fn category_labels(&self) -> &[String] {
        &self.category_labels
    }

    /// Current natural mortality rate of `category`.
    pub fn m(&self, category: &str) -> Option<f64> {
        self.categories
            .iter()
            .find(|c| c.label == category)
            .map(|c| c.m)
    }

    /// Share of M applied in `time_step`; zero where the process is idle.
    pub fn time_step_ratio(&self, time_step: usize) -> f64 {
        self.ratios.get(time_step).copied().unwrap_or(0.0)
    }

    /// Years present in the catches table, ascending.
    pub fn catch_years(&self) -> impl Iterator<Item = u32> + '_ {
        self.catch_years.iter().copied()
    }

    /// Fishery labels in declaration order.
    pub fn fishery_labels(&self) -> impl Iterator<Item = &str> {
        self.fisheries.keys().map(String::as_str)
    }

    /// Fishery by label.
    pub fn fishery(&self, label: &str) -> Option<&Fishery> {
        self.fisheries.get(label)
    }

    fn binding_index(&self, fishery: &str, category: &str) -> Option<usize> {
        let f = self.fisheries.get_index_of(fishery)?;
        let c = self.category_labels.iter().position(|l| l == category)?;
        self.bindings
            .iter()
            .position(|b| b.fishery == f && b.category == c)
    }

    /// Numbers removed at age from `category` by `fishery` in `year`.
    ///
    /// Recorded for catch years only; indexed by the category's ages.
    pub fn removals(&self, year: u32, fishery: &str, category: &str) -> Option<&[f64]> {
        self.removals.get(year, self.binding_index(fishery, category)?)
    }

    /// Retained numbers at age (retained-catch processes only).
    pub fn retained_removals(&self, year: u32, fishery: &str, category: &str) -> Option<&[f64]> {
        self.retained_removals
            .get(year, self.binding_index(fishery, category)?)
    }

    /// Discarded numbers at age (retained-catch processes only).
    pub fn discard_removals(&self, year: u32, fishery: &str, category: &str) -> Option<&[f64]> {
        self.discard_removals
            .get(year, self.binding_index(fishery, category)?)
    }

    /// Fraction of `category` at `age` taken by `fishery` in the most
    /// recent execution: the fishery's exploitation times its selectivity.
    pub fn exploitation_fraction(&self, fishery: &str, category: &str, age: u32) -> Option<f64> {
        let binding = &self.bindings[self.binding_index(fishery, category)?];
        let ages = self.categories[binding.category].ages;
        if !ages.contains(age) {
            return None;
        }
        let index = (age - ages.min) as usize;
        let selectivity = binding.selectivity_values.get(index)?;
        Some(self.fisheries[binding.fishery].exploitation * selectivity)
    }

    // ── Validate helpers ───────────────────────────────────────────

    fn assemble(
        &mut self,
        ctx: &ValidateContext<'_>,
        rows: Vec<MethodRow>,
    ) -> Result<(), ConfigError> {
        let mut fisheries: IndexMap<String, Fishery> = IndexMap::new();
        let mut bindings: Vec<FisheryBinding> = Vec::new();

        for row in rows {
            let index = match fisheries.get_full(row.fishery.as_str()) {
                Some((i, _, existing)) => {
                    if existing.time_step_label != row.time_step {
                        return Err(ConfigError::FisheryInMultipleTimeSteps {
                            fishery: row.fishery,
                            first: existing.time_step_label.clone(),
                            second: row.time_step,
                            at: row.at,
                        });
                    }
                    let field = if existing.u_max != row.u_max {
                        Some("u_max")
                    } else if existing.penalty_label != row.penalty {
                        Some("penalty")
                    } else if existing.initialisation != row.initialisation {
                        Some("initialisation")
                    } else {
                        None
                    };
                    if let Some(field) = field {
                        return Err(ConfigError::FisheryInconsistent {
                            fishery: row.fishery,
                            field,
                            at: row.at,
                        });
                    }
                    i
                }
                None => {
                    let fishery = Fishery::new(
                        row.fishery.clone(),
                        row.time_step.clone(),
                        row.u_max,
                        row.penalty.clone(),
                        row.initialisation,
                        row.at.clone(),
                    );
                    fisheries.insert_full(row.fishery.clone(), fishery).0
                }
            };

            for (k, category) in row.categories.iter().enumerate() {
                ctx.check_category(category, &row.at)?;
                let category_index = self
                    .category_labels
                    .iter()
                    .position(|c| c == category)
                    .ok_or_else(|| ConfigError::InvalidValue {
                        parameter: tables::COL_CATEGORY.into(),
                        value: category.clone(),
                        reason: format!("is not a category of process '{}'", self.label),
                        at: row.at.clone(),
                    })?;
                if bindings
                    .iter()
                    .any(|b| b.fishery == index && b.category == category_index)
                {
                    return Err(ConfigError::InvalidValue {
                        parameter: tables::COL_CATEGORY.into(),
                        value: category.clone(),
                        reason: format!("is fished more than once by '{}'", row.fishery),
                        at: row.at.clone(),
                    });
                }
                let retention = self.retained.then(|| Retention {
                    retained_label: row.retained[k].clone(),
                    discard_mortality_label: row.discard_mortality[k].clone(),
                    retained: SelectivityId(0),
                    discard_mortality: SelectivityId(0),
                    retained_values: Vec::new(),
                    discard_mortality_values: Vec::new(),
                });
                fisheries[index].bindings.push(bindings.len());
                bindings.push(FisheryBinding {
                    fishery: index,
                    category: category_index,
                    selectivity_label: row.selectivities[k].clone(),
                    selectivity: SelectivityId(0),
                    retention,
                    at: row.at.clone(),
                    selectivity_values: Vec::new(),
                    removal_values: Vec::new(),
                    weights: Vec::new(),
                });
            }
        }

        self.fisheries = fisheries;
        self.bindings = bindings;
        Ok(())
    }

    // ── Execute helpers ────────────────────────────────────────────

    /// Rebuild the combined exploitation at age of every category from
    /// the current fishery rates.
    fn accumulate_exploitation(&mut self, time_step: usize, initialising: bool) {
        for category in &mut self.categories {
            category.exploitation.fill(0.0);
        }
        for binding in &self.bindings {
            let fishery = &self.fisheries[binding.fishery];
            if !fishes(fishery, time_step, initialising) {
                continue;
            }
            let category = &mut self.categories[binding.category];
            for (u, r) in category.exploitation.iter_mut().zip(&binding.removal_values) {
                *u += fishery.exploitation * r;
            }
        }
    }

    fn apply_fishing(&mut self, ctx: &mut ExecuteContext<'_>, initialising: bool) {
        let year = ctx.year();
        let time_step = ctx.time_step();

        // Vulnerable population per fishery.
        for fishery in self.fisheries.values_mut() {
            if fishes(fishery, time_step, initialising) {
                fishery.vulnerability = 0.0;
                fishery.retained_vulnerability = 0.0;
            }
        }
        for binding in &mut self.bindings {
            let fishery = &mut self.fisheries[binding.fishery];
            if !fishes(fishery, time_step, initialising) {
                continue;
            }
            let category = &self.categories[binding.category];
            let selectivities = ctx.selectivities();
            selectivities.fill(binding.selectivity, category.ages, &mut binding.selectivity_values);
            if let Some(retention) = &mut binding.retention {
                selectivities.fill(retention.retained, category.ages, &mut retention.retained_values);
                selectivities.fill(
                    retention.discard_mortality,
                    category.ages,
                    &mut retention.discard_mortality_values,
                );
            }

            let partition_category = ctx.partition().get(category.id);
            if self.units == CatchUnits::Biomass {
                if let Some(weights) = partition_category.mean_weights(time_step) {
                    for (w, mean) in binding.weights.iter_mut().zip(weights) {
                        *w = *mean;
                    }
                }
            }

            match &binding.retention {
                Some(retention) => {
                    for (i, removal) in binding.removal_values.iter_mut().enumerate() {
                        let ret = retention.retained_values[i];
                        let dm = retention.discard_mortality_values[i];
                        *removal = binding.selectivity_values[i] * (ret + dm * (1.0 - ret));
                    }
                }
                None => binding
                    .removal_values
                    .copy_from_slice(&binding.selectivity_values),
            }

            let numbers = partition_category.numbers_at_age();
            let mut vulnerable = 0.0;
            let mut retained = 0.0;
            for i in 0..numbers.len() {
                let v = numbers[i]
                    * binding.weights[i]
                    * binding.selectivity_values[i]
                    * category.exp_half_m[i];
                vulnerable += v;
                if let Some(retention) = &binding.retention {
                    retained += v * retention.retained_values[i];
                }
            }
            fishery.vulnerability += vulnerable;
            fishery.retained_vulnerability += retained;
        }

        // Exploitation rate per fishery.
        let retained = self.retained;
        for fishery in self.fisheries.values_mut() {
            if !fishes(fishery, time_step, initialising) {
                continue;
            }
            let input = fishery.inputs.get(&year).copied().unwrap_or(0.0);
            let basis = if retained {
                fishery.retained_vulnerability
            } else {
                fishery.vulnerability
            };
            if basis == 0.0 {
                fishery.catch = input;
                fishery.exploitation = 0.0;
            } else if retained {
                fishery.catch = input * fishery.vulnerability / zero_fun(basis);
                fishery.exploitation = input / zero_fun(basis);
            } else {
                fishery.catch = input;
                fishery.exploitation = input / zero_fun(basis);
            }
            tracing::trace!(
                fishery = %fishery.label,
                year,
                time_step,
                vulnerability = fishery.vulnerability,
                catch = fishery.catch,
                exploitation = fishery.exploitation,
                "fishery exploitation"
            );
        }

        self.accumulate_exploitation(time_step, initialising);

        // Maximum combined exploitation over the cells each fishery touches.
        for fishery in self.fisheries.values_mut() {
            if !fishes(fishery, time_step, initialising) {
                continue;
            }
            fishery.uobs = fishery
                .bindings
                .iter()
                .flat_map(|&b| self.categories[self.bindings[b].category].exploitation.iter())
                .copied()
                .fold(0.0, f64::max);
        }

        // Cap check, in declaration order.
        let mut rescaled = false;
        for fishery in self.fisheries.values_mut() {
            if !fishes(fishery, time_step, initialising) {
                continue;
            }
            let input = fishery.inputs.get(&year).copied().unwrap_or(0.0);
            let basis = if retained {
                fishery.retained_vulnerability
            } else {
                fishery.vulnerability
            };
            let starved = basis == 0.0;
            let capped = !starved && fishery.uobs > fishery.u_max;
            let (actual, actual_retained) = if starved {
                (0.0, 0.0)
            } else if capped {
                fishery.exploitation *= fishery.u_max / fishery.uobs;
                rescaled = true;
                (
                    fishery.vulnerability * fishery.exploitation,
                    fishery.retained_vulnerability * fishery.exploitation,
                )
            } else {
                (fishery.catch, input)
            };

            if capped || (starved && fishery.catch > 0.0) {
                match fishery.penalty {
                    Some(id) => ctx.penalties_mut().trigger(
                        id,
                        &format!("{}/{}", self.label, fishery.label),
                        fishery.catch,
                        actual,
                    ),
                    None => tracing::warn!(
                        process = %self.label,
                        fishery = %fishery.label,
                        year,
                        requested = fishery.catch,
                        permitted = actual,
                        "catch could not be taken"
                    ),
                }
            }

            let report = &mut fishery.report;
            report.catches.insert(year, fishery.catch);
            report.actual_catches.insert(year, actual);
            report.exploitation_by_year.insert(year, fishery.exploitation);
            report.uobs_by_year.insert(year, fishery.uobs);
            if retained {
                report.retained_catches.insert(year, input);
                report.actual_retained_catches.insert(year, actual_retained);
                report.discards.insert(year, actual - actual_retained);
                report.discards_dead.insert(year, 0.0);
            }
        }

        if rescaled {
            self.accumulate_exploitation(time_step, initialising);
        }

        // Removals at age.
        let record = self.catch_years.contains(&year);
        for (index, binding) in self.bindings.iter().enumerate() {
            let fishery = &mut self.fisheries[binding.fishery];
            if !fishes(fishery, time_step, initialising) {
                continue;
            }
            let category = &self.categories[binding.category];
            let numbers = ctx.partition().get(category.id).numbers_at_age();
            let exploitation = fishery.exploitation;
            let taken = |i: usize| {
                numbers[i] * exploitation * binding.selectivity_values[i] * category.exp_half_m[i]
            };

            if record {
                if let Some(slot) = self.removals.slot_mut(year, index) {
                    for (i, value) in slot.iter_mut().enumerate() {
                        *value = taken(i);
                    }
                }
            }
            let Some(retention) = &binding.retention else {
                continue;
            };
            let mut dead = 0.0;
            for i in 0..numbers.len() {
                let ret = retention.retained_values[i];
                dead += retention.discard_mortality_values[i] * (1.0 - ret) * taken(i) * binding.weights[i];
            }
            if let Some(total) = fishery.report.discards_dead.get_mut(&year) {
                *total += dead;
            }
            if record {
                if let Some(slot) = self.retained_removals.slot_mut(year, index) {
                    for (i, value) in slot.iter_mut().enumerate() {
                        *value = taken(i) * retention.retained_values[i];
                    }
                }
                if let Some(slot) = self.discard_removals.slot_mut(year, index) {
                    for (i, value) in slot.iter_mut().enumerate() {
                        *value = taken(i) * (1.0 - retention.retained_values[i]);
                    }
                }
            }
        }
    }
}

impl Process for MortalityInstantaneous {
    fn label(&self) -> &str {
        &self.label
    }

    fn type_name(&self) -> &'static str {
        if self.retained {
            "mortality_instantaneous_retained"
        } else {
            "mortality_instantaneous"
        }
    }

    fn validate(&mut self, ctx: &ValidateContext<'_>) -> Result<(), ConfigError> {
        let at = Provenance::inline();
        for category in &self.category_labels {
            ctx.check_category(category, &at)?;
        }

        let catches = read_catches(&self.catches_table, ctx.model())?;
        let rows = read_methods(&self.method_table, self.retained)?;
        self.assemble(ctx, rows)?;

        for fishery in self.fisheries.values_mut() {
            let inputs = catches
                .by_fishery
                .get(fishery.label.as_str())
                .ok_or_else(|| ConfigError::MissingCatches {
                    fishery: fishery.label.clone(),
                    at: catches.at.clone(),
                })?;
            fishery.inputs = inputs.clone();
        }
        for column in catches.by_fishery.keys() {
            if !self.fisheries.contains_key(column) {
                tracing::warn!(
                    process = %self.label,
                    fishery = %column,
                    "catches given for a fishery with no method row are ignored"
                );
            }
        }
        self.catch_years = catches.years;

        self.categories = self
            .category_labels
            .iter()
            .zip(&self.m_input)
            .zip(&self.relm_labels)
            .map(|((label, m), relm)| CategoryMortality::new(label.clone(), *m, relm.clone()))
            .collect();

        let m: IndexMap<String, f64> = self
            .categories
            .iter()
            .map(|c| (c.label.clone(), c.m))
            .collect();
        self.addressables
            .register(ADDRESSABLE_M, Addressable::StringMap(m), Usage::all())?;
        for fishery in self.fisheries.values() {
            self.addressables.register(
                catch_addressable(&fishery.label),
                Addressable::UnsignedMap(fishery.inputs.clone()),
                Usage::all(),
            )?;
        }
        Ok(())
    }

    fn build(&mut self, ctx: &BuildContext<'_>) -> Result<(), ConfigError> {
        let at = Provenance::inline();

        for category in &mut self.categories {
            let id = ctx.category_id(&category.label, &at)?;
            let partition_category = ctx.partition().get(id);
            if self.units == CatchUnits::Biomass && partition_category.age_length().is_none() {
                return Err(ConfigError::InvalidValue {
                    parameter: "biomass".into(),
                    value: "true".into(),
                    reason: format!(
                        "category '{}' has no age-length relationship to supply mean weights",
                        category.label
                    ),
                    at,
                });
            }
            let relm = ctx.selectivity_id(&category.relm_label, &at)?;
            category.allocate(id, partition_category.ages(), relm);
        }

        // Time step proportions over the active time steps.
        self.active_time_steps = ctx.active_time_steps();
        let active = self.active_time_steps.len();
        let proportions = if self.proportions_input.is_empty() && active == 1 {
            vec![1.0]
        } else {
            self.proportions_input.clone()
        };
        if active == 0 {
            tracing::warn!(process = %self.label, "process is not executed in any time step");
        } else {
            if proportions.len() != active {
                return Err(ConfigError::LengthMismatch {
                    parameter: ADDRESSABLE_TIME_STEP_PROPORTIONS.into(),
                    expected: active,
                    actual: proportions.len(),
                    at,
                });
            }
            if let Some(bad) = proportions.iter().find(|p| !(0.0..=1.0).contains(*p)) {
                return Err(ConfigError::InvalidValue {
                    parameter: ADDRESSABLE_TIME_STEP_PROPORTIONS.into(),
                    value: bad.to_string(),
                    reason: "must lie in [0, 1]".into(),
                    at,
                });
            }
            let total: f64 = proportions.iter().sum();
            if !is_one(total) {
                return Err(ConfigError::ProportionsNotOne {
                    parameter: ADDRESSABLE_TIME_STEP_PROPORTIONS.into(),
                    total,
                });
            }
        }
        self.ratios = vec![0.0; ctx.model().time_steps];
        for (&time_step, &p) in self.active_time_steps.iter().zip(&proportions) {
            self.ratios[time_step] = p;
        }
        self.addressables.register(
            ADDRESSABLE_TIME_STEP_PROPORTIONS,
            Addressable::Vector(proportions),
            Usage::all() - Usage::ESTIMATE,
        )?;

        for fishery in self.fisheries.values_mut() {
            fishery.time_step = ctx.time_step_index(&fishery.time_step_label, &fishery.at)?;
            if !self.active_time_steps.contains(&fishery.time_step) {
                return Err(ConfigError::InvalidValue {
                    parameter: tables::COL_TIME_STEP.into(),
                    value: fishery.time_step_label.clone(),
                    reason: format!(
                        "process '{}' is not executed in this time step",
                        self.label
                    ),
                    at: fishery.at.clone(),
                });
            }
            fishery.penalty = ctx.penalty_id(&fishery.penalty_label, &fishery.at)?;
        }

        let mut spreads = Vec::with_capacity(self.bindings.len());
        for binding in &mut self.bindings {
            binding.selectivity = ctx.selectivity_id(&binding.selectivity_label, &binding.at)?;
            if let Some(retention) = &mut binding.retention {
                retention.retained = ctx.selectivity_id(&retention.retained_label, &binding.at)?;
                retention.discard_mortality =
                    ctx.selectivity_id(&retention.discard_mortality_label, &binding.at)?;
            }
            let spread = self.categories[binding.category].ages.spread();
            binding.allocate(spread);
            spreads.push(spread);
        }

        let years = self.catch_years.iter().copied();
        self.removals = Removals::allocate(years.clone(), &spreads);
        if self.retained {
            self.retained_removals = Removals::allocate(years.clone(), &spreads);
            self.discard_removals = Removals::allocate(years, &spreads);
        }

        tracing::debug!(
            process = %self.label,
            fisheries = self.fisheries.len(),
            bindings = self.bindings.len(),
            catch_years = self.catch_years.len(),
            "mortality built"
        );
        Ok(())
    }

    fn reset(&mut self) -> Result<(), ExecutionError> {
        // Inputs may have been changed by an external driver since build,
        // so the load-time constraints are checked again here.
        let m = self.addressables.string_map(ADDRESSABLE_M)?;
        for category in &mut self.categories {
            let value = m.get(&category.label).copied().ok_or_else(|| {
                AddressableError::IndexNotFound {
                    label: ADDRESSABLE_M.into(),
                    index: category.label.clone(),
                }
            })?;
            if !(value.is_finite() && value >= 0.0) {
                return Err(ExecutionError::InvalidInput {
                    addressable: format!("{ADDRESSABLE_M}{{{}}}", category.label),
                    value,
                    reason: "must be finite and non-negative",
                });
            }
            category.m = value;
            category.exploitation.fill(0.0);
        }

        if self.addressables.contains(ADDRESSABLE_TIME_STEP_PROPORTIONS) {
            let proportions = self.addressables.vector(ADDRESSABLE_TIME_STEP_PROPORTIONS)?;
            if let Some((i, &p)) = proportions
                .iter()
                .enumerate()
                .find(|(_, p)| !(0.0..=1.0).contains(*p))
            {
                return Err(ExecutionError::InvalidInput {
                    addressable: format!("{ADDRESSABLE_TIME_STEP_PROPORTIONS}{{{}}}", i + 1),
                    value: p,
                    reason: "must lie in [0, 1]",
                });
            }
            let total: f64 = proportions.iter().sum();
            if !self.active_time_steps.is_empty() && !is_one(total) {
                return Err(ExecutionError::InvalidInput {
                    addressable: ADDRESSABLE_TIME_STEP_PROPORTIONS.into(),
                    value: total,
                    reason: "must sum to one",
                });
            }
            for (&time_step, &p) in self.active_time_steps.iter().zip(proportions) {
                self.ratios[time_step] = p;
            }
        }

        for fishery in self.fisheries.values_mut() {
            let label = catch_addressable(&fishery.label);
            let inputs = self.addressables.unsigned_map(&label)?;
            if let Some((year, &catch)) = inputs
                .iter()
                .find(|(_, c)| !(c.is_finite() && **c >= 0.0))
            {
                return Err(ExecutionError::InvalidInput {
                    addressable: format!("{label}{{{year}}}"),
                    value: catch,
                    reason: "must be finite and non-negative",
                });
            }
            fishery.inputs.clone_from(inputs);
            fishery.reset();
        }

        self.removals.zero();
        self.retained_removals.zero();
        self.discard_removals.zero();
        tracing::debug!(process = %self.label, "mortality reset");
        Ok(())
    }

    fn execute(&mut self, ctx: &mut ExecuteContext<'_>) -> Result<(), ExecutionError> {
        let year = ctx.year();
        let time_step = ctx.time_step();
        let initialising = ctx.state() == ModelState::Initialise;
        let ratio = self.time_step_ratio(time_step);

        for category in &mut self.categories {
            ctx.selectivities()
                .fill(category.relm, category.ages, &mut category.relm_values);
            for (half_m, relm) in category.exp_half_m.iter_mut().zip(&category.relm_values) {
                *half_m = (-0.5 * ratio * category.m * relm).exp();
            }
            category.exploitation.fill(0.0);
        }

        if self.catch_years.contains(&year) || year > ctx.model().final_year {
            self.apply_fishing(ctx, initialising);
        }

        for category in &self.categories {
            let partition_category = ctx.partition_mut().get_mut(category.id);
            let numbers = partition_category.numbers_at_age_mut();
            for ((n, half_m), u) in numbers
                .iter_mut()
                .zip(&category.exp_half_m)
                .zip(&category.exploitation)
            {
                *n *= half_m * half_m * (1.0 - u);
            }
        }

        for category in &self.categories {
            let partition_category = ctx.partition().get(category.id);
            let numbers = partition_category.numbers_at_age();
            for (value, age) in numbers.iter().zip(category.ages.ages()) {
                if !value.is_finite() {
                    return Err(ExecutionError::NonFinite {
                        category: category.label.clone(),
                        age,
                        value: *value,
                    });
                }
                if *value < 0.0 {
                    return Err(ExecutionError::NegativePartition {
                        category: category.label.clone(),
                        age,
                        value: *value,
                    });
                }
            }
        }
        Ok(())
    }

    fn addressables(&self) -> &AddressableRegistry {
        &self.addressables
    }

    fn addressables_mut(&mut self) -> &mut AddressableRegistry {
        &mut self.addressables
    }
}
