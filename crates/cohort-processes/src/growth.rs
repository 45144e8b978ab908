//! Reference growth and weight sub-models.
//!
//! [`VonBertalanffy`] provides mean length at age and, through a
//! [`BasicLengthWeight`] relationship, mean weight at age with a
//! lognormal-style bias correction for length variability. [`ConstantWeight`]
//! supplies fixed weights and is mostly useful in tests.

use cohort_core::{AgeLength, AgeRange, ConfigError, Provenance, WeightUnits};

fn invalid(parameter: &str, value: f64, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        parameter: parameter.into(),
        value: value.to_string(),
        reason: reason.into(),
        at: Provenance::inline(),
    }
}

// ── Length-weight ──────────────────────────────────────────────────

/// Allometric length-weight relationship `W = a·L^b`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BasicLengthWeight {
    a: f64,
    b: f64,
    units: WeightUnits,
}

impl BasicLengthWeight {
    /// `W = a·L^b` in `units`. `a` and `b` must be positive.
    pub fn new(a: f64, b: f64, units: WeightUnits) -> Result<Self, ConfigError> {
        if !(a.is_finite() && a > 0.0) {
            return Err(invalid("a", a, "must be positive"));
        }
        if !(b.is_finite() && b > 0.0) {
            return Err(invalid("b", b, "must be positive"));
        }
        Ok(Self { a, b, units })
    }

    /// Mean weight of fish of mean length `length` with coefficient of
    /// variation `cv`: `a·L^b·(1 + cv²)^(b(b − 1)/2)`.
    pub fn mean_weight(&self, length: f64, cv: f64) -> f64 {
        let b = self.b;
        self.a * length.powf(b) * (1.0 + cv * cv).powf(b * (b - 1.0) / 2.0)
    }

    /// Units of the computed weights.
    pub fn units(&self) -> WeightUnits {
        self.units
    }
}

// ── von Bertalanffy ────────────────────────────────────────────────

/// von Bertalanffy growth: `L = linf·(1 − exp(−k·(age + p_ts − t0)))`,
/// where `p_ts` is the proportion of the year elapsed at time step `ts`.
#[derive(Clone, Debug, PartialEq)]
pub struct VonBertalanffy {
    linf: f64,
    k: f64,
    t0: f64,
    cv_first: f64,
    cv_last: Option<f64>,
    by_length: bool,
    time_step_proportions: Vec<f64>,
    length_weight: BasicLengthWeight,
}

/// Builder for [`VonBertalanffy`].
///
/// Required: `linf`, `k` and a length-weight relationship. `t0` and
/// `cv_first` default to zero.
#[derive(Clone, Debug)]
pub struct VonBertalanffyBuilder {
    linf: Option<f64>,
    k: Option<f64>,
    t0: f64,
    cv_first: f64,
    cv_last: Option<f64>,
    by_length: bool,
    time_step_proportions: Vec<f64>,
    length_weight: Option<BasicLengthWeight>,
}

impl VonBertalanffyBuilder {
    /// Asymptotic length.
    pub fn linf(mut self, linf: f64) -> Self {
        self.linf = Some(linf);
        self
    }

    /// Growth rate.
    pub fn k(mut self, k: f64) -> Self {
        self.k = Some(k);
        self
    }

    /// Theoretical age at length zero.
    pub fn t0(mut self, t0: f64) -> Self {
        self.t0 = t0;
        self
    }

    /// CV of length at the youngest model age, or at every age when
    /// `cv_last` is not set.
    pub fn cv_first(mut self, cv: f64) -> Self {
        self.cv_first = cv;
        self
    }

    /// CV of length at the oldest model age.
    pub fn cv_last(mut self, cv: f64) -> Self {
        self.cv_last = Some(cv);
        self
    }

    /// Interpolate the CV by mean length instead of by age.
    pub fn by_length(mut self, by_length: bool) -> Self {
        self.by_length = by_length;
        self
    }

    /// Proportion of the year elapsed at each time step.
    pub fn time_step_proportions(mut self, proportions: impl IntoIterator<Item = f64>) -> Self {
        self.time_step_proportions = proportions.into_iter().collect();
        self
    }

    /// Length-weight relationship.
    pub fn length_weight(mut self, length_weight: BasicLengthWeight) -> Self {
        self.length_weight = Some(length_weight);
        self
    }

    /// Build the growth model.
    pub fn build(self) -> Result<VonBertalanffy, ConfigError> {
        let linf = self.linf.ok_or_else(|| invalid("linf", f64::NAN, "is required"))?;
        let k = self.k.ok_or_else(|| invalid("k", f64::NAN, "is required"))?;
        let length_weight = self.length_weight.ok_or_else(|| ConfigError::InvalidValue {
            parameter: "length_weight".into(),
            value: String::new(),
            reason: "is required".into(),
            at: Provenance::inline(),
        })?;
        if !(linf.is_finite() && linf > 0.0) {
            return Err(invalid("linf", linf, "must be positive"));
        }
        if !(k.is_finite() && k > 0.0) {
            return Err(invalid("k", k, "must be positive"));
        }
        if !self.t0.is_finite() {
            return Err(invalid("t0", self.t0, "must be finite"));
        }
        for cv in std::iter::once(self.cv_first).chain(self.cv_last) {
            if !(cv.is_finite() && cv >= 0.0) {
                return Err(invalid("cv", cv, "must be non-negative"));
            }
        }
        if let Some(p) = self
            .time_step_proportions
            .iter()
            .find(|p| !(0.0..=1.0).contains(*p))
        {
            return Err(invalid("time_step_proportions", *p, "must lie in [0, 1]"));
        }
        Ok(VonBertalanffy {
            linf,
            k,
            t0: self.t0,
            cv_first: self.cv_first,
            cv_last: self.cv_last,
            by_length: self.by_length,
            time_step_proportions: self.time_step_proportions,
            length_weight,
        })
    }
}

impl VonBertalanffy {
    /// Create a builder.
    pub fn builder() -> VonBertalanffyBuilder {
        VonBertalanffyBuilder {
            linf: None,
            k: None,
            t0: 0.0,
            cv_first: 0.0,
            cv_last: None,
            by_length: false,
            time_step_proportions: Vec::new(),
            length_weight: None,
        }
    }

    /// CV of length at `age` in `time_step`, interpolated between
    /// `cv_first` at the youngest and `cv_last` at the oldest model age.
    pub fn cv(&self, time_step: usize, age: u32, ages: AgeRange) -> f64 {
        let Some(cv_last) = self.cv_last else {
            return self.cv_first;
        };
        if ages.max == ages.min {
            return self.cv_first;
        }
        let fraction = if self.by_length {
            let first = self.mean_length(time_step, ages.min);
            let last = self.mean_length(time_step, ages.max);
            if last == first {
                return self.cv_first;
            }
            (self.mean_length(time_step, age) - first) / (last - first)
        } else {
            f64::from(age - ages.min.min(age)) / f64::from(ages.max - ages.min)
        };
        self.cv_first + (cv_last - self.cv_first) * fraction
    }
}

impl AgeLength for VonBertalanffy {
    fn mean_length(&self, time_step: usize, age: u32) -> f64 {
        let proportion = self.time_step_proportions.get(time_step).copied().unwrap_or(0.0);
        let size = self.linf * (1.0 - (-self.k * (f64::from(age) + proportion - self.t0)).exp());
        size.max(0.0)
    }

    fn mean_weight(&self, _year: u32, time_step: usize, age: u32, ages: AgeRange) -> f64 {
        let length = self.mean_length(time_step, age);
        self.length_weight
            .mean_weight(length, self.cv(time_step, age, ages))
    }

    fn weight_units(&self) -> WeightUnits {
        self.length_weight.units()
    }
}

// ── Constant weight ────────────────────────────────────────────────

/// Fixed mean weight at age, independent of year and time step.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstantWeight {
    ages: AgeRange,
    weights: Vec<f64>,
    units: WeightUnits,
}

impl ConstantWeight {
    /// One non-negative weight per age of `ages`.
    pub fn new(ages: AgeRange, weights: Vec<f64>, units: WeightUnits) -> Result<Self, ConfigError> {
        if weights.len() != ages.spread() {
            return Err(ConfigError::LengthMismatch {
                parameter: "weights".into(),
                expected: ages.spread(),
                actual: weights.len(),
                at: Provenance::inline(),
            });
        }
        if let Some(w) = weights.iter().find(|w| !(w.is_finite() && **w >= 0.0)) {
            return Err(invalid("weights", *w, "must be non-negative"));
        }
        Ok(Self {
            ages,
            weights,
            units,
        })
    }
}

impl AgeLength for ConstantWeight {
    fn mean_length(&self, _time_step: usize, _age: u32) -> f64 {
        0.0
    }

    fn mean_weight(&self, _year: u32, _time_step: usize, age: u32, _ages: AgeRange) -> f64 {
        if self.ages.contains(age) {
            self.weights[(age - self.ages.min) as usize]
        } else {
            0.0
        }
    }

    fn weight_units(&self) -> WeightUnits {
        self.units
    }
}
