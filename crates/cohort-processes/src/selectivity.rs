//! Reference selectivities.
//!
//! - [`ConstantSelectivity`]: the same value at every age.
//! - [`LogisticSelectivity`]: a logistic ogive parameterised by the age at
//!   50% (`a50`) and the distance from 50% to 95% (`ato95`).
//! - [`AllValuesSelectivity`]: one value per age.

use cohort_core::{AgeRange, ConfigError, Provenance, Selectivity};

fn check_range(parameter: &str, value: f64, low: f64, high: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (low..=high).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            parameter: parameter.into(),
            value: value.to_string(),
            reason: format!("must lie in [{low}, {high}]"),
            at: Provenance::inline(),
        })
    }
}

/// The same value at every age.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstantSelectivity {
    c: f64,
}

impl ConstantSelectivity {
    /// Selectivity `c` at every age; `c` must lie in `[0, 1]`.
    pub fn new(c: f64) -> Result<Self, ConfigError> {
        check_range("c", c, 0.0, 1.0)?;
        Ok(Self { c })
    }
}

impl Selectivity for ConstantSelectivity {
    fn age_result(&self, _age: u32) -> f64 {
        self.c
    }
}

/// Logistic ogive `alpha / (1 + 19^((a50 − age) / ato95))`.
///
/// The exponent saturates: above 5 the result is 0, below −5 it is
/// `alpha`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LogisticSelectivity {
    a50: f64,
    ato95: f64,
    alpha: f64,
}

impl LogisticSelectivity {
    /// A logistic ogive with `alpha = 1`.
    pub fn new(a50: f64, ato95: f64) -> Result<Self, ConfigError> {
        Self::with_alpha(a50, ato95, 1.0)
    }

    /// A logistic ogive with maximum `alpha`.
    pub fn with_alpha(a50: f64, ato95: f64, alpha: f64) -> Result<Self, ConfigError> {
        if !a50.is_finite() {
            return Err(ConfigError::InvalidValue {
                parameter: "a50".into(),
                value: a50.to_string(),
                reason: "must be finite".into(),
                at: Provenance::inline(),
            });
        }
        if !(ato95.is_finite() && ato95 > 0.0) {
            return Err(ConfigError::InvalidValue {
                parameter: "ato95".into(),
                value: ato95.to_string(),
                reason: "must be positive".into(),
                at: Provenance::inline(),
            });
        }
        check_range("alpha", alpha, 0.0, 1.0)?;
        Ok(Self { a50, ato95, alpha })
    }
}

impl Selectivity for LogisticSelectivity {
    fn age_result(&self, age: u32) -> f64 {
        let threshold = (self.a50 - f64::from(age)) / self.ato95;
        if threshold > 5.0 {
            0.0
        } else if threshold < -5.0 {
            self.alpha
        } else {
            self.alpha / (1.0 + 19f64.powf(threshold))
        }
    }
}

/// An explicit value for every age of a range; zero outside it.
#[derive(Clone, Debug, PartialEq)]
pub struct AllValuesSelectivity {
    ages: AgeRange,
    values: Vec<f64>,
}

impl AllValuesSelectivity {
    /// One value per age of `ages`, each in `[0, 1]`.
    pub fn new(ages: AgeRange, values: Vec<f64>) -> Result<Self, ConfigError> {
        if values.len() != ages.spread() {
            return Err(ConfigError::LengthMismatch {
                parameter: "v".into(),
                expected: ages.spread(),
                actual: values.len(),
                at: Provenance::inline(),
            });
        }
        for v in &values {
            check_range("v", *v, 0.0, 1.0)?;
        }
        Ok(Self { ages, values })
    }
}

impl Selectivity for AllValuesSelectivity {
    fn age_result(&self, age: u32) -> f64 {
        if self.ages.contains(age) {
            self.values[(age - self.ages.min) as usize]
        } else {
            0.0
        }
    }
}
