//! Run modes, model states, addressable usage flags and age ranges.

use std::fmt;

use bitflags::bitflags;

/// How the external driver is using the model for this evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RunMode {
    /// A single run with externally supplied parameter values.
    Basic,
    /// Objective-function minimisation.
    Estimation,
    /// Likelihood profiling over one parameter.
    Profiling,
    /// Simulating observations from a fitted model.
    Simulation,
    /// Projecting beyond the final model year.
    Projection,
}

impl RunMode {
    /// The usage flag an addressable must carry to be targeted in this mode.
    pub fn required_usage(self) -> Usage {
        match self {
            Self::Basic => Usage::INPUT,
            Self::Estimation => Usage::ESTIMATE,
            Self::Profiling => Usage::PROFILE,
            Self::Simulation => Usage::SIMULATE,
            Self::Projection => Usage::PROJECT,
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Basic => "basic runs",
            Self::Estimation => "estimation",
            Self::Profiling => "profiling",
            Self::Simulation => "simulation",
            Self::Projection => "projection",
        };
        f.write_str(s)
    }
}

/// Which phase of an evaluation the scheduler is in.
///
/// Processes consult this to decide whether behaviour that only makes sense
/// against observed data (fishing) applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModelState {
    /// Running an initialisation phase before the first model year.
    Initialise,
    /// Running the modelled years.
    Execute,
}

bitflags! {
    /// Run modes in which an addressable may be targeted by the estimator.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Usage: u8 {
        /// Values supplied from an input file for a basic run.
        const INPUT = 1 << 0;
        /// Estimated parameters.
        const ESTIMATE = 1 << 1;
        /// Profiled parameters.
        const PROFILE = 1 << 2;
        /// Parameters varied when simulating.
        const SIMULATE = 1 << 3;
        /// Parameters overridden in projections.
        const PROJECT = 1 << 4;
    }
}

impl Usage {
    /// Whether an addressable with these flags may be targeted in `mode`.
    pub fn permits(self, mode: RunMode) -> bool {
        self.contains(mode.required_usage())
    }
}

/// An inclusive, contiguous range of ages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AgeRange {
    /// Youngest age.
    pub min: u32,
    /// Oldest age (plus group when the model has one).
    pub max: u32,
}

impl AgeRange {
    /// Construct a range; `None` when `min > max`.
    pub fn new(min: u32, max: u32) -> Option<Self> {
        (min <= max).then_some(Self { min, max })
    }

    /// Number of ages in the range.
    pub fn spread(self) -> usize {
        (self.max - self.min) as usize + 1
    }

    /// Whether `age` lies inside the range.
    pub fn contains(self, age: u32) -> bool {
        (self.min..=self.max).contains(&age)
    }

    /// Ages in ascending order.
    pub fn ages(self) -> impl Iterator<Item = u32> {
        self.min..=self.max
    }
}
