//! Closed set of concrete process types.

use std::fmt;

use cohort_core::{ConfigError, ExecutionError};
use cohort_process::{AddressableRegistry, BuildContext, ExecuteContext, Process, ValidateContext};

use crate::ageing::Ageing;
use crate::mortality::MortalityInstantaneous;
use crate::recruitment::RecruitmentConstant;

/// Every process type a model can hold.
///
/// The scheduler drives processes through [`Process`]; code that needs a
/// specific type (reports, observations) matches on the variant instead of
/// downcasting. [`ProcessKind::Custom`] carries any other [`Process`]
/// implementation.
pub enum ProcessKind {
    /// [`Ageing`].
    Ageing(Ageing),
    /// [`RecruitmentConstant`].
    RecruitmentConstant(RecruitmentConstant),
    /// [`MortalityInstantaneous`], plain or retained.
    MortalityInstantaneous(MortalityInstantaneous),
    /// A process type defined outside this crate.
    Custom(Box<dyn Process>),
}

impl ProcessKind {
    fn inner(&self) -> &dyn Process {
        match self {
            Self::Ageing(p) => p,
            Self::RecruitmentConstant(p) => p,
            Self::MortalityInstantaneous(p) => p,
            Self::Custom(p) => p.as_ref(),
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Process {
        match self {
            Self::Ageing(p) => p,
            Self::RecruitmentConstant(p) => p,
            Self::MortalityInstantaneous(p) => p,
            Self::Custom(p) => p.as_mut(),
        }
    }

    /// The mortality process, if this is one.
    pub fn as_mortality_instantaneous(&self) -> Option<&MortalityInstantaneous> {
        match self {
            Self::MortalityInstantaneous(p) => Some(p),
            _ => None,
        }
    }

    /// The recruitment process, if this is one.
    pub fn as_recruitment_constant(&self) -> Option<&RecruitmentConstant> {
        match self {
            Self::RecruitmentConstant(p) => Some(p),
            _ => None,
        }
    }

    /// The ageing process, if this is one.
    pub fn as_ageing(&self) -> Option<&Ageing> {
        match self {
            Self::Ageing(p) => Some(p),
            _ => None,
        }
    }
}

impl fmt::Debug for ProcessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ageing(p) => f.debug_tuple("Ageing").field(p).finish(),
            Self::RecruitmentConstant(p) => f.debug_tuple("RecruitmentConstant").field(p).finish(),
            Self::MortalityInstantaneous(p) => {
                f.debug_tuple("MortalityInstantaneous").field(p).finish()
            }
            Self::Custom(p) => f
                .debug_struct("Custom")
                .field("label", &p.label())
                .field("type_name", &p.type_name())
                .finish(),
        }
    }
}

impl From<Ageing> for ProcessKind {
    fn from(p: Ageing) -> Self {
        Self::Ageing(p)
    }
}

impl From<RecruitmentConstant> for ProcessKind {
    fn from(p: RecruitmentConstant) -> Self {
        Self::RecruitmentConstant(p)
    }
}

impl From<MortalityInstantaneous> for ProcessKind {
    fn from(p: MortalityInstantaneous) -> Self {
        Self::MortalityInstantaneous(p)
    }
}

impl From<Box<dyn Process>> for ProcessKind {
    fn from(p: Box<dyn Process>) -> Self {
        Self::Custom(p)
    }
}

impl Process for ProcessKind {
    fn label(&self) -> &str {
        self.inner().label()
    }

    fn type_name(&self) -> &'static str {
        self.inner().type_name()
    }

    fn validate(&mut self, ctx: &ValidateContext<'_>) -> Result<(), ConfigError> {
        self.inner_mut().validate(ctx)
    }

    fn build(&mut self, ctx: &BuildContext<'_>) -> Result<(), ConfigError> {
        self.inner_mut().build(ctx)
    }

    fn reset(&mut self) -> Result<(), ExecutionError> {
        self.inner_mut().reset()
    }

    fn execute(&mut self, ctx: &mut ExecuteContext<'_>) -> Result<(), ExecutionError> {
        self.inner_mut().execute(ctx)
    }

    fn addressables(&self) -> &AddressableRegistry {
        self.inner().addressables()
    }

    fn addressables_mut(&mut self) -> &mut AddressableRegistry {
        self.inner_mut().addressables_mut()
    }
}
