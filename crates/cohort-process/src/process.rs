//! The [`Process`] trait.
//!
//! A process is one unit of per-time-step population change. The model
//! drives every process through the same lifecycle:
//!
//! ```text
//! Unbuilt ──validate()──▶ Validated ──build()──▶ Built ──┬─▶ reset() ──▶ execute()*
//!                                                        └──────────────────┘
//! ```

use cohort_core::{ConfigError, ExecutionError};

use crate::addressable::AddressableRegistry;
use crate::context::{BuildContext, ExecuteContext, ValidateContext};

/// A unit of population mutation executed by the scheduler.
///
/// # Contract
///
/// - `validate()` checks static configuration and fails on the first
///   violation.
/// - `build()` resolves labels to handles and pre-allocates every buffer
///   `execute()` will use. `execute()` must not allocate per age.
/// - `reset()` is called once per evaluation. It restores every input from
///   the process's [`AddressableRegistry`] (the current, possibly
///   estimator-modified values) and clears per-run accumulators.
/// - `execute()` is called once per (year, time step) the process takes
///   part in, in schedule order. It is not re-entrant.
///
/// # Object safety
///
/// This trait is object-safe.
pub trait Process: Send + 'static {
    /// Unique label used by time steps and addressable paths.
    fn label(&self) -> &str;

    /// Configuration type name, e.g. `mortality_instantaneous`.
    fn type_name(&self) -> &'static str;

    /// Check static configuration.
    fn validate(&mut self, ctx: &ValidateContext<'_>) -> Result<(), ConfigError>;

    /// Resolve cross-references and allocate scratch buffers.
    fn build(&mut self, ctx: &BuildContext<'_>) -> Result<(), ConfigError>;

    /// Prepare for a new evaluation.
    fn reset(&mut self) -> Result<(), ExecutionError>;

    /// Apply this process at the context's (year, time step).
    fn execute(&mut self, ctx: &mut ExecuteContext<'_>) -> Result<(), ExecutionError>;

    /// Parameters exposed to the estimator.
    fn addressables(&self) -> &AddressableRegistry;

    /// Mutable access to the exposed parameters.
    fn addressables_mut(&mut self) -> &mut AddressableRegistry;
}
