//! Error types for the Cohort framework.
//!
//! Errors are split by failure tier:
//!
//! - [`ConfigError`]: fatal configuration problems detected while a model
//!   is validated and built, before any simulation runs.
//! - [`ExecutionError`]: fatal invariant violations detected during an
//!   evaluation. These abort the evaluation.
//! - [`PartitionError`] and [`AddressableError`]: lookup failures in the
//!   partition and addressable registries, which are programming or
//!   configuration mismatches and surface through the two tiers above.
//!
//! Soft business-rule violations are not errors; they are recorded as
//! penalties and execution continues.

use thiserror::Error;

use crate::mode::RunMode;
use crate::table::Provenance;

/// Fatal configuration errors raised during Validate and Build.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// A category label does not name a category in the partition.
    #[error("category '{label}' was not found ({at})")]
    UnknownCategory {
        /// The unresolved label.
        label: String,
        /// Where the label was supplied.
        at: Provenance,
    },
    /// A selectivity label does not name a registered selectivity.
    #[error("selectivity '{label}' was not found ({at})")]
    UnknownSelectivity {
        /// The unresolved label.
        label: String,
        /// Where the label was supplied.
        at: Provenance,
    },
    /// A penalty label does not name a registered process penalty.
    #[error("penalty '{label}' was not found ({at})")]
    UnknownPenalty {
        /// The unresolved label.
        label: String,
        /// Where the label was supplied.
        at: Provenance,
    },
    /// A time step label does not name a model time step.
    #[error("time step '{label}' was not found ({at})")]
    UnknownTimeStep {
        /// The unresolved label.
        label: String,
        /// Where the label was supplied.
        at: Provenance,
    },
    /// A time step lists a process that was never defined.
    #[error("time step '{time_step}' references unknown process '{label}'")]
    UnknownProcess {
        /// The unresolved process label.
        label: String,
        /// The time step that referenced it.
        time_step: String,
    },
    /// A category references an unknown age-length sub-model.
    #[error("age length '{label}' was not found")]
    UnknownAgeLength {
        /// The unresolved label.
        label: String,
    },
    /// Two objects of the same kind share a label.
    #[error("duplicate {kind} label '{label}'")]
    DuplicateLabel {
        /// The kind of object (category, process, selectivity, ...).
        kind: &'static str,
        /// The repeated label.
        label: String,
    },
    /// A required column is absent from a configuration table.
    #[error("table '{table}' is missing required column '{column}' ({at})")]
    MissingColumn {
        /// Table name.
        table: String,
        /// The missing column.
        column: String,
        /// Where the table was defined.
        at: Provenance,
    },
    /// Two parallel inputs disagree in length.
    #[error("'{parameter}' has {actual} values but {expected} were expected ({at})")]
    LengthMismatch {
        /// The parameter whose length is wrong.
        parameter: String,
        /// Required number of values.
        expected: usize,
        /// Supplied number of values.
        actual: usize,
        /// Where the values were supplied.
        at: Provenance,
    },
    /// A value could not be parsed or is outside its permitted range.
    #[error("invalid value '{value}' for '{parameter}': {reason} ({at})")]
    InvalidValue {
        /// The parameter being set.
        parameter: String,
        /// The offending value as written.
        value: String,
        /// Why it was rejected.
        reason: String,
        /// Where the value was supplied.
        at: Provenance,
    },
    /// A set of proportions does not sum to one.
    #[error("'{parameter}' must sum to one, got {total}")]
    ProportionsNotOne {
        /// The parameter holding the proportions.
        parameter: String,
        /// The actual sum.
        total: f64,
    },
    /// A fishery is assigned to more than one time step.
    #[error(
        "fishery '{fishery}' was found in time steps '{first}' and '{second}'; \
         a fishery may occur in one time step only ({at})"
    )]
    FisheryInMultipleTimeSteps {
        /// Fishery label.
        fishery: String,
        /// Time step of its first row.
        first: String,
        /// Conflicting time step.
        second: String,
        /// Where the conflicting row was supplied.
        at: Provenance,
    },
    /// Rows of the same fishery disagree on a per-fishery attribute.
    #[error("fishery '{fishery}' has inconsistent '{field}' across method rows ({at})")]
    FisheryInconsistent {
        /// Fishery label.
        fishery: String,
        /// The attribute that differs (u_max, penalty, ...).
        field: &'static str,
        /// Where the conflicting row was supplied.
        at: Provenance,
    },
    /// A fishery in the method table has no column in the catches table.
    #[error("fishery '{fishery}' has no column in the catches table ({at})")]
    MissingCatches {
        /// Fishery label.
        fishery: String,
        /// Where the catches table was defined.
        at: Provenance,
    },
    /// An addressable was targeted by a run mode its usage flags exclude.
    #[error("addressable '{addressable}' may not be used for {mode}")]
    UsageNotPermitted {
        /// Full addressable path.
        addressable: String,
        /// The run mode that targeted it.
        mode: RunMode,
    },
    /// An addressable lookup failed while validating targets.
    #[error(transparent)]
    Addressable(#[from] AddressableError),
    /// A model-level structural problem.
    #[error("invalid model: {reason}")]
    InvalidModel {
        /// Description of the problem.
        reason: String,
    },
}

/// Fatal invariant violations raised while a process executes.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ExecutionError {
    /// A numbers-at-age cell went negative.
    #[error("negative partition: category '{category}' age {age} = {value}")]
    NegativePartition {
        /// Category name.
        category: String,
        /// Age of the offending cell.
        age: u32,
        /// The negative value.
        value: f64,
    },
    /// A numbers-at-age cell became NaN or infinite.
    #[error("non-finite partition: category '{category}' age {age} = {value}")]
    NonFinite {
        /// Category name.
        category: String,
        /// Age of the offending cell.
        age: u32,
        /// The non-finite value.
        value: f64,
    },
    /// An addressable holds a value its process cannot run with.
    ///
    /// Raised at reset, after an external driver changed the value.
    #[error("addressable '{addressable}' = {value} {reason}")]
    InvalidInput {
        /// Addressable label, with the index when one element is at fault.
        addressable: String,
        /// The offending value (the total, for proportions).
        value: f64,
        /// Constraint the value breaks.
        reason: &'static str,
    },
    /// A partition lookup failed.
    #[error(transparent)]
    Partition(#[from] PartitionError),
    /// An addressable lookup failed.
    #[error(transparent)]
    Addressable(#[from] AddressableError),
}

/// Errors from partition lookups.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PartitionError {
    /// No category has this name.
    #[error("category '{name}' not found in the partition")]
    CategoryNotFound {
        /// The requested name.
        name: String,
    },
    /// An age lies outside the category's age range.
    #[error("age {age} is outside category '{category}' range {min}..={max}")]
    AgeOutOfRange {
        /// Category name.
        category: String,
        /// Requested age.
        age: u32,
        /// Category minimum age.
        min: u32,
        /// Category maximum age.
        max: u32,
    },
    /// A replacement numbers-at-age vector has the wrong length.
    #[error("category '{category}' expects {expected} values, got {actual}")]
    LengthMismatch {
        /// Category name.
        category: String,
        /// The category's age spread.
        expected: usize,
        /// Supplied length.
        actual: usize,
    },
}

/// Errors from the addressable registry.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AddressableError {
    /// The label was never registered.
    #[error("addressable '{label}' is not registered")]
    NotRegistered {
        /// The requested label.
        label: String,
    },
    /// The label is already registered.
    #[error("addressable '{label}' is already registered")]
    AlreadyRegistered {
        /// The repeated label.
        label: String,
    },
    /// The addressable holds a different kind of value.
    #[error("addressable '{label}' is a {actual}, not a {expected}")]
    TypeMismatch {
        /// The addressable label.
        label: String,
        /// The kind the caller asked for.
        expected: &'static str,
        /// The kind actually stored.
        actual: &'static str,
    },
    /// The element index does not exist in the addressable.
    #[error("addressable '{label}' has no element '{index}'")]
    IndexNotFound {
        /// The addressable label.
        label: String,
        /// The requested index as written.
        index: String,
    },
    /// A scalar was addressed with an index, or a container without one.
    #[error("addressable '{label}' {reason}")]
    IndexRequired {
        /// The addressable label.
        label: String,
        /// What went wrong.
        reason: &'static str,
    },
    /// A model addressable path could not be parsed.
    #[error("malformed addressable path '{path}': {reason}")]
    MalformedPath {
        /// The path as written.
        path: String,
        /// Why parsing failed.
        reason: &'static str,
    },
}
