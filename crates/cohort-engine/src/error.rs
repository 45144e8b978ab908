//! Model-level errors.

use std::fmt;

use thiserror::Error;

use cohort_core::{AddressableError, ConfigError, ExecutionError, PartitionError};

/// Where a [`Model`](crate::Model) is in its evaluation lifecycle.
///
/// ```text
/// Built ──reset()──▶ Reset ──run()──▶ Executed ──reset()──▶ Reset ...
///                      └──run() fails──▶ Failed ──reset()──┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModelPhase {
    /// Validated and built; no evaluation has been prepared.
    Built,
    /// Reset and ready to run one evaluation.
    Reset,
    /// An evaluation completed.
    Executed,
    /// An evaluation aborted with an error.
    Failed,
}

impl fmt::Display for ModelPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Built => "built",
            Self::Reset => "reset",
            Self::Executed => "executed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Errors surfaced by [`Model`](crate::Model).
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ModelError {
    /// The configuration is invalid. Raised by `Model::new` only.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A process failed, or left the partition negative or non-finite.
    #[error("year {year}, time step '{time_step}', process '{process}': {source}")]
    Execution {
        /// Year being executed.
        year: u32,
        /// Label of the time step being executed.
        time_step: String,
        /// Label of the process that failed or ran last.
        process: String,
        /// The underlying failure.
        source: ExecutionError,
    },
    /// An initialisation phase failed.
    #[error("initialisation phase '{phase}' failed: {source}")]
    Initialisation {
        /// Phase label.
        phase: String,
        /// The underlying failure.
        source: Box<ModelError>,
    },
    /// A process could not restore its inputs on reset.
    #[error("process '{process}' failed to reset: {source}")]
    Reset {
        /// Process label.
        process: String,
        /// The underlying failure.
        source: ExecutionError,
    },
    /// A partition lookup failed.
    #[error(transparent)]
    Partition(#[from] PartitionError),
    /// An addressable path or lookup failed.
    #[error(transparent)]
    Addressable(#[from] AddressableError),
    /// No process has this label.
    #[error("process '{label}' was not found")]
    UnknownProcess {
        /// The requested label.
        label: String,
    },
    /// An operation was called out of lifecycle order.
    #[error("model is {actual}, expected {expected}")]
    Lifecycle {
        /// Phase the operation requires.
        expected: ModelPhase,
        /// Phase the model is in.
        actual: ModelPhase,
    },
}
