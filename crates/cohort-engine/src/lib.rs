//! Model scheduler driving Cohort population processes.
//!
//! Provides the top-level [`Model`]: it validates a [`ModelConfig`], builds
//! the partition, registries and processes, and runs evaluations year by
//! year, time step by time step. External drivers vary parameters through
//! addressable paths between evaluations.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod metrics;
pub mod model;

pub use config::{
    AddressableTarget, CategoryConfig, InitialisationPhaseConfig, ModelConfig,
    ProcessPenaltyConfig, TimeStepConfig,
};
pub use error::{ModelError, ModelPhase};
pub use metrics::RunSummary;
pub use model::Model;
