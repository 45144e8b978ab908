//! Cohort: an age-structured population dynamics engine for fisheries
//! stock assessment.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Cohort sub-crates. For most users, adding `cohort` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use cohort::prelude::*;
//!
//! // Ten years, ages 1–5 with a plus group, one category.
//! let mut config = ModelConfig::new(2000, 2009, 1, 5);
//! config.categories.push(CategoryConfig::new("stock"));
//! config
//!     .processes
//!     .push(RecruitmentConstant::new("recruitment", ["stock"], vec![1.0], 1000.0)?.into());
//! config.processes.push(Ageing::new("ageing", ["stock"]).into());
//! config
//!     .time_steps
//!     .push(TimeStepConfig::new("annual", ["recruitment", "ageing"]));
//!
//! let mut model = Model::new(config)?;
//! let summary = model.evaluate(RunMode::Basic)?;
//! assert_eq!(summary.years(), 10);
//!
//! // Every recruited cohort survives into the plus group.
//! assert_eq!(model.partition().total(), 10_000.0);
//!
//! // Parameters change through addressable paths between evaluations.
//! model.set_addressable("process[recruitment].r0", 500.0)?;
//! model.evaluate(RunMode::Basic)?;
//! assert_eq!(model.partition().total(), 5_000.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `cohort-core` | IDs, run modes, tables, errors, selectivity and age-length traits |
//! | [`partition`] | `cohort-partition` | Categories, numbers-at-age and mean weights |
//! | [`process`] | `cohort-process` | Process trait, contexts, addressables, penalties, schedule |
//! | [`processes`] | `cohort-processes` | Mortality solver, ageing, recruitment, selectivities, growth |
//! | [`engine`] | `cohort-engine` | Model configuration and the annual-cycle scheduler |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`cohort-core`).
///
/// Contains run modes, age ranges, tables, the error enums, and the
/// [`types::Selectivity`] and [`types::AgeLength`] traits.
pub use cohort_core as types;

/// The partition: all categories and their numbers-at-age
/// (`cohort-partition`).
pub use cohort_partition as partition;

/// Process trait and the contexts it runs in (`cohort-process`).
///
/// The [`process::Process`] trait is the main extension point for
/// user-defined population processes. Wrap one in
/// [`processes::ProcessKind::Custom`] to schedule it in a model.
pub use cohort_process as process;

/// Reference processes, selectivities and growth (`cohort-processes`).
///
/// Includes [`processes::MortalityInstantaneous`],
/// [`processes::RecruitmentConstant`] and [`processes::Ageing`].
pub use cohort_processes as processes;

/// Model configuration and scheduler (`cohort-engine`).
pub use cohort_engine as engine;

/// Common imports for typical Cohort usage.
///
/// ```rust
/// use cohort::prelude::*;
/// ```
///
/// This imports the most frequently used types: model configuration, the
/// model itself, reference processes, selectivities, and error types.
pub mod prelude {
    // Core types and traits
    pub use cohort_core::{AgeLength, AgeRange, RunMode, Selectivity, Table, WeightUnits};

    // Errors
    pub use cohort_core::{AddressableError, ConfigError, ExecutionError, PartitionError};
    pub use cohort_engine::ModelError;

    // Process extension point
    pub use cohort_process::{Process, ProcessPenalty};

    // Reference processes
    pub use cohort_processes::{
        Ageing, BasicLengthWeight, ConstantSelectivity, LogisticSelectivity,
        MortalityInstantaneous, ProcessKind, RecruitmentConstant, VonBertalanffy,
    };

    // Engine
    pub use cohort_engine::{
        CategoryConfig, InitialisationPhaseConfig, Model, ModelConfig, ProcessPenaltyConfig,
        RunSummary, TimeStepConfig,
    };
}
