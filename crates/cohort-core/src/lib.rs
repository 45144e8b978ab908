//! Core types and traits for the Cohort population dynamics framework.
//!
//! This is the leaf crate with no internal dependencies. It defines the
//! abstractions shared by every other Cohort crate: typed handles, run
//! modes and addressable usage flags, configuration tables, the error
//! types for each failure tier, and the collaborator traits
//! ([`Selectivity`], [`AgeLength`]) that processes consume.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod math;
pub mod mode;
pub mod table;
pub mod traits;
pub mod units;

pub use error::{AddressableError, ConfigError, ExecutionError, PartitionError};
pub use id::{AgeLengthId, CategoryId, PenaltyId, SelectivityId};
pub use mode::{AgeRange, ModelState, RunMode, Usage};
pub use table::{Provenance, Table};
pub use traits::{AgeLength, CategoryValidator, Selectivity};
pub use units::WeightUnits;
