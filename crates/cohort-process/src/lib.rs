//! Process lifecycle, execution contexts, addressables and penalties.
//!
//! The [`Process`] trait is the narrow scheduling interface every population
//! process implements: `validate → build → reset → execute`. Everything a
//! process needs from the rest of the model arrives through an explicit
//! context ([`ValidateContext`], [`BuildContext`], [`ExecuteContext`]);
//! there is no global registry.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod addressable;
pub mod context;
pub mod penalty;
pub mod process;
pub mod schedule;
pub mod selectivity;

pub use addressable::{
    Addressable, AddressableMut, AddressablePath, AddressableRef, AddressableRegistry,
};
pub use context::{BuildContext, ExecuteContext, ModelInfo, ValidateContext};
pub use penalty::{Penalties, PenaltyRecord, ProcessPenalty};
pub use process::Process;
pub use schedule::{validate_schedule, Schedule, TimeStepDef};
pub use selectivity::Selectivities;
