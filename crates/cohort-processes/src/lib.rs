//! Population processes, selectivities and growth models for Cohort.
//!
//! # Processes
//!
//! | Process | Type name | Effect |
//! |---------|-----------|--------|
//! | [`RecruitmentConstant`] | `recruitment_constant` | adds `r0 · proportion` at the recruitment age |
//! | [`Ageing`] | `ageing` | moves every category one age up |
//! | [`MortalityInstantaneous`] | `mortality_instantaneous` | natural mortality plus catch removal capped by `u_max` |
//!
//! [`ProcessKind`] is the closed sum over these types that a model stores.
//!
//! # Collaborators
//!
//! Selectivities ([`LogisticSelectivity`], [`ConstantSelectivity`],
//! [`AllValuesSelectivity`]) and growth models ([`VonBertalanffy`],
//! [`ConstantWeight`]) implement the traits in `cohort-core` and are
//! registered with the model by label.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod ageing;
pub mod growth;
pub mod kind;
pub mod mortality;
pub mod recruitment;
pub mod selectivity;

pub use ageing::Ageing;
pub use growth::{BasicLengthWeight, ConstantWeight, VonBertalanffy};
pub use kind::ProcessKind;
pub use mortality::{
    CatchUnits, Fishery, FisheryReport, MortalityInstantaneous, MortalityInstantaneousBuilder,
};
pub use recruitment::RecruitmentConstant;
pub use selectivity::{AllValuesSelectivity, ConstantSelectivity, LogisticSelectivity};
