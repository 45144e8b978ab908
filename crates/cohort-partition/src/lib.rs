//! Population partition storage for Cohort models.
//!
//! The [`Partition`] is the single mutable population state of one model
//! evaluation. It owns every [`Category`] (one stratum's numbers-at-age plus
//! a cache of mean weight at age) in an arena indexed by
//! [`CategoryId`](cohort_core::CategoryId). Processes resolve category names
//! to handles once at Build and borrow categories only for the duration of
//! one execution.
//!
//! # Architecture
//!
//! ```text
//! Partition
//! ├── Vec<Category>                 (arena, CategoryId = position)
//! │   ├── numbers_at_age: Vec<f64>
//! │   └── mean_weights[time_step][age]
//! └── IndexMap<String, CategoryId>  (name lookup, declaration order)
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod category;
pub mod growth;
pub mod partition;

pub use category::{Category, CategoryDef};
pub use growth::AgeLengths;
pub use partition::Partition;
