//! Strongly-typed handles into the model's arenas.
//!
//! Every cross-reference between model objects is resolved from a label to
//! one of these handles once, during Build, and never looked up by name in
//! the execution hot path.

use std::fmt;

/// Identifies a category within the partition.
///
/// `CategoryId(n)` is the n-th category in the model configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CategoryId(pub u32);

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for CategoryId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl CategoryId {
    /// Position of the category in the partition arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identifies a selectivity in the model's selectivity registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SelectivityId(pub u32);

impl fmt::Display for SelectivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SelectivityId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl SelectivityId {
    /// Position of the selectivity in the registry.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identifies an age-length (growth) sub-model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgeLengthId(pub u32);

impl fmt::Display for AgeLengthId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for AgeLengthId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl AgeLengthId {
    /// Position of the sub-model in the registry.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identifies a process penalty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PenaltyId(pub u32);

impl fmt::Display for PenaltyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for PenaltyId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl PenaltyId {
    /// Position of the penalty in the registry.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
