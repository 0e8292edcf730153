//! Error types.
//!
//! Misses are `Option`/`bool` results, not errors. That covers an absent key,
//! a rank past the end and a score update onto a taken position. Caller bugs (NaN score, zero rank, inverted range) panic. What is
//! left is a rejected insert, which hands the value back, and an invalid
//! [`Config`](crate::Config).

use thiserror::Error;

/// Insert rejected because a node with the same score and value exists.
///
/// Carries the handle of the node already in place and the member that was
/// not inserted, so the caller gets ownership back.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("a member with the same score and value already exists")]
pub struct Duplicate<T, Idx> {
    /// Handle of the node that already occupies the position.
    pub existing: Idx,
    /// The member that was not inserted.
    pub rejected: T,
}

impl<T, Idx> Duplicate<T, Idx> {
    /// Returns the member that could not be inserted.
    pub fn into_inner(self) -> T {
        self.rejected
    }
}

/// Invalid [`Config`](crate::Config).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Level-up probability outside `[0, 1)`.
    #[error("level-up probability {0} outside [0, 1)")]
    LevelProbability(f64),

    /// More initial capacity than node handles can address.
    #[error("capacity {requested} exceeds the {max} addressable nodes")]
    Capacity {
        /// Requested capacity.
        requested: usize,
        /// Largest capacity the handle type supports.
        max: usize,
    },
}
