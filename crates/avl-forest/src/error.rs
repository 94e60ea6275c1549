use thiserror::Error;

/// Failures surfaced by tree operations.
///
/// Duplicate inserts and deletes of absent keys are not errors; they return
/// `Ok(false)` and are reported through [`crate::TreeEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForestError {
    /// The store has no slot left for a new node. The tree is unchanged.
    #[error("store capacity of {capacity} slots exceeded")]
    CapacityExceeded { capacity: usize },
    /// An implicit-store rotation would write below the last slot.
    ///
    /// Detected before the rotation clears anything. The whole insert or
    /// delete is then rolled back and the tree is left as it was.
    #[error("rotation at slot {slot} would write past capacity {capacity}")]
    RotationOverflow { slot: usize, capacity: usize },
    #[error("unknown store kind: {0}")]
    UnknownStore(String),
}
