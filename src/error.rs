//! ReachError: unified error type for cell-reach public APIs
//!
//! All batch computations and searches report failures through this type.
//! Worker tasks propagate the first error they hit; the orchestrators abort
//! the whole batch on it and leave already-written sibling records in place.

use thiserror::Error;

/// Unified error type for precomputation operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReachError {
    /// An edge produced a negative weight during traversal. Weights must be
    /// non-negative; this aborts the batch instead of being retried.
    #[error("negative weight {weight} on edge {edge}")]
    NegativeEdgeWeight { edge: usize, weight: f64 },
    /// Batch configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A visited node carries no cell assignment or its cell has no node set.
    #[error("missing partition metadata for node {0}")]
    MissingCell(usize),
    /// A node id outside the graph was used as a search source.
    #[error("node {0} does not exist in the graph")]
    NoSuchNode(usize),
    /// A storage sink rejected a write, an index build, or a flush.
    #[error("storage failure: {0}")]
    Storage(String),
    /// The worker pool could not be constructed.
    #[error("worker pool construction failed: {0}")]
    Pool(String),
}
