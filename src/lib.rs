//! # cell-reach
//!
//! cell-reach precomputes auxiliary shortest-path metrics over a partitioned
//! road graph so that isochrone (reachability-area) queries can later be
//! answered without a full shortest-path search from scratch. For every cell
//! of the partition it computes the eccentricity of each border node, the
//! maximum shortest-path weight into the cell's reachable contour, and the
//! pairwise shortest-path distances between the cell's border nodes. Both
//! result families are written into pluggable storage sinks for reuse by the
//! downstream query engine.
//!
//! ## Features
//! - Range-limited Dijkstra with edge filtering, visited-node budgets, and
//!   coverage-based early termination
//! - Two-phase retry policy: strict in-cell search first, relaxed
//!   out-of-cell fallback on coverage shortfall
//! - One-to-many border-distance search per cell
//! - Contour-based relevant-node resolution through an optional spatial index
//! - Rayon-backed batch orchestration with fail-fast error propagation
//!
//! ## Determinism
//!
//! Search results are a function of graph, weighting, and partition alone.
//! The priority queue tie-breaks on node id and every worker writes a
//! disjoint storage slot, so rerunning a batch on unchanged inputs yields
//! bit-identical records regardless of thread scheduling.
//!
//! ## Usage
//! Add `cell-reach` as a dependency in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! cell-reach = "0.3"
//! ```
//!
//! The graph, weighting, partition, and storage sinks are consumed through
//! the traits in [`graph`], [`partition`], and [`storage`]; in-memory
//! implementations of each are included for tests and small deployments.

pub mod compute;
pub mod config;
pub mod contour;
pub mod error;
pub mod graph;
pub mod partition;
pub mod search;
pub mod storage;

pub use config::ReachConfig;
pub use error::ReachError;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::compute::{BorderDistanceComputation, EccentricityComputation};
    pub use crate::config::ReachConfig;
    pub use crate::contour::{LinearNodeIndex, SpatialIndex, relevant_node_sets, relevant_nodes};
    pub use crate::error::ReachError;
    pub use crate::graph::{
        AcceptAllEdges, AdjacencyGraph, EdgeFilter, EdgeId, EdgeRef, FilterSequence, NodeId,
        StoredWeights, TraversalGraph, Weighting,
    };
    pub use crate::partition::{
        CellEdgeFilter, CellId, CellPartition, NodeSet, PartitionView, border_nodes_of_cell,
    };
    pub use crate::search::{DijkstraOneToMany, PathEntry, RangeDijkstra};
    pub use crate::storage::{
        BorderDistanceSet, BorderDistanceStore, EccentricityStore, MemoryBorderDistanceStore,
        MemoryEccentricityStore,
    };
}
