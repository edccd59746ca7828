//! Relevant-node resolution for eccentricity coverage.
//!
//! The coverage target of an eccentricity search is either the full node set
//! of a cell or, when a spatial index is available, the cell nodes nearest to
//! the cell's contour coordinates. The contour variant keeps search cost
//! bounded on very large cells while still measuring coverage against
//! boundary-representative points.

use itertools::Itertools;
use rayon::prelude::*;

use crate::graph::NodeId;
use crate::partition::{CellId, NodeSet, PartitionView};

/// Snaps coordinates to graph nodes.
///
/// Backed by a real spatial index in production; [`LinearNodeIndex`] gives
/// the exact reference behavior.
pub trait SpatialIndex: Sync {
    /// Nearest node accepted by `filter`, or `None` if no candidate matches.
    fn nearest_node(&self, lat: f64, lon: f64, filter: &dyn Fn(NodeId) -> bool) -> Option<NodeId>;
}

/// Coverage target set for one cell.
///
/// Without an index this is a copy of the cell's full node set. With one,
/// each contour `(lat, lon)` pair is snapped to the nearest node of the same
/// cell; duplicates collapse.
pub fn relevant_nodes(
    partition: &impl PartitionView,
    cell: CellId,
    index: Option<&dyn SpatialIndex>,
) -> NodeSet {
    let Some(index) = index else {
        return partition
            .nodes_of_cell(cell)
            .cloned()
            .unwrap_or_default();
    };
    let in_cell = |node: NodeId| partition.cell_id(node) == Some(cell);
    let mut nodes = NodeSet::default();
    for (lat, lon) in partition.contour(cell).iter().copied().tuples() {
        if let Some(node) = index.nearest_node(lat, lon, &in_cell) {
            nodes.insert(node);
        }
    }
    nodes
}

/// Relevant-node sets for every cell, resolved once per batch.
pub fn relevant_node_sets(
    partition: &impl PartitionView,
    index: Option<&dyn SpatialIndex>,
) -> hashbrown::HashMap<CellId, NodeSet> {
    let cells = partition.cell_ids();
    let sets: Vec<(CellId, NodeSet)> = cells
        .par_iter()
        .map(|&cell| (cell, relevant_nodes(partition, cell, index)))
        .collect();
    sets.into_iter().collect()
}

/// Exact nearest-node lookup by linear scan over registered coordinates.
///
/// Distances are squared coordinate deltas, which is sufficient for picking
/// the closest of a handful of in-cell candidates.
#[derive(Debug, Default, Clone)]
pub struct LinearNodeIndex {
    coordinates: Vec<(f64, f64)>,
}

impl LinearNodeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the coordinate of `node`. Unregistered nodes are never
    /// returned from lookups.
    pub fn set_coordinate(&mut self, node: NodeId, lat: f64, lon: f64) {
        if node >= self.coordinates.len() {
            self.coordinates.resize(node + 1, (f64::NAN, f64::NAN));
        }
        self.coordinates[node] = (lat, lon);
    }
}

impl SpatialIndex for LinearNodeIndex {
    fn nearest_node(&self, lat: f64, lon: f64, filter: &dyn Fn(NodeId) -> bool) -> Option<NodeId> {
        self.coordinates
            .iter()
            .enumerate()
            .filter(|(node, (nlat, _))| nlat.is_finite() && filter(*node))
            .min_by(|(_, a), (_, b)| {
                let da = (a.0 - lat).powi(2) + (a.1 - lon).powi(2);
                let db = (b.0 - lat).powi(2) + (b.1 - lon).powi(2);
                da.total_cmp(&db)
            })
            .map(|(node, _)| node)
    }
}
