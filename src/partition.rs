//! Cell metadata: partition views, border flags, and cell-restricted
//! filtering.
//!
//! The partitioning itself happens upstream; this module only consumes its
//! output. Every node belongs to exactly one cell and is either a border or
//! an interior node.

use hashbrown::{HashMap, HashSet};

use crate::graph::{EdgeFilter, EdgeRef, NodeId};

/// Cell identifier assigned by the upstream partitioner.
pub type CellId = u32;
/// Node-set type used for cell membership and coverage targets.
pub type NodeSet = HashSet<NodeId>;

/// Read access to the partition produced by the upstream partitioner.
///
/// Implementors must be thread-safe; all batch workers share one view.
pub trait PartitionView: Sync {
    /// Cell owning `node`, or `None` if the partitioner never saw the node.
    fn cell_id(&self, node: NodeId) -> Option<CellId>;

    /// Whether `node` lies on its cell's boundary.
    fn is_border(&self, node: NodeId) -> bool;

    /// All cell ids, ascending.
    fn cell_ids(&self) -> Vec<CellId>;

    /// Full node set of `cell`.
    fn nodes_of_cell(&self, cell: CellId) -> Option<&NodeSet>;

    /// Boundary coordinates of `cell` as a flat interleaved
    /// `[lat, lon, lat, lon, ..]` sequence. Empty when no contour is known.
    fn contour(&self, cell: CellId) -> &[f64];
}

/// Border nodes of `cell`, ascending.
pub fn border_nodes_of_cell(partition: &impl PartitionView, cell: CellId) -> Vec<NodeId> {
    let mut nodes: Vec<NodeId> = partition
        .nodes_of_cell(cell)
        .map(|set| {
            set.iter()
                .copied()
                .filter(|&node| partition.is_border(node))
                .collect()
        })
        .unwrap_or_default();
    nodes.sort_unstable();
    nodes
}

/// Restricts traversal to edges that stay inside one cell.
///
/// Edges touching nodes at or above `max_node` are rejected as well, so a
/// search can be pinned to a graph snapshot smaller than the partition table.
pub struct CellEdgeFilter<'a, P> {
    partition: &'a P,
    cell: CellId,
    max_node: NodeId,
}

impl<'a, P: PartitionView> CellEdgeFilter<'a, P> {
    pub fn new(partition: &'a P, cell: CellId, max_node: NodeId) -> Self {
        Self {
            partition,
            cell,
            max_node,
        }
    }
}

impl<P: PartitionView> EdgeFilter for CellEdgeFilter<'_, P> {
    fn accept(&self, edge: &EdgeRef) -> bool {
        if edge.source >= self.max_node || edge.target >= self.max_node {
            return false;
        }
        self.partition.cell_id(edge.source) == Some(self.cell)
            && self.partition.cell_id(edge.target) == Some(self.cell)
    }
}

/// In-memory partition table, the shape the upstream partitioner's output
/// takes in tests and small deployments.
#[derive(Debug, Default, Clone)]
pub struct CellPartition {
    cells: HashMap<NodeId, CellId>,
    border: NodeSet,
    members: HashMap<CellId, NodeSet>,
    contours: HashMap<CellId, Vec<f64>>,
}

impl CellPartition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `node` to `cell`, moving it out of any previous cell.
    pub fn assign(&mut self, node: NodeId, cell: CellId) {
        if let Some(previous) = self.cells.insert(node, cell) {
            if previous != cell {
                if let Some(set) = self.members.get_mut(&previous) {
                    set.remove(&node);
                }
            }
        }
        self.members.entry(cell).or_default().insert(node);
    }

    /// Flags `node` as a border node.
    pub fn set_border(&mut self, node: NodeId) {
        self.border.insert(node);
    }

    /// Records the flat `[lat, lon, ..]` contour sequence for `cell`.
    pub fn set_contour(&mut self, cell: CellId, coordinates: Vec<f64>) {
        self.contours.insert(cell, coordinates);
    }

    pub fn node_count(&self) -> usize {
        self.cells.len()
    }
}

impl PartitionView for CellPartition {
    fn cell_id(&self, node: NodeId) -> Option<CellId> {
        self.cells.get(&node).copied()
    }

    fn is_border(&self, node: NodeId) -> bool {
        self.border.contains(&node)
    }

    fn cell_ids(&self) -> Vec<CellId> {
        let mut ids: Vec<CellId> = self.members.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn nodes_of_cell(&self, cell: CellId) -> Option<&NodeSet> {
        self.members.get(&cell)
    }

    fn contour(&self, cell: CellId) -> &[f64] {
        self.contours.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }
}
