//! One-to-many Dijkstra used for border-to-border distance matrices.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use hashbrown::HashMap;

use crate::error::ReachError;
use crate::graph::{EdgeFilter, NodeId, TraversalGraph, Weighting};
use crate::partition::NodeSet;

use super::HeapEntry;

/// Settled search-tree entry for one target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathEntry {
    /// Terminal node of the settled path.
    pub node: NodeId,
    /// Accumulated shortest-path weight.
    pub weight: f64,
}

/// Single-source Dijkstra that stops once every node of an explicit target
/// set has been settled, or the visited-node budget runs out.
pub struct DijkstraOneToMany<'a, G, W, F> {
    graph: &'a G,
    weighting: &'a W,
    filter: F,
    max_visited: usize,
    visited: usize,
}

impl<'a, G, W, F> DijkstraOneToMany<'a, G, W, F>
where
    G: TraversalGraph,
    W: Weighting,
    F: EdgeFilter,
{
    pub fn new(graph: &'a G, weighting: &'a W, filter: F) -> Self {
        Self {
            graph,
            weighting,
            filter,
            max_visited: usize::MAX,
            visited: 0,
        }
    }

    /// Hard cap on settled nodes.
    pub fn with_max_visited(mut self, budget: usize) -> Self {
        self.max_visited = budget;
        self
    }

    /// Total settled nodes.
    pub fn visited_nodes(&self) -> usize {
        self.visited
    }

    /// Shortest paths from `source` to every node in `targets`.
    ///
    /// The result holds an entry per target settled within the budget;
    /// targets without an entry are unreachable under the filter or were cut
    /// off by the budget. A target equal to `source` settles at weight 0.
    pub fn calc_paths(
        &mut self,
        source: NodeId,
        targets: &[NodeId],
    ) -> Result<HashMap<NodeId, PathEntry>, ReachError> {
        if source >= self.graph.node_count() {
            return Err(ReachError::NoSuchNode(source));
        }

        let wanted: NodeSet = targets.iter().copied().collect();
        let mut found: HashMap<NodeId, PathEntry> = HashMap::with_capacity(wanted.len());
        let mut best: HashMap<NodeId, f64> = HashMap::new();
        let mut settled = NodeSet::default();
        let mut queue: BinaryHeap<Reverse<HeapEntry>> = BinaryHeap::new();
        best.insert(source, 0.0);
        queue.push(Reverse(HeapEntry {
            weight: 0.0,
            node: source,
        }));

        while let Some(Reverse(HeapEntry { weight, node })) = queue.pop() {
            if !settled.insert(node) {
                continue;
            }
            self.visited += 1;
            if wanted.contains(&node) {
                found.insert(node, PathEntry { node, weight });
                if found.len() == wanted.len() {
                    break;
                }
            }
            if self.visited >= self.max_visited {
                break;
            }

            for edge in self.graph.out_edges(node) {
                if !self.filter.accept(&edge) {
                    continue;
                }
                let edge_weight = self.weighting.weight(&edge);
                if edge_weight < 0.0 {
                    return Err(ReachError::NegativeEdgeWeight {
                        edge: edge.id,
                        weight: edge_weight,
                    });
                }
                if edge_weight.is_infinite() {
                    continue;
                }
                let candidate = weight + edge_weight;
                if settled.contains(&edge.target) {
                    continue;
                }
                let entry = best.entry(edge.target).or_insert(f64::INFINITY);
                if candidate < *entry {
                    *entry = candidate;
                    queue.push(Reverse(HeapEntry {
                        weight: candidate,
                        node: edge.target,
                    }));
                }
            }
        }

        Ok(found)
    }
}
