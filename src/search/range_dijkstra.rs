//! Weight-bounded, coverage-tracking Dijkstra restricted to a cell.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use hashbrown::HashMap;

use crate::error::ReachError;
use crate::graph::{EdgeFilter, NodeId, TraversalGraph, Weighting};
use crate::partition::NodeSet;

use super::HeapEntry;

/// Single-source Dijkstra with an edge filter, a visited-node budget, and
/// early termination once an accepted fraction of a relevant-node set has
/// been settled.
///
/// One instance drives exactly one search. Callers running the two-phase
/// retry policy construct a fresh instance per phase so no queue or distance
/// state leaks between runs.
///
/// The search additionally counts how many nodes of the configured cell node
/// set it settles; callers divide by the cell size to obtain the coverage
/// ratio that drives retries and the fully-reachable flag.
pub struct RangeDijkstra<'a, G, W, F> {
    graph: &'a G,
    weighting: &'a W,
    filter: F,
    cell_nodes: Option<&'a NodeSet>,
    max_visited: usize,
    acceptance: f64,
    found_cell_nodes: usize,
    visited: usize,
}

impl<'a, G, W, F> RangeDijkstra<'a, G, W, F>
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
            cell_nodes: None,
            max_visited: usize::MAX,
            acceptance: 1.0,
            found_cell_nodes: 0,
            visited: 0,
        }
    }

    /// Counts settled nodes against this cell node set.
    pub fn with_cell_nodes(mut self, nodes: &'a NodeSet) -> Self {
        self.cell_nodes = Some(nodes);
        self
    }

    /// Hard cap on settled nodes. The search stops once the cap is reached,
    /// whatever its coverage; mandatory for liveness on unbounded graphs.
    pub fn with_max_visited(mut self, budget: usize) -> Self {
        self.max_visited = budget;
        self
    }

    /// Fraction of the relevant set that must settle before the search may
    /// stop early.
    pub fn with_acceptance(mut self, acceptance: f64) -> Self {
        self.acceptance = acceptance;
        self
    }

    /// Settled nodes belonging to the configured cell node set.
    pub fn found_cell_nodes(&self) -> usize {
        self.found_cell_nodes
    }

    /// Total settled nodes.
    pub fn visited_nodes(&self) -> usize {
        self.visited
    }

    /// Runs the search from `source` and returns the maximum settled
    /// shortest-path weight over `relevant`.
    ///
    /// Nodes settled outside the relevant set never contribute to the
    /// result, so a search allowed to leave its cell cannot inflate the
    /// eccentricity with out-of-cell distances. If nothing relevant settles
    /// within the budget the result is `0.0`; callers detect that case
    /// through [`found_cell_nodes`](Self::found_cell_nodes).
    pub fn calc_max_weight(
        &mut self,
        source: NodeId,
        relevant: &NodeSet,
    ) -> Result<f64, ReachError> {
        if source >= self.graph.node_count() {
            return Err(ReachError::NoSuchNode(source));
        }

        let mut best: HashMap<NodeId, f64> = HashMap::new();
        let mut settled = NodeSet::default();
        let mut queue: BinaryHeap<Reverse<HeapEntry>> = BinaryHeap::new();
        best.insert(source, 0.0);
        queue.push(Reverse(HeapEntry {
            weight: 0.0,
            node: source,
        }));

        let mut settled_relevant = 0usize;
        let mut max_weight = 0.0f64;

        while let Some(Reverse(HeapEntry { weight, node })) = queue.pop() {
            if !settled.insert(node) {
                continue;
            }
            self.visited += 1;
            if self.cell_nodes.is_some_and(|cell| cell.contains(&node)) {
                self.found_cell_nodes += 1;
            }
            if relevant.contains(&node) {
                settled_relevant += 1;
                if weight > max_weight {
                    max_weight = weight;
                }
                if settled_relevant as f64 / relevant.len() as f64 >= self.acceptance {
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

        Ok(max_weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{AcceptAllEdges, AdjacencyGraph, EdgeRef};

    /// 0 -1- 1 -2- 2 -4- 3, all bidirectional.
    fn path_graph() -> AdjacencyGraph {
        let mut g = AdjacencyGraph::with_nodes(4);
        g.add_bidirectional_edge(0, 1, 1.0);
        g.add_bidirectional_edge(1, 2, 2.0);
        g.add_bidirectional_edge(2, 3, 4.0);
        g
    }

    fn all_nodes(n: usize) -> NodeSet {
        (0..n).collect()
    }

    #[test]
    fn max_weight_over_relevant_set() {
        let g = path_graph();
        let w = g.stored_weights();
        let relevant = all_nodes(4);
        let mut search = RangeDijkstra::new(&g, &w, AcceptAllEdges).with_cell_nodes(&relevant);
        let max = search.calc_max_weight(0, &relevant).unwrap();
        assert_eq!(max, 7.0);
        assert_eq!(search.found_cell_nodes(), 4);
        assert_eq!(search.visited_nodes(), 4);
    }

    #[test]
    fn relevant_subset_bounds_the_result() {
        let g = path_graph();
        let w = g.stored_weights();
        let relevant: NodeSet = [0, 1, 2].into_iter().collect();
        let mut search = RangeDijkstra::new(&g, &w, AcceptAllEdges);
        let max = search.calc_max_weight(0, &relevant).unwrap();
        // node 3 settles last and is not relevant, so the search stops at
        // full relevant coverage without ever contributing its distance
        assert_eq!(max, 3.0);
        assert_eq!(search.visited_nodes(), 3);
    }

    #[test]
    fn budget_stops_the_search() {
        let g = path_graph();
        let w = g.stored_weights();
        let relevant = all_nodes(4);
        let mut search = RangeDijkstra::new(&g, &w, AcceptAllEdges)
            .with_cell_nodes(&relevant)
            .with_max_visited(2);
        let max = search.calc_max_weight(0, &relevant).unwrap();
        assert_eq!(search.visited_nodes(), 2);
        assert_eq!(search.found_cell_nodes(), 2);
        assert_eq!(max, 1.0);
    }

    #[test]
    fn filter_confines_the_search() {
        let g = path_graph();
        let w = g.stored_weights();
        let relevant = all_nodes(4);
        let below_two = |e: &EdgeRef| e.source < 2 && e.target < 2;
        let mut search = RangeDijkstra::new(&g, &w, below_two).with_cell_nodes(&relevant);
        let max = search.calc_max_weight(0, &relevant).unwrap();
        assert_eq!(max, 1.0);
        assert_eq!(search.found_cell_nodes(), 2);
    }

    #[test]
    fn lenient_acceptance_exits_early() {
        let g = path_graph();
        let w = g.stored_weights();
        let relevant = all_nodes(4);
        let mut search = RangeDijkstra::new(&g, &w, AcceptAllEdges)
            .with_cell_nodes(&relevant)
            .with_acceptance(0.5);
        let max = search.calc_max_weight(0, &relevant).unwrap();
        // half of the four relevant nodes settle, then the search stops
        assert_eq!(search.visited_nodes(), 2);
        assert_eq!(max, 1.0);
    }

    #[test]
    fn negative_weight_is_fatal() {
        let mut g = AdjacencyGraph::with_nodes(2);
        g.add_edge(0, 1, -1.0);
        let w = g.stored_weights();
        let relevant = all_nodes(2);
        let mut search = RangeDijkstra::new(&g, &w, AcceptAllEdges);
        let err = search.calc_max_weight(0, &relevant).unwrap_err();
        assert!(matches!(err, ReachError::NegativeEdgeWeight { .. }));
    }

    #[test]
    fn infinite_weight_edges_are_impassable() {
        let mut g = AdjacencyGraph::with_nodes(3);
        g.add_edge(0, 1, 1.0);
        g.add_edge(1, 2, f64::INFINITY);
        let w = g.stored_weights();
        let relevant = all_nodes(3);
        let mut search = RangeDijkstra::new(&g, &w, AcceptAllEdges).with_cell_nodes(&relevant);
        let max = search.calc_max_weight(0, &relevant).unwrap();
        assert_eq!(max, 1.0);
        assert_eq!(search.found_cell_nodes(), 2);
    }

    #[test]
    fn isolated_source_settles_only_itself() {
        let g = AdjacencyGraph::with_nodes(3);
        let w = g.stored_weights();
        let relevant = all_nodes(3);
        let mut search = RangeDijkstra::new(&g, &w, AcceptAllEdges).with_cell_nodes(&relevant);
        let max = search.calc_max_weight(0, &relevant).unwrap();
        assert_eq!(max, 0.0);
        assert_eq!(search.found_cell_nodes(), 1);
    }

    #[test]
    fn unknown_source_is_an_error() {
        let g = path_graph();
        let w = g.stored_weights();
        let relevant = all_nodes(4);
        let mut search = RangeDijkstra::new(&g, &w, AcceptAllEdges);
        assert_eq!(
            search.calc_max_weight(11, &relevant),
            Err(ReachError::NoSuchNode(11))
        );
    }
}
