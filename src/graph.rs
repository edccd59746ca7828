//! Traversal-facing graph abstractions.
//!
//! The road graph, its weight model, and edge filters are owned by the
//! embedding system; this module fixes the read-only contracts the searches
//! consume. All traits are `Sync` since many searches run concurrently
//! against one shared graph. An in-memory [`AdjacencyGraph`] is provided for
//! tests and small deployments.

/// Node identifier, dense in `0..node_count`.
pub type NodeId = usize;
/// Edge identifier assigned by the graph.
pub type EdgeId = usize;

/// A directed traversal of a single edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRef {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
}

/// Read-only graph view used by all searches.
///
/// Implementors must guarantee that iteration is safe for concurrent use and
/// does not mutate the graph.
pub trait TraversalGraph: Sync {
    /// Number of nodes; ids are dense in `0..node_count()`.
    fn node_count(&self) -> usize;

    /// Iterates the edges leaving `node`.
    fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeRef> + '_;
}

/// Edge-weight model.
///
/// Weights must be non-negative and deterministic for a given edge traversal.
/// `f64::INFINITY` marks an impassable edge and is skipped by the searches;
/// a negative weight aborts the search that observes it.
pub trait Weighting: Sync {
    fn weight(&self, edge: &EdgeRef) -> f64;
}

/// Predicate deciding whether a search may traverse an edge.
pub trait EdgeFilter: Sync {
    fn accept(&self, edge: &EdgeRef) -> bool;
}

impl<F: Fn(&EdgeRef) -> bool + Sync> EdgeFilter for F {
    fn accept(&self, edge: &EdgeRef) -> bool {
        self(edge)
    }
}

/// Filter that accepts every edge.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAllEdges;

impl EdgeFilter for AcceptAllEdges {
    fn accept(&self, _edge: &EdgeRef) -> bool {
        true
    }
}

/// Logical AND over a list of filters. An empty sequence accepts everything.
#[derive(Default)]
pub struct FilterSequence<'a> {
    filters: Vec<&'a dyn EdgeFilter>,
}

impl<'a> FilterSequence<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a filter and returns the sequence.
    pub fn with(mut self, filter: &'a dyn EdgeFilter) -> Self {
        self.filters.push(filter);
        self
    }
}

impl EdgeFilter for FilterSequence<'_> {
    fn accept(&self, edge: &EdgeRef) -> bool {
        self.filters.iter().all(|f| f.accept(edge))
    }
}

/// In-memory adjacency-list graph with stored per-edge weights.
///
/// Edge ids are assigned in insertion order; [`StoredWeights`] exposes the
/// stored weights as a [`Weighting`].
#[derive(Debug, Default, Clone)]
pub struct AdjacencyGraph {
    adjacency: Vec<Vec<(NodeId, EdgeId)>>,
    weights: Vec<f64>,
}

impl AdjacencyGraph {
    pub fn with_nodes(nodes: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); nodes],
            weights: Vec::new(),
        }
    }

    /// Adds a directed edge and returns its id. Grows the node range if
    /// either endpoint is out of bounds.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId, weight: f64) -> EdgeId {
        let needed = source.max(target) + 1;
        if needed > self.adjacency.len() {
            self.adjacency.resize_with(needed, Vec::new);
        }
        let id = self.weights.len();
        self.weights.push(weight);
        self.adjacency[source].push((target, id));
        id
    }

    /// Adds directed edges in both directions with the same weight.
    pub fn add_bidirectional_edge(
        &mut self,
        a: NodeId,
        b: NodeId,
        weight: f64,
    ) -> (EdgeId, EdgeId) {
        (self.add_edge(a, b, weight), self.add_edge(b, a, weight))
    }

    pub fn edge_count(&self) -> usize {
        self.weights.len()
    }

    /// Weighting backed by the stored per-edge weights.
    pub fn stored_weights(&self) -> StoredWeights<'_> {
        StoredWeights {
            weights: &self.weights,
        }
    }
}

impl TraversalGraph for AdjacencyGraph {
    fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeRef> + '_ {
        self.adjacency
            .get(node)
            .into_iter()
            .flatten()
            .map(move |&(target, id)| EdgeRef {
                id,
                source: node,
                target,
            })
    }
}

/// [`Weighting`] reading the weights stored in an [`AdjacencyGraph`].
#[derive(Debug, Clone, Copy)]
pub struct StoredWeights<'a> {
    weights: &'a [f64],
}

impl Weighting for StoredWeights<'_> {
    fn weight(&self, edge: &EdgeRef) -> f64 {
        self.weights.get(edge.id).copied().unwrap_or(f64::INFINITY)
    }
}
