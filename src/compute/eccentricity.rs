//! Eccentricity batch computation over all border nodes.
//!
//! For every border node the maximum shortest-path weight into its cell's
//! relevant-node set is computed with a two-phase [`RangeDijkstra`] policy:
//! a strict search confined to the cell first, then a relaxed retry that may
//! leave the cell when the strict phase settled too little of it. Cells with
//! unreachable pockets simply end up flagged as not fully reachable; only
//! genuine failures (negative weights, missing metadata, storage errors)
//! abort the batch.

use hashbrown::HashMap;
use rayon::prelude::*;

use crate::config::ReachConfig;
use crate::contour::{SpatialIndex, relevant_node_sets};
use crate::error::ReachError;
use crate::graph::{EdgeFilter, FilterSequence, NodeId, TraversalGraph, Weighting};
use crate::partition::{CellEdgeFilter, CellId, NodeSet, PartitionView};
use crate::search::RangeDijkstra;
use crate::storage::EccentricityStore;

use super::worker_pool;

/// Orchestrates one eccentricity batch for one weighting.
pub struct EccentricityComputation<'a, G, W, P, S> {
    graph: &'a G,
    weighting: &'a W,
    base_filter: &'a dyn EdgeFilter,
    partition: &'a P,
    spatial_index: Option<&'a dyn SpatialIndex>,
    store: &'a S,
    config: ReachConfig,
}

impl<'a, G, W, P, S> EccentricityComputation<'a, G, W, P, S>
where
    G: TraversalGraph,
    W: Weighting,
    P: PartitionView,
    S: EccentricityStore,
{
    pub fn new(
        graph: &'a G,
        weighting: &'a W,
        base_filter: &'a dyn EdgeFilter,
        partition: &'a P,
        store: &'a S,
        config: ReachConfig,
    ) -> Self {
        Self {
            graph,
            weighting,
            base_filter,
            partition,
            spatial_index: None,
            store,
            config,
        }
    }

    /// Resolves coverage targets from contour coordinates instead of full
    /// cell node sets.
    pub fn with_spatial_index(mut self, index: &'a dyn SpatialIndex) -> Self {
        self.spatial_index = Some(index);
        self
    }

    /// Computes and stores `(eccentricity, fully_reachable)` for every
    /// border node, then builds the index and flushes the store.
    ///
    /// A store that already holds a flushed batch is left untouched. On the
    /// first worker failure the batch aborts with that error; records
    /// written by other workers remain and the store must be re-run from
    /// `init` to be trusted again.
    pub fn run(&self) -> Result<(), ReachError> {
        self.config.validate()?;
        if self.store.exists() {
            log::info!("eccentricities already stored, skipping recomputation");
            return Ok(());
        }
        self.store.init()?;

        // one spatial lookup pass per cell, not per border node
        let relevant_sets = relevant_node_sets(self.partition, self.spatial_index);
        let border_nodes: Vec<NodeId> = (0..self.graph.node_count())
            .filter(|&node| self.partition.is_border(node))
            .collect();
        log::info!(
            "computing eccentricities for {} border nodes in {} cells",
            border_nodes.len(),
            relevant_sets.len()
        );

        let pool = worker_pool(&self.config)?;
        pool.install(|| {
            border_nodes
                .par_iter()
                .try_for_each(|&node| self.compute_node(node, &relevant_sets))
        })?;

        self.store.build_index()?;
        self.store.flush()?;
        log::info!("eccentricity batch complete");
        Ok(())
    }

    fn compute_node(
        &self,
        node: NodeId,
        relevant_sets: &HashMap<CellId, NodeSet>,
    ) -> Result<(), ReachError> {
        let cell = self
            .partition
            .cell_id(node)
            .ok_or(ReachError::MissingCell(node))?;
        let cell_nodes = self
            .partition
            .nodes_of_cell(cell)
            .ok_or(ReachError::MissingCell(node))?;
        let relevant = relevant_sets
            .get(&cell)
            .ok_or(ReachError::MissingCell(node))?;
        let budget = self.config.eccentricity_budget();

        // phase 1: confined to the cell, full coverage required
        let cell_filter = CellEdgeFilter::new(self.partition, cell, self.graph.node_count());
        let confined = FilterSequence::new()
            .with(self.base_filter)
            .with(&cell_filter);
        let mut search = RangeDijkstra::new(self.graph, self.weighting, confined)
            .with_cell_nodes(cell_nodes)
            .with_max_visited(budget)
            .with_acceptance(self.config.strict_acceptance);
        let mut eccentricity = search.calc_max_weight(node, relevant)?;
        let mut coverage = search.found_cell_nodes() as f64 / cell_nodes.len() as f64;

        if coverage < self.config.accepted_fully_reachable {
            // phase 2: drop the cell restriction, accept near-full coverage
            let relaxed = FilterSequence::new().with(self.base_filter);
            let mut search = RangeDijkstra::new(self.graph, self.weighting, relaxed)
                .with_cell_nodes(cell_nodes)
                .with_max_visited(budget)
                .with_acceptance(self.config.accepted_fully_reachable);
            eccentricity = search.calc_max_weight(node, relevant)?;
            coverage = search.found_cell_nodes() as f64 / cell_nodes.len() as f64;
        }

        let fully_reachable = coverage >= self.config.accepted_fully_reachable;
        if !fully_reachable {
            log::warn!(
                "border node {node}: cell {cell} coverage {coverage:.3} stays below acceptance"
            );
        }
        self.store.set_fully_reachable(node, fully_reachable)?;
        self.store.set_eccentricity(node, eccentricity)?;
        Ok(())
    }
}
