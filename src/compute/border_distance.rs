//! Border-to-border distance matrices, one work unit per cell.
//!
//! Every border node of a cell gets a sparse record holding its shortest
//! path weight to each other border node of the same cell. The searches run
//! under the base traversal filter only, so a pair of border nodes may be
//! connected through a neighboring cell.

use rayon::prelude::*;

use crate::config::ReachConfig;
use crate::error::ReachError;
use crate::graph::{EdgeFilter, TraversalGraph, Weighting};
use crate::partition::{CellId, PartitionView, border_nodes_of_cell};
use crate::search::DijkstraOneToMany;
use crate::storage::{BorderDistanceSet, BorderDistanceStore};

use super::worker_pool;

/// Orchestrates one border-distance batch for one weighting.
pub struct BorderDistanceComputation<'a, G, W, P, S> {
    graph: &'a G,
    weighting: &'a W,
    base_filter: &'a dyn EdgeFilter,
    partition: &'a P,
    store: &'a S,
    config: ReachConfig,
}

impl<'a, G, W, P, S> BorderDistanceComputation<'a, G, W, P, S>
where
    G: TraversalGraph,
    W: Weighting,
    P: PartitionView,
    S: BorderDistanceStore,
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
            store,
            config,
        }
    }

    /// Computes and stores the distance record of every border node, then
    /// builds the index and flushes the store.
    ///
    /// Same failure contract as the eccentricity batch: first worker error
    /// aborts, surviving sibling records are only trusted after a clean
    /// re-run.
    pub fn run(&self) -> Result<(), ReachError> {
        self.config.validate()?;
        if self.store.exists() {
            log::info!("border-node distances already stored, skipping recomputation");
            return Ok(());
        }
        self.store.init()?;

        let cells = self.partition.cell_ids();
        log::info!("computing border-node distances for {} cells", cells.len());

        let pool = worker_pool(&self.config)?;
        pool.install(|| cells.par_iter().try_for_each(|&cell| self.compute_cell(cell)))?;

        self.store.build_index()?;
        self.store.flush()?;
        log::info!("border-node distance batch complete");
        Ok(())
    }

    fn compute_cell(&self, cell: CellId) -> Result<(), ReachError> {
        let border = border_nodes_of_cell(self.partition, cell);
        log::debug!("cell {cell}: {} border nodes", border.len());
        let budget = self.config.border_distance_budget();

        for &node in &border {
            let filter = crate::graph::FilterSequence::new().with(self.base_filter);
            let mut search = DijkstraOneToMany::new(self.graph, self.weighting, filter)
                .with_max_visited(budget);
            let paths = search.calc_paths(node, &border)?;

            let mut node_ids = Vec::with_capacity(border.len().saturating_sub(1));
            let mut distances = Vec::with_capacity(border.len().saturating_sub(1));
            for &target in &border {
                if target == node {
                    continue;
                }
                node_ids.push(target);
                distances.push(match paths.get(&target) {
                    None => f64::INFINITY,
                    Some(entry) if entry.node == node => 0.0,
                    Some(entry) => entry.weight,
                });
            }
            self.store
                .set_distances(node, BorderDistanceSet { node_ids, distances })?;
        }
        Ok(())
    }
}
