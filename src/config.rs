//! Batch configuration for the precomputation stage.
//!
//! One [`ReachConfig`] value is passed into each orchestrator call; there is
//! no process-wide state. Defaults carry the empirically tuned constants of
//! the reference deployment and are not validated beyond basic sanity, so
//! callers working on unusual graph topologies should measure before trusting
//! them.

use serde::{Deserialize, Serialize};

use crate::error::ReachError;

/// Configuration for eccentricity and border-distance batch runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReachConfig {
    /// Upper bound on worker threads. The pool size is the minimum of this
    /// and the available hardware parallelism.
    pub max_threads: usize,
    /// Expected upper bound on the node count of a single cell. All
    /// visited-node budgets scale from this value.
    pub max_cell_nodes: usize,
    /// Budget factor for eccentricity searches.
    pub eccentricity_budget_factor: usize,
    /// Budget factor for border-distance searches. Larger than the
    /// eccentricity factor since one search must resolve many targets.
    pub border_distance_budget_factor: usize,
    /// Fraction of a cell's relevant nodes that must be settled for the cell
    /// to count as fully reachable from a border node.
    pub accepted_fully_reachable: f64,
    /// Acceptance required during the in-cell search phase.
    pub strict_acceptance: f64,
}

impl Default for ReachConfig {
    fn default() -> Self {
        Self {
            max_threads: 8,
            max_cell_nodes: 5000,
            eccentricity_budget_factor: 10,
            border_distance_budget_factor: 20,
            accepted_fully_reachable: 0.995,
            strict_acceptance: 1.0,
        }
    }
}

impl ReachConfig {
    /// Visited-node budget for a single eccentricity search.
    pub fn eccentricity_budget(&self) -> usize {
        self.max_cell_nodes * self.eccentricity_budget_factor
    }

    /// Visited-node budget for a single border-distance search.
    pub fn border_distance_budget(&self) -> usize {
        self.max_cell_nodes * self.border_distance_budget_factor
    }

    /// Checks the configuration before a batch run.
    ///
    /// Budgets and the thread cap must be positive, acceptance thresholds
    /// must lie in `(0, 1]`.
    pub fn validate(&self) -> Result<(), ReachError> {
        if self.max_threads == 0 {
            return Err(ReachError::InvalidConfig(
                "max_threads must be positive".into(),
            ));
        }
        if self.max_cell_nodes == 0
            || self.eccentricity_budget_factor == 0
            || self.border_distance_budget_factor == 0
        {
            return Err(ReachError::InvalidConfig(
                "node-visit budgets must be positive".into(),
            ));
        }
        for (name, value) in [
            ("accepted_fully_reachable", self.accepted_fully_reachable),
            ("strict_acceptance", self.strict_acceptance),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ReachError::InvalidConfig(format!(
                    "{name} must lie in (0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}
