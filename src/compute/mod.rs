//! Parallel batch drivers for the precomputation stage.
//!
//! Both orchestrators enumerate independent work units, one per border node
//! or per cell, and drive them through a fixed-size worker pool created
//! fresh per invocation. Units touch disjoint storage slots, so they run
//! without coordination; the first failing unit aborts the batch and its
//! error is the batch result. Records already written by sibling units stay
//! in place, which is why every run starts from `init` on its store.

pub mod border_distance;
pub mod eccentricity;

pub use border_distance::BorderDistanceComputation;
pub use eccentricity::EccentricityComputation;

use crate::config::ReachConfig;
use crate::error::ReachError;

/// Worker pool for one batch invocation, sized to the configured thread cap
/// or the available hardware parallelism, whichever is smaller.
pub(crate) fn worker_pool(config: &ReachConfig) -> Result<rayon::ThreadPool, ReachError> {
    let hardware = std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1);
    let threads = config.max_threads.min(hardware);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| ReachError::Pool(e.to_string()))
}
