//! Result sinks for eccentricity and border-distance records.
//!
//! The persistent byte layout belongs to the embedding system; the traits
//! here fix the write protocol instead. One store instance is scoped to one
//! weighting. Between `init` and `build_index` the per-node setters are
//! called concurrently by the batch workers, each node written by exactly
//! one task; all shared bookkeeping happens in `build_index` and `flush`
//! after the workers have joined. `init` discards prior contents, so a
//! failed batch is recovered by re-running, never by appending.
//!
//! [`MemoryEccentricityStore`] and [`MemoryBorderDistanceStore`] give the
//! reference behavior and back the test suite.

use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::ReachError;
use crate::graph::NodeId;

/// Sparse distances from one border node to the other border nodes of its
/// cell, parallel arrays sorted by target id. The node's own entry is
/// excluded; unreachable targets carry `f64::INFINITY`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BorderDistanceSet {
    pub node_ids: Vec<NodeId>,
    pub distances: Vec<f64>,
}

impl BorderDistanceSet {
    pub fn len(&self) -> usize {
        self.node_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_ids.is_empty()
    }

    /// Distance to `target`, if the record holds one.
    pub fn distance_to(&self, target: NodeId) -> Option<f64> {
        self.node_ids
            .iter()
            .position(|&id| id == target)
            .map(|i| self.distances[i])
    }
}

/// Sink for per-border-node eccentricity records.
pub trait EccentricityStore: Sync {
    /// True once a completed batch has been flushed into this store.
    fn exists(&self) -> bool;

    /// Clears all records and the index; prior contents are discarded.
    fn init(&self) -> Result<(), ReachError>;

    fn set_eccentricity(&self, node: NodeId, value: f64) -> Result<(), ReachError>;

    fn set_fully_reachable(&self, node: NodeId, flag: bool) -> Result<(), ReachError>;

    /// Builds the border-node lookup index. Called once, after all writes.
    fn build_index(&self) -> Result<(), ReachError>;

    /// Makes the records durable and observable through [`exists`](Self::exists).
    fn flush(&self) -> Result<(), ReachError>;
}

/// Sink for per-border-node distance records.
pub trait BorderDistanceStore: Sync {
    fn exists(&self) -> bool;

    fn init(&self) -> Result<(), ReachError>;

    fn set_distances(&self, node: NodeId, distances: BorderDistanceSet) -> Result<(), ReachError>;

    fn build_index(&self) -> Result<(), ReachError>;

    fn flush(&self) -> Result<(), ReachError>;
}

/// In-memory eccentricity store.
#[derive(Debug, Default)]
pub struct MemoryEccentricityStore {
    eccentricities: DashMap<NodeId, f64>,
    fully_reachable: DashMap<NodeId, bool>,
    index: RwLock<Vec<NodeId>>,
    flushed: AtomicBool,
}

impl MemoryEccentricityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eccentricity(&self, node: NodeId) -> Option<f64> {
        self.eccentricities.get(&node).map(|e| *e)
    }

    pub fn fully_reachable(&self, node: NodeId) -> Option<bool> {
        self.fully_reachable.get(&node).map(|f| *f)
    }

    /// Indexed border nodes, ascending. Empty before `build_index`.
    pub fn border_nodes(&self) -> Vec<NodeId> {
        self.index.read().clone()
    }
}

impl EccentricityStore for MemoryEccentricityStore {
    fn exists(&self) -> bool {
        self.flushed.load(Ordering::Acquire)
    }

    fn init(&self) -> Result<(), ReachError> {
        self.eccentricities.clear();
        self.fully_reachable.clear();
        self.index.write().clear();
        self.flushed.store(false, Ordering::Release);
        Ok(())
    }

    fn set_eccentricity(&self, node: NodeId, value: f64) -> Result<(), ReachError> {
        self.eccentricities.insert(node, value);
        Ok(())
    }

    fn set_fully_reachable(&self, node: NodeId, flag: bool) -> Result<(), ReachError> {
        self.fully_reachable.insert(node, flag);
        Ok(())
    }

    fn build_index(&self) -> Result<(), ReachError> {
        let mut nodes: Vec<NodeId> = self.eccentricities.iter().map(|e| *e.key()).collect();
        nodes.sort_unstable();
        *self.index.write() = nodes;
        Ok(())
    }

    fn flush(&self) -> Result<(), ReachError> {
        self.flushed.store(true, Ordering::Release);
        Ok(())
    }
}

/// In-memory border-distance store.
#[derive(Debug, Default)]
pub struct MemoryBorderDistanceStore {
    records: DashMap<NodeId, BorderDistanceSet>,
    index: RwLock<Vec<NodeId>>,
    flushed: AtomicBool,
}

impl MemoryBorderDistanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn distances(&self, node: NodeId) -> Option<BorderDistanceSet> {
        self.records.get(&node).map(|r| r.clone())
    }

    /// Indexed border nodes, ascending. Empty before `build_index`.
    pub fn border_nodes(&self) -> Vec<NodeId> {
        self.index.read().clone()
    }
}

impl BorderDistanceStore for MemoryBorderDistanceStore {
    fn exists(&self) -> bool {
        self.flushed.load(Ordering::Acquire)
    }

    fn init(&self) -> Result<(), ReachError> {
        self.records.clear();
        self.index.write().clear();
        self.flushed.store(false, Ordering::Release);
        Ok(())
    }

    fn set_distances(&self, node: NodeId, distances: BorderDistanceSet) -> Result<(), ReachError> {
        self.records.insert(node, distances);
        Ok(())
    }

    fn build_index(&self) -> Result<(), ReachError> {
        let mut nodes: Vec<NodeId> = self.records.iter().map(|r| *r.key()).collect();
        nodes.sort_unstable();
        *self.index.write() = nodes;
        Ok(())
    }

    fn flush(&self) -> Result<(), ReachError> {
        self.flushed.store(true, Ordering::Release);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eccentricity_store_lifecycle() {
        let store = MemoryEccentricityStore::new();
        assert!(!store.exists());
        store.init().unwrap();
        store.set_eccentricity(7, 2.5).unwrap();
        store.set_eccentricity(3, 1.0).unwrap();
        store.set_fully_reachable(7, true).unwrap();
        store.build_index().unwrap();
        store.flush().unwrap();

        assert!(store.exists());
        assert_eq!(store.eccentricity(7), Some(2.5));
        assert_eq!(store.fully_reachable(7), Some(true));
        assert_eq!(store.border_nodes(), vec![3, 7]);
    }

    #[test]
    fn init_discards_previous_records() {
        let store = MemoryEccentricityStore::new();
        store.set_eccentricity(1, 9.0).unwrap();
        store.build_index().unwrap();
        store.flush().unwrap();

        store.init().unwrap();
        assert!(!store.exists());
        assert_eq!(store.eccentricity(1), None);
        assert!(store.border_nodes().is_empty());
    }

    #[test]
    fn distance_set_lookup() {
        let set = BorderDistanceSet {
            node_ids: vec![2, 5],
            distances: vec![1.5, f64::INFINITY],
        };
        assert_eq!(set.len(), 2);
        assert_eq!(set.distance_to(2), Some(1.5));
        assert_eq!(set.distance_to(5), Some(f64::INFINITY));
        assert_eq!(set.distance_to(9), None);
    }

    #[test]
    fn border_distance_store_lifecycle() {
        let store = MemoryBorderDistanceStore::new();
        store.init().unwrap();
        store
            .set_distances(
                4,
                BorderDistanceSet {
                    node_ids: vec![6],
                    distances: vec![3.0],
                },
            )
            .unwrap();
        store.build_index().unwrap();
        store.flush().unwrap();

        assert!(store.exists());
        assert_eq!(store.distances(4).unwrap().distance_to(6), Some(3.0));
        assert_eq!(store.border_nodes(), vec![4]);
        assert_eq!(store.distances(6), None);
    }

    #[test]
    fn distance_set_serde_round_trip() {
        let set = BorderDistanceSet {
            node_ids: vec![1, 8],
            distances: vec![0.5, 2.25],
        };
        let json = serde_json::to_string(&set).unwrap();
        let back: BorderDistanceSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
