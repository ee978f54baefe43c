//! Topology-aware placement algorithms and the engine applying their decisions.

use dyn_clone::{clone_trait_object, DynClone};

use crate::core::cluster::ClusterState;
use crate::core::common::{NodeRange, NodeState};
use crate::core::config::parse_config_value;
use crate::core::job::Job;

/// Trait for implementation of placement algorithms.
///
/// The algorithm is defined as a function of the job's node request and the
/// current cluster occupancy, which returns the exact node range to grant or
/// `None` if no topology-compliant window is currently free. Not finding a
/// window is a normal outcome signaling "enqueue the job", not an error.
pub trait PlacementAlgorithm: DynClone {
    fn select_range(&self, job: &Job, cluster: &ClusterState) -> Option<NodeRange>;
}

clone_trait_object!(PlacementAlgorithm);

pub fn placement_algorithm_resolver(config_str: String) -> Box<dyn PlacementAlgorithm> {
    let (algorithm_name, _options) = parse_config_value(&config_str);
    match algorithm_name.as_str() {
        "FirstFit" => Box::new(FirstFit::new()),
        _ => panic!("Can't resolve: {}", config_str),
    }
}

////////////////////////////////////////////////////////////////////////////////

/// FirstFit algorithm, which grants the lowest-indexed window of consecutive
/// wholly free leaf domains that can contain the job.
///
/// The window is sized in whole leaf domains and may be larger than the job
/// needs; only the first `nodes_required` nodes of the window are granted, the
/// rest of the window stays free.
#[derive(Clone)]
pub struct FirstFit;

impl FirstFit {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for FirstFit {
    fn default() -> Self {
        Self::new()
    }
}

impl PlacementAlgorithm for FirstFit {
    fn select_range(&self, job: &Job, cluster: &ClusterState) -> Option<NodeRange> {
        if job.nodes_required > cluster.total_nodes() {
            return None;
        }
        let nodes_per_leaf = cluster.nodes_per_leaf();
        let leaves_needed = (job.nodes_required + nodes_per_leaf - 1) / nodes_per_leaf;
        if leaves_needed > cluster.leaf_domains() {
            return None;
        }
        for leaf in 0..=(cluster.leaf_domains() - leaves_needed) {
            let start_node = leaf * nodes_per_leaf;
            let window = NodeRange::new(start_node, leaves_needed * nodes_per_leaf);
            if cluster.is_range_free(window) {
                return Some(NodeRange::new(start_node, job.nodes_required));
            }
        }
        None
    }
}

////////////////////////////////////////////////////////////////////////////////

/// Applies placement decisions to the cluster state.
///
/// The engine is the only component that writes to the cluster occupancy, so
/// every grant and release acts on exactly one recorded contiguous range.
pub struct PlacementEngine {
    algorithm: Box<dyn PlacementAlgorithm>,
}

impl PlacementEngine {
    /// Creates engine with the specified placement algorithm.
    pub fn new(algorithm: Box<dyn PlacementAlgorithm>) -> Self {
        Self { algorithm }
    }

    /// Checks whether the job can be placed now. Does not mutate the cluster.
    pub fn can_place(&self, job: &Job, cluster: &ClusterState) -> bool {
        self.algorithm.select_range(job, cluster).is_some()
    }

    /// Tries to place the job, marking the granted range occupied.
    ///
    /// Returns the granted range, or `None` if no window is currently free.
    pub fn allocate(&self, job: &Job, cluster: &mut ClusterState) -> Option<NodeRange> {
        let range = self.algorithm.select_range(job, cluster)?;
        cluster.mark_range(range, NodeState::Occupied);
        Some(range)
    }

    /// Frees exactly the range granted to a completed job.
    pub fn release(&self, range: NodeRange, cluster: &mut ClusterState) {
        cluster.mark_range(range, NodeState::Free);
    }
}
