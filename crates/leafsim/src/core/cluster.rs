//! Cluster topology and occupancy state.

use indexmap::IndexMap;

use crate::core::common::{NodeRange, NodeState};
use crate::core::job::Job;

/// Stores the fixed cluster topology (node count, leaf domain size), the
/// per-node occupancy map and the registry of currently running jobs.
///
/// The occupancy is mutated only through [`ClusterState::mark_range`], which
/// is driven by the placement engine, so every write covers exactly one
/// recorded contiguous range.
#[derive(Clone)]
pub struct ClusterState {
    total_nodes: u32,
    nodes_per_leaf: u32,
    leaf_domains: u32,
    occupancy: Vec<NodeState>,
    running_jobs: IndexMap<String, Job>,
}

impl ClusterState {
    /// Creates cluster state with the specified topology.
    ///
    /// Panics on invalid topology: both sizes must be positive and the leaf
    /// domain size must evenly divide the node count, so that the leaf domain
    /// count is exact.
    pub fn new(total_nodes: u32, nodes_per_leaf: u32) -> Self {
        assert!(total_nodes > 0, "total_nodes must be positive");
        assert!(nodes_per_leaf > 0, "nodes_per_leaf must be positive");
        assert!(
            total_nodes % nodes_per_leaf == 0,
            "nodes_per_leaf {} does not evenly divide total_nodes {}",
            nodes_per_leaf,
            total_nodes
        );
        Self {
            total_nodes,
            nodes_per_leaf,
            leaf_domains: total_nodes / nodes_per_leaf,
            occupancy: vec![NodeState::Free; total_nodes as usize],
            running_jobs: IndexMap::new(),
        }
    }

    /// Returns the total number of nodes.
    pub fn total_nodes(&self) -> u32 {
        self.total_nodes
    }

    /// Returns the number of nodes attached to one leaf domain.
    pub fn nodes_per_leaf(&self) -> u32 {
        self.nodes_per_leaf
    }

    /// Returns the number of leaf domains.
    pub fn leaf_domains(&self) -> u32 {
        self.leaf_domains
    }

    /// Returns the occupancy states of all nodes.
    pub fn occupancy(&self) -> &[NodeState] {
        &self.occupancy
    }

    /// Returns the number of occupied nodes.
    pub fn occupied_count(&self) -> u32 {
        self.occupancy.iter().filter(|s| **s == NodeState::Occupied).count() as u32
    }

    /// Checks whether every node in the specified range is free.
    pub fn is_range_free(&self, range: NodeRange) -> bool {
        self.occupancy[range.indices()].iter().all(|s| *s == NodeState::Free)
    }

    /// Marks all nodes in the specified range with the specified state.
    ///
    /// This is the single occupancy mutator. Panics if the range does not fit
    /// inside the cluster.
    pub fn mark_range(&mut self, range: NodeRange, state: NodeState) {
        assert!(
            range.end() <= self.total_nodes,
            "node range {} is outside the cluster",
            range
        );
        for node in &mut self.occupancy[range.indices()] {
            *node = state;
        }
    }

    /// Returns the occupancy reshaped as [node within leaf][leaf domain] for
    /// display collaborators.
    pub fn occupancy_matrix(&self) -> Vec<Vec<NodeState>> {
        (0..self.nodes_per_leaf)
            .map(|node| {
                (0..self.leaf_domains)
                    .map(|leaf| self.occupancy[(leaf * self.nodes_per_leaf + node) as usize])
                    .collect()
            })
            .collect()
    }

    /// Returns running jobs keyed by ID, in arrival order.
    pub fn running_jobs(&self) -> &IndexMap<String, Job> {
        &self.running_jobs
    }

    /// Returns mutable access to the running jobs for the per-tick sweep.
    pub fn running_jobs_mut(&mut self) -> &mut IndexMap<String, Job> {
        &mut self.running_jobs
    }

    /// Returns the number of currently running jobs.
    pub fn active_job_count(&self) -> usize {
        self.running_jobs.len()
    }

    /// Registers a job as running.
    pub fn add_job(&mut self, job: Job) {
        self.running_jobs.insert(job.id.clone(), job);
    }

    /// Removes a running job, preserving the arrival order of the rest.
    ///
    /// Panics on unknown ID: job IDs are tracked entirely within the core, so
    /// a miss is a programming-invariant violation.
    pub fn remove_job(&mut self, id: &str) -> Job {
        self.running_jobs
            .shift_remove(id)
            .unwrap_or_else(|| panic!("unknown running job {}", id))
    }
}
