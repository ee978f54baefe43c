//! Representation of a job and its status.

use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::core::common::NodeRange;

/// Status of a job.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
}

impl Display for JobStatus {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "queued"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Represents a unit of work requesting a fixed number of nodes for a fixed
/// number of ticks.
///
/// A job becomes running when the scheduler finds a topology-compliant
/// placement for it, otherwise it is queued. The queue is terminal in this
/// design: queued jobs are never retried. A running job completes once its
/// runtime reaches its duration, after which only the freed capacity and the
/// placement counters remain.
#[derive(Clone, Debug)]
pub struct Job {
    pub id: String,
    pub nodes_required: u32,
    pub duration: u64,
    current_runtime: u64,
    placement: Option<NodeRange>,
}

impl Job {
    /// Creates a job with the specified resource request.
    ///
    /// Panics if the request is degenerate (zero nodes or zero duration).
    pub fn new(id: &str, nodes_required: u32, duration: u64) -> Self {
        assert!(nodes_required > 0, "job {} requests zero nodes", id);
        assert!(duration > 0, "job {} has zero duration", id);
        Self {
            id: id.to_string(),
            nodes_required,
            duration,
            current_runtime: 0,
            placement: None,
        }
    }

    /// Returns the number of ticks the job has been running.
    pub fn current_runtime(&self) -> u64 {
        self.current_runtime
    }

    /// Advances the job runtime by one tick.
    pub fn advance_runtime(&mut self) {
        self.current_runtime += 1;
    }

    /// Returns true if the job has run for its whole duration.
    pub fn is_finished(&self) -> bool {
        self.current_runtime >= self.duration
    }

    /// Returns the exact node range granted to the job, if it is running.
    pub fn placement(&self) -> Option<NodeRange> {
        self.placement
    }

    /// Returns the current lifecycle status of the job.
    pub fn status(&self) -> JobStatus {
        if self.is_finished() {
            JobStatus::Completed
        } else if self.placement.is_some() {
            JobStatus::Running
        } else {
            JobStatus::Queued
        }
    }

    /// Records the node range granted to the job at allocation time.
    pub fn set_placement(&mut self, range: NodeRange) {
        self.placement = Some(range);
    }
}
