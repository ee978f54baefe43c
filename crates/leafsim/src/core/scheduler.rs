//! Component performing placement of submitted jobs and the per-tick
//! completion sweep.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::core::cluster::ClusterState;
use crate::core::job::Job;
use crate::core::logger::Logger;
use crate::core::monitoring::{MetricsSample, Monitoring};
use crate::core::placement::{PlacementAlgorithm, PlacementEngine};

/// Scheduler processes job submissions by placing them on the cluster or
/// queueing them, and sweeps completed jobs once per tick.
///
/// Placement decisions are delegated to the configured placement algorithm
/// through the placement engine. The queue is terminal from the scheduler's
/// point of view: queued jobs are never retried when capacity frees up,
/// placement is attempted at submission time only. Callers wanting retries
/// must resubmit themselves.
pub struct Scheduler {
    cluster: Rc<RefCell<ClusterState>>,
    engine: PlacementEngine,
    monitoring: Rc<RefCell<Monitoring>>,
    logger: Rc<RefCell<Box<dyn Logger>>>,
    queue: VecDeque<Job>,
    successful_placements: u64,
    failed_placements: u64,
    ticks: u64,
}

impl Scheduler {
    /// Creates scheduler with the specified placement algorithm.
    pub fn new(
        cluster: Rc<RefCell<ClusterState>>,
        algorithm: Box<dyn PlacementAlgorithm>,
        monitoring: Rc<RefCell<Monitoring>>,
        logger: Rc<RefCell<Box<dyn Logger>>>,
    ) -> Self {
        Self {
            cluster,
            engine: PlacementEngine::new(algorithm),
            monitoring,
            logger,
            queue: VecDeque::new(),
            successful_placements: 0,
            failed_placements: 0,
            ticks: 0,
        }
    }

    /// Attempts immediate placement of the job.
    ///
    /// On success the job becomes running with its granted node range
    /// recorded, and the method returns true. On failure the job is appended
    /// to the queue and the method returns false. Cluster occupancy is
    /// mutated on success only.
    pub fn submit(&mut self, mut job: Job) -> bool {
        let mut cluster = self.cluster.borrow_mut();
        match self.engine.allocate(&job, &mut cluster) {
            Some(range) => {
                self.logger.borrow_mut().log_debug(
                    self.time(),
                    "scheduler",
                    format!("placed job {} on nodes {}", job.id, range),
                );
                job.set_placement(range);
                cluster.add_job(job);
                self.successful_placements += 1;
                true
            }
            None => {
                self.logger.borrow_mut().log_debug(
                    self.time(),
                    "scheduler",
                    format!("no free window for job {}, queued", job.id),
                );
                self.queue.push_back(job);
                self.failed_placements += 1;
                false
            }
        }
    }

    /// Performs one simulation tick: advances runtimes of all running jobs,
    /// then frees the exact node ranges of jobs that reached their duration.
    ///
    /// Completions are collected over a stable arrival-order snapshot, so
    /// simultaneously completing jobs are each freed exactly once. The queue
    /// is intentionally not consulted here (see the type docs).
    pub fn advance(&mut self) {
        self.ticks += 1;
        let mut cluster = self.cluster.borrow_mut();

        let mut completed = Vec::new();
        for (id, job) in cluster.running_jobs_mut() {
            job.advance_runtime();
            if job.is_finished() {
                completed.push(id.clone());
            }
        }

        for id in completed {
            let job = cluster.remove_job(&id);
            let range = job
                .placement()
                .unwrap_or_else(|| panic!("running job {} has no recorded placement", id));
            self.engine.release(range, &mut cluster);
            self.logger.borrow_mut().log_debug(
                self.time(),
                "scheduler",
                format!("job {} completed, freed nodes {}", id, range),
            );
        }
    }

    /// Takes an aggregate snapshot of cluster and queue state, appends it to
    /// the metrics series and returns it.
    pub fn record(&mut self) -> MetricsSample {
        let cluster = self.cluster.borrow();
        let sample = MetricsSample {
            time: self.time(),
            gpu_utilization: cluster.occupied_count() as f64 / cluster.total_nodes() as f64 * 100.,
            queue_length: self.queue.len(),
            active_jobs: cluster.active_job_count(),
            successful_placements: self.successful_placements,
            failed_placements: self.failed_placements,
        };
        self.monitoring.borrow_mut().record(sample.clone());
        sample
    }

    /// Returns the current simulation time in ticks.
    pub fn time(&self) -> f64 {
        self.ticks as f64
    }

    /// Returns the number of queued jobs.
    pub fn queue_length(&self) -> usize {
        self.queue.len()
    }

    /// Returns the number of currently running jobs.
    pub fn active_job_count(&self) -> usize {
        self.cluster.borrow().active_job_count()
    }

    /// Returns the total number of successful placements.
    pub fn successful_placements(&self) -> u64 {
        self.successful_placements
    }

    /// Returns the total number of failed placements.
    pub fn failed_placements(&self) -> u64 {
        self.failed_placements
    }
}
