//! Simulation facade wiring the components together and driving the tick loop.

use std::cell::RefCell;
use std::rc::Rc;

use sugars::{rc, refcell};

use crate::core::cluster::ClusterState;
use crate::core::common::NodeState;
use crate::core::config::SimulationConfig;
use crate::core::job::Job;
use crate::core::logger::{Logger, StdoutLogger};
use crate::core::monitoring::{MetricsSample, Monitoring};
use crate::core::placement::placement_algorithm_resolver;
use crate::core::scheduler::Scheduler;
use crate::core::workload::{JobGenerator, RandomWorkload};

/// Owns all simulation components and drives the tick loop.
///
/// The whole simulation is single-threaded and synchronous: one step is one
/// completion sweep followed by one metrics snapshot, interleaved with zero or
/// more submissions. There is no ambient state, the caller owns the instance.
pub struct ClusterSimulation {
    cluster: Rc<RefCell<ClusterState>>,
    scheduler: Scheduler,
    monitoring: Rc<RefCell<Monitoring>>,
    logger: Rc<RefCell<Box<dyn Logger>>>,
    workload: Option<Box<dyn JobGenerator>>,
    job_counter: u64,
    sim_config: Rc<SimulationConfig>,
}

impl ClusterSimulation {
    /// Creates a simulation from the config, seeding the workload generator
    /// (if the config defines one) and logging through the `log` facade.
    pub fn new(seed: u64, sim_config: SimulationConfig) -> Self {
        Self::with_logger(seed, sim_config, Box::new(StdoutLogger::new()))
    }

    /// Creates a simulation with the specified logger backend.
    pub fn with_logger(seed: u64, sim_config: SimulationConfig, logger: Box<dyn Logger>) -> Self {
        let cluster = rc!(refcell!(ClusterState::new(
            sim_config.total_nodes,
            sim_config.nodes_per_leaf
        )));
        let monitoring = rc!(refcell!(Monitoring::new()));
        let logger = rc!(refcell!(logger));
        let scheduler = Scheduler::new(
            cluster.clone(),
            placement_algorithm_resolver(sim_config.placement_algorithm.clone()),
            monitoring.clone(),
            logger.clone(),
        );
        let workload = sim_config
            .workload
            .clone()
            .map(|w| Box::new(RandomWorkload::new(w, seed)) as Box<dyn JobGenerator>);
        Self {
            cluster,
            scheduler,
            monitoring,
            logger,
            workload,
            job_counter: 0,
            sim_config: Rc::new(sim_config),
        }
    }

    /// Submits a caller-built job, attempting immediate placement.
    pub fn submit(&mut self, job: Job) -> bool {
        self.scheduler.submit(job)
    }

    /// Builds a job with an auto-generated ID and submits it.
    pub fn spawn_job(&mut self, nodes_required: u32, duration: u64) -> bool {
        self.job_counter += 1;
        let job = Job::new(&format!("job_{}", self.job_counter), nodes_required, duration);
        self.scheduler.submit(job)
    }

    /// Runs one tick: completion sweep, then the workload arrival for this
    /// tick (if any), then the metrics snapshot.
    ///
    /// Sweeping before admitting the arrival keeps a job's first runtime
    /// increment on the tick after its submission, while the recorded sample
    /// already includes the arrival.
    pub fn step(&mut self) -> MetricsSample {
        self.scheduler.advance();
        if let Some(workload) = &mut self.workload {
            if let Some(request) = workload.next_request() {
                self.job_counter += 1;
                let job = Job::new(
                    &format!("job_{}", self.job_counter),
                    request.nodes_required,
                    request.duration,
                );
                self.scheduler.submit(job);
            }
        }
        self.scheduler.record()
    }

    /// Runs the specified number of ticks.
    pub fn steps(&mut self, count: u64) {
        for _ in 0..count {
            self.step();
        }
    }

    /// Runs for `simulation_length` ticks from the config.
    pub fn run(&mut self) {
        self.steps(self.sim_config.simulation_length);
    }

    /// Performs one completion sweep without recording a sample.
    pub fn advance(&mut self) {
        self.scheduler.advance();
    }

    /// Takes a metrics snapshot, appends it to the series and returns it.
    pub fn record(&mut self) -> MetricsSample {
        self.scheduler.record()
    }

    /// Returns the current simulation time in ticks.
    pub fn current_time(&self) -> f64 {
        self.scheduler.time()
    }

    /// Returns the number of queued jobs.
    pub fn queue_length(&self) -> usize {
        self.scheduler.queue_length()
    }

    /// Returns the number of currently running jobs.
    pub fn active_job_count(&self) -> usize {
        self.scheduler.active_job_count()
    }

    /// Returns the total number of successful placements.
    pub fn successful_placements(&self) -> u64 {
        self.scheduler.successful_placements()
    }

    /// Returns the total number of failed placements.
    pub fn failed_placements(&self) -> u64 {
        self.scheduler.failed_placements()
    }

    /// Returns a snapshot of the per-node occupancy.
    pub fn occupancy(&self) -> Vec<NodeState> {
        self.cluster.borrow().occupancy().to_vec()
    }

    /// Returns the occupancy reshaped as [node within leaf][leaf domain].
    pub fn occupancy_matrix(&self) -> Vec<Vec<NodeState>> {
        self.cluster.borrow().occupancy_matrix()
    }

    /// Returns the handle to the cluster state.
    pub fn cluster(&self) -> Rc<RefCell<ClusterState>> {
        self.cluster.clone()
    }

    /// Returns the handle to the metrics series.
    pub fn monitoring(&self) -> Rc<RefCell<Monitoring>> {
        self.monitoring.clone()
    }

    /// Returns the simulation config.
    pub fn sim_config(&self) -> Rc<SimulationConfig> {
        self.sim_config.clone()
    }

    /// Saves the simulation log to a CSV file (no-op for the stdout backend).
    pub fn save_log(&self, path: &str) -> Result<(), std::io::Error> {
        self.logger.borrow().save_log(path)
    }

    /// Saves the recorded metrics series to a CSV file.
    pub fn save_metrics(&self, path: &str) -> Result<(), std::io::Error> {
        self.monitoring.borrow().save_metrics(path)
    }
}
