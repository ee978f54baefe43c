//! Job arrival generators driving the simulation.

use rand::prelude::*;
use rand_pcg::Pcg64;

use crate::core::config::WorkloadConfig;

/// Represents a single job arrival produced by a workload generator.
#[derive(Clone, Debug)]
pub struct JobRequest {
    pub nodes_required: u32,
    pub duration: u64,
}

/// Produces the stream of jobs submitted to the scheduler during a run.
pub trait JobGenerator {
    /// Returns the job arriving on the current tick (if any).
    fn next_request(&mut self) -> Option<JobRequest>;
}

/// Random workload with Bernoulli arrivals per tick, uniformly chosen job
/// sizes and uniformly distributed durations. Reproducible given a seed.
pub struct RandomWorkload {
    config: WorkloadConfig,
    rand: Pcg64,
}

impl RandomWorkload {
    pub fn new(config: WorkloadConfig, seed: u64) -> Self {
        Self {
            config,
            rand: Pcg64::seed_from_u64(seed),
        }
    }
}

impl JobGenerator for RandomWorkload {
    fn next_request(&mut self) -> Option<JobRequest> {
        if !self.rand.gen_bool(self.config.arrival_probability) {
            return None;
        }
        let nodes_required = *self.config.job_sizes.choose(&mut self.rand).unwrap();
        let duration = self.rand.gen_range(self.config.min_duration..=self.config.max_duration);
        Some(JobRequest {
            nodes_required,
            duration,
        })
    }
}
