//! Tools for running experiments with multiple simulation runs.

use std::fs;
use std::fs::File;
use std::sync::{Arc, Mutex};

use dyn_clone::{clone_trait_object, DynClone};
use indexmap::map::IndexMap;
use log::Level;
use serde::{Deserialize, Serialize};
use threadpool::ThreadPool;

use crate::core::config::{ExperimentConfig, SimulationConfig};
use crate::core::logger::{FileLogger, Logger, StdoutLogger};
use crate::simulation::ClusterSimulation;

/// Trait for implementing custom callbacks for simulation runs within an
/// experiment.
pub trait SimulationCallbacks: DynClone + Send {
    /// Runs before starting a simulation run.
    fn on_simulation_start(&mut self, _sim: &mut ClusterSimulation) {}

    /// Runs after each tick of a simulation run, returns false if the run
    /// must be stopped.
    fn on_step(&mut self, _sim: &mut ClusterSimulation) -> bool {
        true
    }

    /// Runs upon the completion of a simulation run, returns results of this
    /// run.
    fn on_simulation_finish(&mut self, _sim: &mut ClusterSimulation) -> IndexMap<String, String> {
        IndexMap::new()
    }
}

clone_trait_object!(SimulationCallbacks);

/// Implements execution of an experiment: one simulation run per seed, fanned
/// out on a thread pool. Each run gets its own simulation built inside the
/// worker, so no simulation state is shared across threads.
pub struct Experiment {
    pub config: ExperimentConfig,
    pub callbacks: Box<dyn SimulationCallbacks>,
    pub log_dir: Option<String>,
    pub log_level: Level,
}

impl Experiment {
    pub fn new(
        config: ExperimentConfig,
        callbacks: Box<dyn SimulationCallbacks>,
        log_dir: Option<String>,
        log_level: Level,
    ) -> Self
    where
        Self: Sized,
    {
        if let Some(dir) = log_dir.clone() {
            fs::create_dir_all(dir).unwrap();
        }

        Self {
            config,
            callbacks,
            log_dir,
            log_level,
        }
    }

    /// Runs the experiment using the specified number of threads and returns
    /// the per-run results. When a log dir is set, also saves per-run log and
    /// metrics CSVs and the aggregated `results.json` there.
    pub fn run(&mut self, num_threads: usize) -> Vec<IndexMap<String, DictValue>> {
        let results = Arc::new(Mutex::new(Vec::new()));
        let pool = ThreadPool::new(num_threads);

        for (idx, seed) in self.config.seeds.iter().enumerate() {
            let run_id = idx + 1;
            let seed = *seed;
            let run_config = self.config.config.clone();
            let mut callbacks = self.callbacks.clone();
            let log_level = self.log_level;
            let log_file = self.log_dir.clone().map(|dir| format!("{}/log_{}.csv", dir, run_id));
            let metrics_file = self
                .log_dir
                .clone()
                .map(|dir| format!("{}/metrics_{}.csv", dir, run_id));
            let results = results.clone();

            pool.execute(move || {
                println!("RUN {}: seed {}", run_id, seed);
                let run_results = run_simulation(run_id, seed, run_config.clone(), &mut callbacks, log_file, metrics_file, log_level);

                let mut run_entry = IndexMap::<String, DictValue>::new();
                run_entry.insert("id".to_string(), DictValue::String(format!("{}", run_id)));
                run_entry.insert("seed".to_string(), DictValue::String(format!("{}", seed)));
                run_entry.insert("config".to_string(), DictValue::Config(run_config));
                run_entry.insert("results".to_string(), DictValue::StringDict(run_results));
                results.lock().unwrap().push(run_entry);
            });
        }

        pool.join();
        let results = Arc::try_unwrap(results).unwrap().into_inner().unwrap();

        if let Some(dir) = self.log_dir.clone() {
            let mut file = File::create(format!("{}/results.json", dir)).unwrap();
            serde_json::to_writer_pretty(&mut file, &results).unwrap();
        }
        results
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(untagged)]
pub enum DictValue {
    String(String),
    Dict(IndexMap<String, DictValue>),
    StringDict(IndexMap<String, String>),
    Config(SimulationConfig),
}

fn run_simulation(
    run_id: usize,
    seed: u64,
    config: SimulationConfig,
    callbacks: &mut Box<dyn SimulationCallbacks>,
    log_file: Option<String>,
    metrics_file: Option<String>,
    log_level: Level,
) -> IndexMap<String, String> {
    let logger: Box<dyn Logger> = if log_file.is_some() {
        Box::new(FileLogger::with_level(log_level))
    } else {
        Box::new(StdoutLogger::new())
    };

    let mut sim = ClusterSimulation::with_logger(seed, config.clone(), logger);
    callbacks.on_simulation_start(&mut sim);

    while sim.current_time() < config.simulation_length as f64 {
        sim.step();
        if !callbacks.on_step(&mut sim) {
            break;
        }
    }

    if let Some(log_file) = log_file {
        match sim.save_log(&log_file) {
            Ok(_) => println!("Log for run {run_id} saved successfully to file: {log_file}"),
            Err(e) => println!("Error while saving log for run {run_id}: {e:?}"),
        }
    }
    if let Some(metrics_file) = metrics_file {
        match sim.save_metrics(&metrics_file) {
            Ok(_) => println!("Metrics for run {run_id} saved successfully to file: {metrics_file}"),
            Err(e) => println!("Error while saving metrics for run {run_id}: {e:?}"),
        }
    }

    callbacks.on_simulation_finish(&mut sim)
}
