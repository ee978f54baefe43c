//! Simulation configuration.

use serde::{Deserialize, Serialize};

/// Holds raw simulation config parsed from YAML file.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Default)]
struct RawSimulationConfig {
    pub total_nodes: Option<u32>,
    pub nodes_per_leaf: Option<u32>,
    pub simulation_length: Option<u64>,
    pub placement_algorithm: Option<String>,
    pub workload: Option<RawWorkloadConfig>,
}

/// Holds raw workload config parsed from YAML file.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Default)]
struct RawWorkloadConfig {
    pub arrival_probability: Option<f64>,
    pub job_sizes: Option<Vec<u32>>,
    pub min_duration: Option<u64>,
    pub max_duration: Option<u64>,
}

/// Parameters of the random job arrival process.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct WorkloadConfig {
    /// Probability of a new job arriving on each tick.
    pub arrival_probability: f64,
    /// Node counts a job may request, chosen uniformly.
    pub job_sizes: Vec<u32>,
    /// Minimum job duration in ticks.
    pub min_duration: u64,
    /// Maximum job duration in ticks.
    pub max_duration: u64,
}

/// Represents simulation configuration.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct SimulationConfig {
    /// Total number of nodes in the cluster.
    pub total_nodes: u32,
    /// Number of nodes attached to one leaf domain.
    pub nodes_per_leaf: u32,
    /// Length of simulation in ticks.
    pub simulation_length: u64,
    /// Placement algorithm used by the scheduler.
    pub placement_algorithm: String,
    /// Job arrival process, if the simulation drives its own workload.
    pub workload: Option<WorkloadConfig>,
}

impl SimulationConfig {
    /// Creates simulation config with default parameter values.
    pub fn new() -> Self {
        Self {
            total_nodes: 128,
            nodes_per_leaf: 4,
            simulation_length: 100,
            placement_algorithm: "FirstFit".to_string(),
            workload: None,
        }
    }

    /// Creates simulation config by reading parameter values from YAML file
    /// (uses default values if some parameters are absent).
    ///
    /// Panics if the file cannot be read or parsed, or if the resulting
    /// configuration is invalid.
    pub fn from_file(file_name: &str) -> Self {
        let raw: RawSimulationConfig = serde_yaml::from_str(
            &std::fs::read_to_string(file_name).unwrap_or_else(|_| panic!("Can't read file {}", file_name)),
        )
        .unwrap_or_else(|_| panic!("Can't parse YAML from file {}", file_name));
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawSimulationConfig) -> Self {
        let default = Self::new();
        let config = Self {
            total_nodes: raw.total_nodes.unwrap_or(default.total_nodes),
            nodes_per_leaf: raw.nodes_per_leaf.unwrap_or(default.nodes_per_leaf),
            simulation_length: raw.simulation_length.unwrap_or(default.simulation_length),
            placement_algorithm: raw.placement_algorithm.unwrap_or(default.placement_algorithm),
            workload: raw.workload.map(|w| WorkloadConfig {
                arrival_probability: w.arrival_probability.unwrap_or(0.3),
                job_sizes: w.job_sizes.unwrap_or_else(|| vec![2, 4, 8, 16]),
                min_duration: w.min_duration.unwrap_or(5),
                max_duration: w.max_duration.unwrap_or(15),
            }),
        };
        config.validate();
        config
    }

    /// Checks parameter values, panics on invalid configuration.
    fn validate(&self) {
        assert!(self.total_nodes > 0, "total_nodes must be positive");
        assert!(self.nodes_per_leaf > 0, "nodes_per_leaf must be positive");
        assert!(
            self.total_nodes % self.nodes_per_leaf == 0,
            "nodes_per_leaf {} does not evenly divide total_nodes {}",
            self.nodes_per_leaf,
            self.total_nodes
        );
        if let Some(workload) = &self.workload {
            assert!(
                (0. ..=1.).contains(&workload.arrival_probability),
                "arrival_probability {} is not a probability",
                workload.arrival_probability
            );
            assert!(!workload.job_sizes.is_empty(), "job_sizes must not be empty");
            assert!(
                workload.job_sizes.iter().all(|size| *size > 0),
                "job_sizes must be positive"
            );
            assert!(workload.min_duration > 0, "min_duration must be positive");
            assert!(
                workload.min_duration <= workload.max_duration,
                "min_duration {} exceeds max_duration {}",
                workload.min_duration,
                workload.max_duration
            );
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Holds raw experiment config parsed from YAML file.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
struct RawExperimentConfig {
    pub seeds: Option<Vec<u64>>,
    pub config: Option<RawSimulationConfig>,
}

/// Experiment configuration: one simulation run per seed over a shared base
/// simulation config.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct ExperimentConfig {
    /// Random seeds, one run per seed.
    pub seeds: Vec<u64>,
    /// Base simulation config shared by all runs.
    pub config: SimulationConfig,
}

impl ExperimentConfig {
    /// Creates experiment config by reading parameter values from YAML file.
    pub fn from_file(file_name: &str) -> Self {
        let raw: RawExperimentConfig = serde_yaml::from_str(
            &std::fs::read_to_string(file_name).unwrap_or_else(|_| panic!("Can't read file {}", file_name)),
        )
        .unwrap_or_else(|_| panic!("Can't parse YAML from file {}", file_name));
        let seeds = raw.seeds.unwrap_or_else(|| vec![123]);
        assert!(!seeds.is_empty(), "seeds must not be empty");
        Self {
            seeds,
            config: SimulationConfig::from_raw(raw.config.unwrap_or_default()),
        }
    }
}

/// Parses config value string, which consists of two parts - name and options.
/// Example: FirstFit[option=value] parts are name FirstFit and options string
/// "option=value".
pub fn parse_config_value(config_str: &str) -> (String, Option<String>) {
    match config_str.split_once('[') {
        Some((l, r)) => (l.to_string(), Some(r.to_string().replace(']', ""))),
        None => (config_str.to_string(), None),
    }
}
