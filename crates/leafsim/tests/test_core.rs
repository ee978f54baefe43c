use indexmap::map::IndexMap;
use log::Level;

use leafsim::core::common::NodeState;
use leafsim::core::config::{ExperimentConfig, SimulationConfig};
use leafsim::core::job::Job;
use leafsim::experiment::{Experiment, SimulationCallbacks};
use leafsim::simulation::ClusterSimulation;

fn name_wrapper(file_name: &str) -> String {
    format!("test-configs/{}", file_name)
}

#[test]
// One job covering the whole cluster: the single 2-leaf window is fully free,
// so the job is placed and utilization hits 100%. One tick later the job
// completes and utilization returns to zero.
fn test_full_cluster_job() {
    let config = SimulationConfig::from_file(&name_wrapper("config.yaml"));
    let mut sim = ClusterSimulation::new(123, config);

    assert!(sim.spawn_job(8, 1));
    assert_eq!(sim.active_job_count(), 1);
    let sample = sim.record();
    assert_eq!(sample.gpu_utilization, 100.);

    sim.advance();
    let sample = sim.record();
    assert_eq!(sim.active_job_count(), 0);
    assert_eq!(sample.active_jobs, 0);
    assert_eq!(sample.gpu_utilization, 0.);
}

#[test]
// Utilization is exactly 100 * k / n after placing a k-node job on an
// otherwise empty n-node cluster.
fn test_utilization_round_trip() {
    let mut sim = ClusterSimulation::new(123, SimulationConfig::new());

    assert!(sim.spawn_job(16, 5));
    let sample = sim.record();
    assert_eq!(sample.gpu_utilization, 12.5);
}

#[test]
fn test_first_fit_via_submit() {
    let config = SimulationConfig::from_file(&name_wrapper("config.yaml"));
    let mut sim = ClusterSimulation::new(123, config);

    assert!(sim.submit(Job::new("a", 2, 10)));
    assert!(sim.submit(Job::new("b", 2, 10)));

    let occupancy = sim.occupancy();
    for node in [0, 1, 4, 5] {
        assert_eq!(occupancy[node], NodeState::Occupied);
    }
    for node in [2, 3, 6, 7] {
        assert_eq!(occupancy[node], NodeState::Free);
    }
}

#[test]
// Submitting an unplaceable job appends exactly one queue entry, bumps the
// failure counter and leaves occupancy untouched.
fn test_queue_growth() {
    let config = SimulationConfig::from_file(&name_wrapper("config.yaml"));
    let mut sim = ClusterSimulation::new(123, config);

    assert!(sim.spawn_job(8, 10));
    let before = sim.occupancy();

    assert!(!sim.spawn_job(2, 5));
    assert_eq!(sim.queue_length(), 1);
    assert_eq!(sim.failed_placements(), 1);
    assert_eq!(sim.successful_placements(), 1);
    assert_eq!(sim.occupancy(), before);
}

#[test]
// The queue is never retried: capacity freed by a completion does not
// resurrect a queued job, only new submissions attempt placement.
fn test_queue_never_retried() {
    let config = SimulationConfig::from_file(&name_wrapper("config.yaml"));
    let mut sim = ClusterSimulation::new(123, config);

    assert!(sim.spawn_job(8, 2));
    assert!(!sim.spawn_job(4, 3));
    assert_eq!(sim.queue_length(), 1);

    sim.steps(5);
    assert_eq!(sim.active_job_count(), 0);
    assert_eq!(sim.queue_length(), 1);
    let sample = sim.record();
    assert_eq!(sample.gpu_utilization, 0.);
    assert_eq!(sample.queue_length, 1);
}

#[test]
// A job runs for exactly its duration of ticks, never fewer.
fn test_completion_after_duration() {
    let config = SimulationConfig::from_file(&name_wrapper("config.yaml"));
    let mut sim = ClusterSimulation::new(123, config);

    assert!(sim.spawn_job(4, 3));
    sim.advance();
    sim.advance();
    assert_eq!(sim.active_job_count(), 1);

    sim.advance();
    assert_eq!(sim.active_job_count(), 0);
    assert!(sim.occupancy().iter().all(|s| *s == NodeState::Free));
}

#[test]
// Two concurrent jobs where the second finishes first: only the second job's
// exact recorded range is freed, the first keeps running on its own nodes.
fn test_exact_range_release() {
    let config = SimulationConfig::from_file(&name_wrapper("config_16.yaml"));
    let mut sim = ClusterSimulation::new(123, config);

    assert!(sim.submit(Job::new("long", 4, 5)));
    assert!(sim.submit(Job::new("short", 4, 2)));
    assert_eq!(sim.active_job_count(), 2);

    sim.advance();
    sim.advance();
    assert_eq!(sim.active_job_count(), 1);
    assert!(sim.cluster().borrow().running_jobs().contains_key("long"));
    let occupancy = sim.occupancy();
    for node in 0..4 {
        assert_eq!(occupancy[node], NodeState::Occupied);
    }
    for node in 4..8 {
        assert_eq!(occupancy[node], NodeState::Free);
    }

    sim.advance();
    sim.advance();
    sim.advance();
    assert_eq!(sim.active_job_count(), 0);
    assert!(sim.occupancy().iter().all(|s| *s == NodeState::Free));
}

#[test]
// The series grows by one sample per record call, in call order, with
// non-decreasing timestamps and monotonic counters.
fn test_metrics_series() {
    let config = SimulationConfig::from_file(&name_wrapper("config.yaml"));
    let mut sim = ClusterSimulation::new(123, config);

    sim.spawn_job(2, 3);
    sim.steps(10);

    let monitoring = sim.monitoring();
    let monitoring = monitoring.borrow();
    assert_eq!(monitoring.len(), 10);
    let samples = monitoring.samples();
    for pair in samples.windows(2) {
        assert!(pair[0].time <= pair[1].time);
        assert!(pair[0].successful_placements <= pair[1].successful_placements);
        assert!(pair[0].failed_placements <= pair[1].failed_placements);
    }
    assert_eq!(monitoring.last(3).len(), 3);
    assert_eq!(monitoring.last(3)[0].time, samples[7].time);
    assert_eq!(monitoring.last(100).len(), 10);
}

#[test]
// Identical seeds reproduce the whole run: same placements, same series.
fn test_workload_determinism() {
    let config = SimulationConfig::from_file(&name_wrapper("config_workload.yaml"));
    let mut sim1 = ClusterSimulation::new(123, config.clone());
    let mut sim2 = ClusterSimulation::new(123, config);

    sim1.run();
    sim2.run();

    assert!(sim1.successful_placements() + sim1.failed_placements() > 0);
    assert_eq!(sim1.successful_placements(), sim2.successful_placements());
    assert_eq!(sim1.failed_placements(), sim2.failed_placements());
    assert_eq!(sim1.monitoring().borrow().samples(), sim2.monitoring().borrow().samples());
}

#[test]
fn test_config_defaults() {
    let config = SimulationConfig::from_file(&name_wrapper("config_minimal.yaml"));
    assert_eq!(config.total_nodes, 128);
    assert_eq!(config.nodes_per_leaf, 4);
    assert_eq!(config.simulation_length, 50);
    assert_eq!(config.placement_algorithm, "FirstFit");

    let workload = config.workload.unwrap();
    assert_eq!(workload.arrival_probability, 0.3);
    assert_eq!(workload.job_sizes, vec![2, 4, 8, 16]);
    assert_eq!(workload.min_duration, 5);
    assert_eq!(workload.max_duration, 15);
}

#[test]
#[should_panic(expected = "does not evenly divide")]
fn test_invalid_topology_config() {
    SimulationConfig::from_file(&name_wrapper("config_bad_topology.yaml"));
}

#[derive(Clone)]
struct CountingCallbacks {}

impl SimulationCallbacks for CountingCallbacks {
    fn on_simulation_finish(&mut self, sim: &mut ClusterSimulation) -> IndexMap<String, String> {
        let mut results = IndexMap::new();
        results.insert("ticks".to_string(), format!("{}", sim.current_time()));
        results.insert("placements".to_string(), format!("{}", sim.successful_placements()));
        results
    }
}

#[test]
// One simulation run per seed, results collected from every run.
fn test_experiment_runs_per_seed() {
    let config = ExperimentConfig {
        seeds: vec![1, 2, 3],
        config: SimulationConfig::from_file(&name_wrapper("config_workload.yaml")),
    };
    let mut experiment = Experiment::new(config, Box::new(CountingCallbacks {}), None, Level::Info);

    let results = experiment.run(2);
    assert_eq!(results.len(), 3);
    for entry in &results {
        assert!(entry.contains_key("seed"));
        assert!(entry.contains_key("results"));
    }
}
