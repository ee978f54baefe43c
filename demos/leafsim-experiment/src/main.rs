use clap::Parser;
use indexmap::map::IndexMap;
use log::Level;

use leafsim::core::config::ExperimentConfig;
use leafsim::experiment::{Experiment, SimulationCallbacks};
use leafsim::simulation::ClusterSimulation;

fn init_logger() {
    use env_logger::Builder;
    use std::io::Write;
    Builder::from_default_env()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();
}

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to experiment config
    #[clap(short, long, default_value = "experiment.yaml")]
    config: String,

    /// Number of threads to use (default - use all available cores)
    #[clap(short, long, default_value_t = std::thread::available_parallelism().unwrap().get())]
    threads: usize,

    /// Directory for saving per-run logs, metrics and aggregated results
    #[clap(short, long)]
    log_dir: Option<String>,
}

#[derive(Clone)]
pub struct UtilizationCallbacks {
    utilization_sum: f64,
    steps: u64,
}

impl UtilizationCallbacks {
    fn new() -> Self {
        Self {
            utilization_sum: 0.,
            steps: 0,
        }
    }
}

impl SimulationCallbacks for UtilizationCallbacks {
    fn on_simulation_start(&mut self, _sim: &mut ClusterSimulation) {
        self.utilization_sum = 0.;
        self.steps = 0;
    }

    fn on_step(&mut self, sim: &mut ClusterSimulation) -> bool {
        let monitoring = sim.monitoring();
        if let Some(sample) = monitoring.borrow().samples().last() {
            self.utilization_sum += sample.gpu_utilization;
            self.steps += 1;
        }
        true
    }

    fn on_simulation_finish(&mut self, sim: &mut ClusterSimulation) -> IndexMap<String, String> {
        let mut results = IndexMap::new();
        results.insert(
            "mean_utilization".to_string(),
            format!("{:.2}", self.utilization_sum / self.steps.max(1) as f64),
        );
        results.insert(
            "successful_placements".to_string(),
            format!("{}", sim.successful_placements()),
        );
        results.insert("failed_placements".to_string(), format!("{}", sim.failed_placements()));
        results.insert("queue_length".to_string(), format!("{}", sim.queue_length()));
        results
    }
}

fn main() {
    init_logger();
    let args = Args::parse();
    let config = ExperimentConfig::from_file(&args.config);

    let mut experiment = Experiment::new(
        config,
        Box::new(UtilizationCallbacks::new()),
        args.log_dir,
        Level::Info,
    );
    let results = experiment.run(args.threads);
    println!("{} runs finished", results.len());
}
