use clap::Parser;
use log::info;

use leafsim::core::config::SimulationConfig;
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
    /// Path to simulation config
    #[clap(short, long, default_value = "config.yaml")]
    config: String,

    /// Random seed
    #[clap(short, long, default_value_t = 123)]
    seed: u64,

    /// Path for saving the metrics series as CSV
    #[clap(short, long)]
    metrics: Option<String>,
}

fn main() {
    init_logger();
    let args = Args::parse();
    let config = SimulationConfig::from_file(&args.config);
    let mut sim = ClusterSimulation::new(args.seed, config);

    let topology = sim.sim_config();
    info!(
        "cluster: {} nodes in {} leaf domains of {}",
        topology.total_nodes,
        topology.total_nodes / topology.nodes_per_leaf,
        topology.nodes_per_leaf
    );

    sim.run();

    info!("completed {} ticks", sim.current_time());
    info!(
        "placements: {} successful, {} failed",
        sim.successful_placements(),
        sim.failed_placements()
    );
    info!(
        "jobs still running: {}, queued: {}",
        sim.active_job_count(),
        sim.queue_length()
    );
    let monitoring = sim.monitoring();
    if let Some(sample) = monitoring.borrow().samples().last() {
        info!("final utilization: {:.1}%", sample.gpu_utilization);
    }

    if let Some(path) = &args.metrics {
        sim.save_metrics(path).unwrap();
        info!("metrics saved to {}", path);
    }
}
