//! Append-only time series of cluster occupancy metrics.

use std::fs::File;

use serde::Serialize;

/// One aggregate snapshot of scheduler and cluster state, taken per tick.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetricsSample {
    /// Simulation time the sample was taken at.
    pub time: f64,
    /// Share of occupied nodes, in percent.
    pub gpu_utilization: f64,
    /// Number of jobs waiting in the queue.
    pub queue_length: usize,
    /// Number of currently running jobs.
    pub active_jobs: usize,
    /// Total number of successful placements since the start of the run.
    pub successful_placements: u64,
    /// Total number of failed placements since the start of the run.
    pub failed_placements: u64,
}

/// Stores the samples recorded during a run and provides read access for
/// charting collaborators.
///
/// The series is append-only: no deletion, no compaction, no cap on growth
/// within a run. It can be restarted only by recreating the component.
/// Long-running callers should read through [`Monitoring::last`] instead of
/// retaining the full series.
#[derive(Default)]
pub struct Monitoring {
    series: Vec<MetricsSample>,
}

impl Monitoring {
    /// Creates component with an empty series.
    pub fn new() -> Self {
        Self { series: Vec::new() }
    }

    /// Appends a sample to the series.
    pub fn record(&mut self, sample: MetricsSample) {
        self.series.push(sample);
    }

    /// Returns all recorded samples in record order.
    pub fn samples(&self) -> &[MetricsSample] {
        &self.series
    }

    /// Returns the last `count` samples (or the whole series if it is shorter).
    pub fn last(&self, count: usize) -> &[MetricsSample] {
        &self.series[self.series.len().saturating_sub(count)..]
    }

    /// Returns the number of recorded samples.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Saves the recorded series to a CSV file.
    pub fn save_metrics(&self, path: &str) -> Result<(), std::io::Error> {
        let file = File::create(path)?;
        let mut wtr = csv::Writer::from_writer(file);
        for sample in &self.series {
            wtr.serialize(sample)?;
        }
        wtr.flush()?;
        Ok(())
    }
}
