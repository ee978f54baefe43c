/// Logging facilities to record events during simulation.
use std::fs::File;

use log::Level;
use serde::Serialize;

pub trait Logger {
    fn log_error(&mut self, time: f64, component: &str, log: String);

    fn log_warn(&mut self, time: f64, component: &str, log: String);

    fn log_info(&mut self, time: f64, component: &str, log: String);

    fn log_debug(&mut self, time: f64, component: &str, log: String);

    fn log_trace(&mut self, time: f64, component: &str, log: String);

    fn save_log(&self, _path: &str) -> Result<(), std::io::Error>;
}

#[derive(Default)]
pub struct StdoutLogger {}

impl StdoutLogger {
    pub fn new() -> Self {
        Self {}
    }
}

impl Logger for StdoutLogger {
    fn log_error(&mut self, time: f64, component: &str, log: String) {
        log::error!("[{:.3} {}] {}", time, component, log);
    }

    fn log_warn(&mut self, time: f64, component: &str, log: String) {
        log::warn!("[{:.3} {}] {}", time, component, log);
    }

    fn log_info(&mut self, time: f64, component: &str, log: String) {
        log::info!("[{:.3} {}] {}", time, component, log);
    }

    fn log_debug(&mut self, time: f64, component: &str, log: String) {
        log::debug!("[{:.3} {}] {}", time, component, log);
    }

    fn log_trace(&mut self, time: f64, component: &str, log: String) {
        log::trace!("[{:.3} {}] {}", time, component, log);
    }

    fn save_log(&self, _path: &str) -> Result<(), std::io::Error> {
        Ok(())
    }
}

#[derive(Serialize)]
struct LogEntry {
    timestamp: f64,
    component: String,
    message: String,
}

pub struct FileLogger {
    log: Vec<LogEntry>,
    level: Level,
}

impl Default for FileLogger {
    fn default() -> Self {
        Self {
            log: Vec::new(),
            level: Level::Info,
        }
    }
}

impl FileLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(level: Level) -> Self {
        Self { log: Vec::new(), level }
    }

    fn log_internal(&mut self, time: f64, component: &str, message: String, level: Level) {
        if self.level < level {
            return;
        }
        self.log.push(LogEntry {
            timestamp: time,
            component: component.to_string(),
            message,
        });
    }
}

impl Logger for FileLogger {
    fn log_error(&mut self, time: f64, component: &str, log: String) {
        self.log_internal(time, component, log, Level::Error)
    }

    fn log_warn(&mut self, time: f64, component: &str, log: String) {
        self.log_internal(time, component, log, Level::Warn)
    }

    fn log_info(&mut self, time: f64, component: &str, log: String) {
        self.log_internal(time, component, log, Level::Info)
    }

    fn log_debug(&mut self, time: f64, component: &str, log: String) {
        self.log_internal(time, component, log, Level::Debug)
    }

    fn log_trace(&mut self, time: f64, component: &str, log: String) {
        self.log_internal(time, component, log, Level::Trace)
    }

    fn save_log(&self, path: &str) -> Result<(), std::io::Error> {
        let file = File::create(path)?;
        let mut wtr = csv::Writer::from_writer(file);
        for entry in &self.log {
            wtr.serialize(entry)?;
        }
        wtr.flush()?;
        Ok(())
    }
}
