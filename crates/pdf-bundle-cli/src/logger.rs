use chrono::{DateTime, Local};
use log::{Level, LevelFilter, Metadata, Record};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: Level,
    pub message: String,
}

/// Writes records to stderr and remembers the warnings for the final summary
#[derive(Clone)]
pub struct CliLogger {
    level: LevelFilter,
    warnings: Arc<Mutex<Vec<LogEntry>>>,
    max_warnings: usize,
}

impl CliLogger {
    pub fn new(level: LevelFilter, max_warnings: usize) -> Self {
        Self {
            level,
            warnings: Arc::new(Mutex::new(Vec::new())),
            max_warnings,
        }
    }

    /// Level for the `-v` count, or warnings only when quiet
    pub fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
        match (quiet, verbose) {
            (true, _) => LevelFilter::Warn,
            (false, 0) => LevelFilter::Info,
            (false, 1) => LevelFilter::Debug,
            (false, _) => LevelFilter::Trace,
        }
    }

    pub fn init(self) -> Result<Self, log::SetLoggerError> {
        log::set_boxed_logger(Box::new(self.clone()))?;
        log::set_max_level(self.level);
        Ok(self)
    }

    pub fn warnings(&self) -> Vec<LogEntry> {
        self.warnings
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

impl log::Log for CliLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let entry = LogEntry {
            timestamp: Local::now(),
            level: record.level(),
            message: format!("{}", record.args()),
        };
        eprintln!(
            "{} {:<5} {}",
            entry.timestamp.format("%H:%M:%S"),
            entry.level,
            entry.message
        );

        if entry.level <= Level::Warn {
            if let Ok(mut warnings) = self.warnings.lock() {
                warnings.push(entry);

                // Keep only the most recent entries
                if warnings.len() > self.max_warnings {
                    let excess = warnings.len() - self.max_warnings;
                    warnings.drain(0..excess);
                }
            }
        }
    }

    fn flush(&self) {}
}
