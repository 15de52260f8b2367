//! CLI Tooling
//!
//! Command-line front end for exercising a throttled progress callback against a
//! synthetic worker.

use crate::config::{ConfigLoader, PulseConfig};
use crate::error::{ListenerError, PulseError};
use crate::progress::{
    listener_fn, LoggingListener, ProgressCallback, SharedListener, ThrottlingProgressCallback,
};
use crate::worker::{run_worker, WorkerReport};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Pulse CLI - throttled progress callbacks
#[derive(Parser)]
#[command(name = "pulse")]
#[command(about = "Throttled progress callbacks for long-running workers")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Disable logging
    #[arg(long, default_value = "false")]
    pub quiet: bool,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a synthetic worker that reports progress on every record
    Simulate {
        /// Number of records to process
        #[arg(long, default_value_t = 10_000)]
        records: u64,

        /// Simulated work per record, in microseconds
        #[arg(long, default_value_t = 100)]
        work_micros: u64,

        /// Override the configured throttle frequency (milliseconds)
        #[arg(long)]
        frequency_ms: Option<u64>,

        /// Make a listener fail once it has received this many signals
        #[arg(long)]
        fail_after: Option<u64>,
    },
    /// Print the effective configuration as TOML
    Config,
}

/// Loaded configuration plus everything a command needs to run.
pub struct RunContext {
    config: PulseConfig,
}

impl RunContext {
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, PulseError> {
        let config = match config_path {
            Some(path) => ConfigLoader::load_from_file(&path)?,
            None => ConfigLoader::load()?,
        };
        Ok(Self { config })
    }

    pub fn from_config(config: PulseConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PulseConfig {
        &self.config
    }

    pub fn execute(&self, command: &Commands) -> Result<String, PulseError> {
        match command {
            Commands::Simulate {
                records,
                work_micros,
                frequency_ms,
                fail_after,
            } => {
                let report = self.simulate(*records, *work_micros, *frequency_ms, *fail_after)?;
                Ok(report.to_string())
            }
            Commands::Config => toml::to_string_pretty(&self.config)
                .map_err(|e| PulseError::ConfigError(format!("Failed to render config: {}", e))),
        }
    }

    fn simulate(
        &self,
        records: u64,
        work_micros: u64,
        frequency_ms: Option<u64>,
        fail_after: Option<u64>,
    ) -> Result<WorkerReport, PulseError> {
        let mut throttle = self.config.throttle.clone();
        if let Some(frequency_ms) = frequency_ms {
            throttle.frequency_ms = frequency_ms;
        }
        let callback: ThrottlingProgressCallback<u64> = ThrottlingProgressCallback::builder()
            .throttle_config(&throttle)
            .build()?;
        info!(
            frequency_ms = callback.frequency_ms(),
            records, work_micros, "starting simulation"
        );

        let logger = Arc::new(LoggingListener::new("simulate"));
        let logger_handle: SharedListener<u64> = logger.clone();
        callback.add_progress_listener(logger_handle.clone());

        let failing = fail_after.map(failing_listener);
        if let Some(failing) = &failing {
            callback.add_progress_listener(failing.clone());
        }

        let work = Duration::from_micros(work_micros);
        let report = run_worker(&callback, records, |_| {
            if !work.is_zero() {
                std::thread::sleep(work);
            }
        });

        callback.remove_progress_listener(&logger_handle);
        if let Some(failing) = &failing {
            callback.remove_progress_listener(failing);
        }
        info!(delivered = logger.delivered(), "simulation finished");
        Ok(report)
    }
}

/// A listener that accepts `limit` signals and fails on every one after that.
fn failing_listener(limit: u64) -> SharedListener<u64> {
    let received = AtomicU64::new(0);
    listener_fn(move |index: &u64| {
        let count = received.fetch_add(1, Ordering::SeqCst) + 1;
        if count > limit {
            Err(ListenerError::Failed(format!(
                "refusing progress at record {} after {} signals",
                index, limit
            )))
        } else {
            Ok(())
        }
    })
}
