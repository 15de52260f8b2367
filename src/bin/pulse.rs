//! Pulse CLI Binary
//!
//! Command-line interface for running workers against a throttled progress callback.

use clap::Parser;
use pulse::cli::{Cli, RunContext};
use pulse::logging::{init_logging, LoggingConfig};
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    // Configuration drives logging, so it is loaded before the logger exists
    let context = match RunContext::new(cli.config.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            process::exit(1);
        }
    };

    let logging_config = match build_logging_config(&cli, context.config().logging.clone()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid logging options: {}", e);
            process::exit(1);
        }
    };
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("Pulse CLI starting");

    match context.execute(&cli.command) {
        Ok(output) => {
            info!("Command completed successfully");
            println!("{}", output);
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}

/// Apply CLI flags on top of the loaded logging configuration.
/// Precedence: CLI flags override config file override defaults.
/// The merged result is validated again since flags bypass config validation.
fn build_logging_config(cli: &Cli, mut config: LoggingConfig) -> Result<LoggingConfig, String> {
    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if cli.quiet {
        config.level = "off".to_string();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = file.clone();
    }
    config.validate()?;
    Ok(config)
}
