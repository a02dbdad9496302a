//! Continuity CLI Binary
//!
//! Command-line interface for building and checking filesystem manifests.

use anyhow::Context;
use clap::Parser;
use continuity::cli::{Cli, RunContext};
use continuity::config::ConfigLoader;
use continuity::error::ApiError;
use continuity::logging::{init_logging, LoggingConfig};
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    // Build logging config from CLI args, env vars, and config file
    let logging_config = build_logging_config(&cli);

    // Initialize logging early
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("Continuity CLI starting");

    match run(&cli) {
        Ok(output) => {
            info!("Command completed successfully");
            println!("{}", output);
        }
        Err(e) => {
            error!("Command failed: {:#}", e);
            match e.downcast_ref::<ApiError>() {
                Some(api) => eprintln!("{}", continuity::cli::map_error(api)),
                None => eprintln!("{:#}", e),
            }
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<String> {
    let context = RunContext::new(cli.config.clone()).context("failed to load configuration")?;
    let output = context.execute(&cli.command)?;
    Ok(output)
}

/// Build logging configuration from CLI args and config file.
/// Logging stays off unless `--verbose` or a log flag asks for it; `--quiet`
/// always wins.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let mut config = ConfigLoader::load_optional(cli.config.as_ref())
        .ok()
        .map(|c| c.logging)
        .unwrap_or_default();

    let requested = cli.verbose
        || cli.log_level.is_some()
        || cli.log_format.is_some()
        || cli.log_output.is_some()
        || cli.log_file.is_some();
    config.enabled = config.enabled && requested && !cli.quiet;

    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = file.clone();
        if cli.log_output.is_none() {
            config.output = "file".to_string();
        }
    }

    config
}
