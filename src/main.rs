use apprun::{Bootstrap, RuntimeConfig};
use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;

mod cli;
mod demo;

use cli::Cli;
use cli::commands::Commands;
use demo::{Countdown, Echo};

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("apprun")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("apprun.log");

    // Diagnostics go to a file so they never mix with application output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn bootstrap(cli: &Cli) -> Bootstrap {
    let config = RuntimeConfig::default().with_log_dir(&cli.log_dir);
    cli.params
        .iter()
        .fold(Bootstrap::new(cli.app_name()), |bootstrap, (key, value)| {
            bootstrap.param(key.clone(), value.clone())
        })
        .traceback(cli.traceback)
        .config(config)
}

fn main() -> Result<()> {
    // Setup logging first
    setup_logging().context("Failed to setup logging")?;

    // Parse CLI arguments
    let cli = Cli::parse();

    fs::create_dir_all(&cli.log_dir)
        .context(format!("Failed to create log directory {}", cli.log_dir.display()))?;

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
        println!(
            "{} {} (errors logged to {})",
            "Running:".green(),
            cli.app_name(),
            cli.log_dir.display()
        );
    }

    info!("Starting {} with {} parameter(s)", cli.app_name(), cli.params.len());

    match &cli.command {
        Commands::Echo { .. } => bootstrap(&cli).launch(Echo::stdio),
        Commands::Countdown { .. } => bootstrap(&cli).launch(Countdown::stdio),
    }
}
