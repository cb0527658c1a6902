//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - echo: the interactive prompt sample
//! - countdown: the timed pause sample

use apprun::RunParameters;
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

/// apprun - run a sample application under the lifecycle runtime
#[derive(Parser, Debug)]
#[command(name = "apprun")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Echo fault tracebacks to the console
    #[arg(short, long, global = true)]
    pub traceback: bool,

    /// Directory that receives <name>_error.log
    #[arg(short, long, global = true, default_value = ".")]
    pub log_dir: PathBuf,

    /// Run parameter as KEY=VALUE (repeatable; VALUE is JSON or a plain string)
    #[arg(short, long = "param", global = true, value_parser = parse_param)]
    pub params: Vec<(String, Value)>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Sample application to run
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Application name chosen for the subcommand
    pub fn app_name(&self) -> &str {
        match &self.command {
            Commands::Echo { name } | Commands::Countdown { name } => name,
        }
    }
}

/// Sample applications
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Read lines until 'exit' is entered
    Echo {
        /// Application name (error log basename)
        #[arg(short, long, default_value = "MyApp1")]
        name: String,
    },

    /// Count down with timed pauses (params: from, interval, fail_at)
    Countdown {
        /// Application name (error log basename)
        #[arg(short, long, default_value = "Countdown")]
        name: String,
    },
}

fn parse_param(raw: &str) -> Result<(String, Value), String> {
    RunParameters::parse_assignment(raw).map_err(|e| e.to_string())
}
