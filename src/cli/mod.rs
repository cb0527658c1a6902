//! CLI module for apprun - command-line interface and subcommands.
//!
//! Selects one of the sample applications and the runtime options it runs with.

pub mod commands;

pub use commands::Cli;
