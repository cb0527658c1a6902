//! Error types for apprun
//!
//! Library-level failures use this enum. Faults raised by application hooks are
//! `eyre::Report`s and never pass through here.

use std::path::PathBuf;

use thiserror::Error;

/// All error types that can occur inside the runtime itself
#[derive(Debug, Error)]
pub enum AppRunError {
    /// Writing a traceback record failed
    #[error("Traceback log error ({path}): {source}")]
    TracebackLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The Ctrl-C handler could not be installed
    #[error("Interrupt handler error: {0}")]
    InterruptHandler(#[from] ctrlc::Error),

    /// A `KEY=VALUE` run parameter could not be parsed
    #[error("Invalid run parameter: {0}")]
    InvalidParameter(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for apprun operations
pub type Result<T> = std::result::Result<T, AppRunError>;
