//! Domain types for apprun
//!
//! This module contains the value types shared by the runtime and its callers:
//! - RunParameters: the immutable snapshot of named run parameters
//! - LoopSignal: what the work hook asks the loop to do next
//! - RunState: the lifecycle state machine
//! - RunOutcome / RunReport: how a run ended

pub mod outcome;
pub mod params;
pub mod signal;
pub mod state;

pub use outcome::{RunOutcome, RunReport};
pub use params::RunParameters;
pub use signal::{LoopSignal, PauseSpec};
pub use state::RunState;
