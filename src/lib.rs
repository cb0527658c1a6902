//! apprun - a minimal application lifecycle runtime
//!
//! Turns a "one iteration of work" routine into a supervised loop with start,
//! finish, error and interrupt hooks, and a file-logged failure path.

pub mod bootstrap;
pub mod domain;
pub mod error;
pub mod runtime;

pub use bootstrap::{Bootstrap, autorun};
pub use domain::{LoopSignal, PauseSpec, RunOutcome, RunParameters, RunReport, RunState};
pub use error::{AppRunError, Result};
pub use runtime::{AppIdentity, Application, HookPanic, RunContext, Runtime, RuntimeConfig};
