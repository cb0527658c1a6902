//! Run outcome types.
//!
//! This module defines how a run ended and the report handed back by
//! `Runtime::execute`.

use serde::{Deserialize, Serialize};

use super::state::RunState;

/// Exit status for faults and interrupts
pub const FAILURE_EXIT_CODE: i32 = 1;

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// The work hook returned `Terminate(code)` and the finish hook succeeded
    Finished { code: i32 },
    /// A hook failed; the message is the captured fault text
    Faulted { message: String },
    /// An external interrupt stopped the loop
    Interrupted,
    /// The configured iteration cap was reached
    Exhausted { iterations: u64 },
}

impl RunOutcome {
    /// Process exit status for this outcome
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Finished { code } => *code,
            RunOutcome::Faulted { .. } | RunOutcome::Interrupted => FAILURE_EXIT_CODE,
            RunOutcome::Exhausted { .. } => 0,
        }
    }
}

/// Everything observable about a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub outcome: RunOutcome,
    /// Completed invocations of the work hook
    pub iterations: u64,
    /// States visited, in order, starting with `Created`
    pub states: Vec<RunState>,
    /// Traceback records appended to the error log during this run
    pub records_logged: usize,
}

impl RunReport {
    pub fn exit_code(&self) -> i32 {
        self.outcome.exit_code()
    }

    /// The state the run ended in
    pub fn final_state(&self) -> Option<RunState> {
        self.states.last().copied()
    }
}
