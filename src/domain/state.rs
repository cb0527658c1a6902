//! Lifecycle states of a single run

use serde::{Deserialize, Serialize};

/// State of a run.
///
/// `Created → Started → Looping → {Finishing, ErrorHandling, InterruptHandling} → Terminated`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Created,
    Started,
    Looping,
    Finishing,
    ErrorHandling,
    InterruptHandling,
    Terminated,
}

impl RunState {
    /// The three exit paths out of `Looping`. None of them re-enters the loop.
    pub fn is_exit_path(&self) -> bool {
        matches!(
            self,
            RunState::Finishing | RunState::ErrorHandling | RunState::InterruptHandling
        )
    }

    /// Check if moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: RunState) -> bool {
        use RunState::*;
        match (self, next) {
            (Created, Started) => true,
            (Started, Looping) => true,
            // a faulting start hook never reaches the loop
            (Started, ErrorHandling) | (Started, InterruptHandling) => true,
            (Looping, Finishing) | (Looping, ErrorHandling) | (Looping, InterruptHandling) => true,
            // iteration cap
            (Looping, Terminated) => true,
            // a faulting finish hook is handled as an error
            (Finishing, ErrorHandling) => true,
            (Finishing, Terminated) | (ErrorHandling, Terminated) | (InterruptHandling, Terminated) => true,
            _ => false,
        }
    }
}
