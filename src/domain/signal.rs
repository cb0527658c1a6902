//! Control signals returned by the work hook
//!
//! A work hook never unwinds to end or pause the loop. It returns one of these
//! values and the runtime acts on it.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How the loop suspends before the next iteration.
///
/// Sleep and prompt are mutually exclusive by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PauseSpec {
    /// Sleep for a fixed duration
    Sleep(Duration),
    /// Write the prompt text and block until the console acknowledges
    Prompt(String),
}

impl Default for PauseSpec {
    fn default() -> Self {
        PauseSpec::Prompt(String::new())
    }
}

/// Decision returned by one invocation of the work hook
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopSignal {
    /// Run the work hook again
    #[default]
    Continue,
    /// Leave the loop through the finish hook with this exit code
    Terminate(i32),
    /// Suspend, then run the work hook again
    Pause(PauseSpec),
}

impl LoopSignal {
    /// Orderly shutdown with the given exit code.
    pub fn terminate(code: i32) -> Self {
        LoopSignal::Terminate(code)
    }

    /// Sleep for `duration` before the next iteration.
    pub fn sleep(duration: Duration) -> Self {
        LoopSignal::Pause(PauseSpec::Sleep(duration))
    }

    /// Sleep for a number of seconds. Negative or non-finite values sleep for zero.
    pub fn sleep_secs(secs: f64) -> Self {
        Self::sleep(Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO))
    }

    /// Block on a console acknowledgment, showing `text` first.
    pub fn prompt(text: impl Into<String>) -> Self {
        LoopSignal::Pause(PauseSpec::Prompt(text.into()))
    }

    /// Pause with the default (empty prompt) behavior.
    pub fn pause() -> Self {
        LoopSignal::Pause(PauseSpec::default())
    }
}
