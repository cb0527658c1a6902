//! Runtime configuration.
//!
//! Plain values with defaults and `with_*` builders. The CLI fills in the log
//! directory; tests shorten the poll interval and cap the iteration count.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Knobs for a single runtime.
///
/// Built in code or from CLI flags; never read from a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Directory that holds `<name>_error.log`
    pub log_dir: PathBuf,
    /// Stop after this many work iterations. `None` loops until a signal.
    pub max_iterations: Option<u64>,
    /// How often a sleeping pause checks for an interrupt
    #[serde(with = "millis")]
    pub interrupt_poll: Duration,
    /// How long a Ctrl-C may go unanswered before the process exits on its own
    #[serde(with = "millis")]
    pub interrupt_grace: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("."),
            max_iterations: None,
            interrupt_poll: Duration::from_millis(50),
            interrupt_grace: Duration::from_secs(2),
        }
    }
}

impl RuntimeConfig {
    /// Set the error log directory.
    pub fn with_log_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.log_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Cap the number of work iterations.
    pub fn with_max_iterations(mut self, max: u64) -> Self {
        self.max_iterations = Some(max);
        self
    }

    /// Set the interrupt poll interval. Zero is raised to one millisecond.
    pub fn with_interrupt_poll(mut self, poll: Duration) -> Self {
        self.interrupt_poll = poll.max(Duration::from_millis(1));
        self
    }

    /// Set how long a blocked hook may ignore Ctrl-C before a forced exit.
    pub fn with_interrupt_grace(mut self, grace: Duration) -> Self {
        self.interrupt_grace = grace;
        self
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.log_dir, PathBuf::from("."));
        assert!(config.max_iterations.is_none());
        assert_eq!(config.interrupt_poll, Duration::from_millis(50));
        assert_eq!(config.interrupt_grace, Duration::from_secs(2));
    }

    #[test]
    fn test_builders() {
        let config = RuntimeConfig::default()
            .with_log_dir("/tmp/logs")
            .with_max_iterations(10)
            .with_interrupt_poll(Duration::ZERO)
            .with_interrupt_grace(Duration::from_millis(250));
        assert_eq!(config.log_dir, PathBuf::from("/tmp/logs"));
        assert_eq!(config.max_iterations, Some(10));
        assert_eq!(config.interrupt_poll, Duration::from_millis(1));
        assert_eq!(config.interrupt_grace, Duration::from_millis(250));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: RuntimeConfig = serde_json::from_str(r#"{"max_iterations": 3}"#).unwrap();
        assert_eq!(config.max_iterations, Some(3));
        assert_eq!(config.interrupt_poll, Duration::from_millis(50));
    }
}
