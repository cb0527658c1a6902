//! Append-only traceback log, one file per application name.
//!
//! Record layout:
//!
//! ```text
//! 2024-01-31 12:00:00 *** MyApp ***
//! <fault text>
//!
//! ```

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Local;
use log::debug;

use crate::error::{AppRunError, Result};

/// Timestamp format of the record header line
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Fixed record text for an external interrupt
pub const KEYBOARD_INTERRUPT: &str = "Keyboard interrupt";

// Serializes writes from every runtime in the process.
static LOG_WRITE: Mutex<()> = Mutex::new(());

/// Writer for `<dir>/<name>_error.log`
#[derive(Debug, Clone)]
pub struct TracebackLog {
    name: String,
    path: PathBuf,
}

impl TracebackLog {
    pub fn new(dir: impl AsRef<Path>, name: impl Into<String>) -> Self {
        let name = name.into();
        let path = dir.as_ref().join(Self::file_name(&name));
        Self { name, path }
    }

    /// `<name>_error.log`, with path separators in `name` replaced by `_`
    /// so the log always lands directly inside the log directory.
    pub fn file_name(name: &str) -> String {
        let stem: String = name
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
            .collect();
        format!("{}_error.log", stem)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Format one record without writing it.
    pub fn format_record(&self, timestamp: &str, text: &str) -> String {
        let mut record = format!("{} *** {} ***\n{}", timestamp, self.name, text);
        if !record.ends_with('\n') {
            record.push('\n');
        }
        record.push('\n');
        record
    }

    /// Append one record stamped with the current local time.
    ///
    /// The file is created if absent and closed before returning.
    pub fn append(&self, text: &str) -> Result<()> {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let record = self.format_record(&timestamp, text);

        let _guard = LOG_WRITE.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let to_log_error = |source| AppRunError::TracebackLog {
            path: self.path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(to_log_error)?;
        file.write_all(record.as_bytes()).map_err(to_log_error)?;
        debug!("Appended traceback record to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_file_name() {
        assert_eq!(TracebackLog::file_name("MyApp1"), "MyApp1_error.log");
    }

    #[test]
    fn test_file_name_replaces_path_separators() {
        assert_eq!(TracebackLog::file_name("../etc/app"), ".._etc_app_error.log");
        assert_eq!(TracebackLog::file_name("win\\app"), "win_app_error.log");
    }

    #[test]
    fn test_separator_name_stays_in_dir() {
        let dir = TempDir::new().unwrap();
        let log = TracebackLog::new(dir.path(), "nested/app");
        assert_eq!(log.path().parent(), Some(dir.path()));
        log.append("boom").unwrap();
        let content = fs::read_to_string(log.path()).unwrap();
        // the header keeps the real name
        assert!(content.contains("*** nested/app ***\nboom\n\n"));
    }

    #[test]
    fn test_path_in_dir() {
        let log = TracebackLog::new("/var/tmp", "svc");
        assert_eq!(log.path(), Path::new("/var/tmp/svc_error.log"));
    }

    #[test]
    fn test_format_record_adds_blank_line() {
        let log = TracebackLog::new(".", "MyApp");
        assert_eq!(
            log.format_record("2024-01-31 12:00:00", "boom"),
            "2024-01-31 12:00:00 *** MyApp ***\nboom\n\n"
        );
    }

    #[test]
    fn test_format_record_keeps_single_trailing_newline() {
        let log = TracebackLog::new(".", "MyApp");
        assert_eq!(
            log.format_record("2024-01-31 12:00:00", "boom\n"),
            "2024-01-31 12:00:00 *** MyApp ***\nboom\n\n"
        );
    }

    #[test]
    fn test_append_creates_file() {
        let dir = TempDir::new().unwrap();
        let log = TracebackLog::new(dir.path(), "fresh");
        assert!(!log.path().exists());
        log.append(KEYBOARD_INTERRUPT).unwrap();
        let content = fs::read_to_string(log.path()).unwrap();
        assert!(content.contains("*** fresh ***\nKeyboard interrupt\n\n"));
    }

    #[test]
    fn test_append_accumulates() {
        let dir = TempDir::new().unwrap();
        let log = TracebackLog::new(dir.path(), "acc");
        log.append("first").unwrap();
        log.append("second").unwrap();
        let content = fs::read_to_string(log.path()).unwrap();
        assert_eq!(content.matches("*** acc ***").count(), 2);
        assert!(content.find("first").unwrap() < content.find("second").unwrap());
    }

    #[test]
    fn test_append_to_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let log = TracebackLog::new(dir.path().join("missing"), "nope");
        let err = log.append("boom").unwrap_err();
        assert!(matches!(err, AppRunError::TracebackLog { .. }));
    }
}
