//! External interrupt flag.
//!
//! The Ctrl-C handler runs on its own thread. A first signal flips the flag and
//! the run loop picks it up after the current hook returns. If the loop has not
//! acknowledged it within the grace period (a hook blocked on input, say), or a
//! second signal arrives, the handler writes the interrupt record itself and
//! exits the process.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use log::{debug, error, warn};

use super::traceback::{KEYBOARD_INTERRUPT, TracebackLog};
use crate::domain::outcome::FAILURE_EXIT_CODE;
use crate::error::Result;

/// Process exit used when an interrupt is not acknowledged in time
pub(crate) type ExitFn = Arc<dyn Fn(i32) + Send + Sync>;

/// Where a forced exit records itself and how long the loop gets to react
#[derive(Debug, Clone)]
struct Escalation {
    log: TracebackLog,
    grace: Duration,
}

#[derive(Debug, Default)]
struct State {
    triggered: AtomicBool,
    acknowledged: AtomicBool,
    // bumped by reset so stale watchdogs stand down
    generation: AtomicU64,
    escalation: Mutex<Option<Escalation>>,
}

/// Shared, cloneable interrupt flag
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    state: Arc<State>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the interrupt. Idempotent; never forces an exit.
    pub fn trigger(&self) {
        self.state.triggered.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.state.triggered.load(Ordering::SeqCst)
    }

    /// Route Ctrl-C (SIGINT on unix, CTRL_C_EVENT on windows) to this flag.
    ///
    /// Only one handler can be installed per process; a second call fails with
    /// `AppRunError::InterruptHandler`.
    pub fn install_ctrlc(&self) -> Result<()> {
        let interrupt = self.clone();
        let exit: ExitFn = Arc::new(|code| std::process::exit(code));
        ctrlc::set_handler(move || {
            debug!("Interrupt signal received");
            interrupt.signal(exit.clone());
        })?;
        debug!("Ctrl-C handler installed");
        Ok(())
    }

    /// Record where a forced exit logs to and how long the loop has to react.
    pub(crate) fn arm(&self, log: TracebackLog, grace: Duration) {
        *self.escalation() = Some(Escalation { log, grace });
    }

    /// The run loop has taken over interrupt handling.
    pub(crate) fn acknowledge(&self) {
        self.state.acknowledged.store(true, Ordering::SeqCst);
    }

    fn is_acknowledged(&self) -> bool {
        self.state.acknowledged.load(Ordering::SeqCst)
    }

    /// Clear the flag after a run so the next run starts fresh.
    pub(crate) fn reset(&self) {
        self.state.generation.fetch_add(1, Ordering::SeqCst);
        self.state.triggered.store(false, Ordering::SeqCst);
        self.state.acknowledged.store(false, Ordering::SeqCst);
    }

    /// Handle one external signal.
    pub(crate) fn signal(&self, exit: ExitFn) {
        if self.state.triggered.swap(true, Ordering::SeqCst) {
            warn!("Second interrupt received, exiting");
            self.force_exit(&exit);
            return;
        }

        let Some(grace) = self.escalation().as_ref().map(|e| e.grace) else {
            return;
        };
        let generation = self.state.generation.load(Ordering::SeqCst);
        let interrupt = self.clone();
        thread::spawn(move || {
            thread::sleep(grace);
            let current = interrupt.state.generation.load(Ordering::SeqCst);
            if current == generation && !interrupt.is_acknowledged() {
                warn!("Interrupt not acknowledged within {:?}, exiting", grace);
                interrupt.force_exit(&exit);
            }
        });
    }

    fn force_exit(&self, exit: &ExitFn) {
        if !self.is_acknowledged() {
            let escalation = self.escalation().clone();
            if let Some(escalation) = escalation {
                if let Err(e) = escalation.log.append(KEYBOARD_INTERRUPT) {
                    error!("Failed to write traceback record: {}", e);
                }
            }
        }
        exit(FAILURE_EXIT_CODE);
    }

    fn escalation(&self) -> std::sync::MutexGuard<'_, Option<Escalation>> {
        self.state
            .escalation
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Instant;
    use tempfile::TempDir;

    fn recording_exit() -> (ExitFn, Arc<Mutex<Vec<i32>>>) {
        let codes = Arc::new(Mutex::new(Vec::new()));
        let sink = codes.clone();
        let exit: ExitFn = Arc::new(move |code| sink.lock().unwrap().push(code));
        (exit, codes)
    }

    fn wait_for_exit(codes: &Arc<Mutex<Vec<i32>>>, within: Duration) {
        let deadline = Instant::now() + within;
        while codes.lock().unwrap().is_empty() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_starts_clear() {
        assert!(!Interrupt::new().is_triggered());
    }

    #[test]
    fn test_trigger_is_shared_between_clones() {
        let interrupt = Interrupt::new();
        let handle = interrupt.clone();
        handle.trigger();
        assert!(interrupt.is_triggered());
        handle.trigger();
        assert!(interrupt.is_triggered());
    }

    #[test]
    fn test_trigger_from_another_thread() {
        let interrupt = Interrupt::new();
        let handle = interrupt.clone();
        std::thread::spawn(move || handle.trigger()).join().unwrap();
        assert!(interrupt.is_triggered());
    }

    #[test]
    fn test_reset_clears_flag() {
        let interrupt = Interrupt::new();
        interrupt.trigger();
        interrupt.acknowledge();
        interrupt.reset();
        assert!(!interrupt.is_triggered());
        assert!(!interrupt.is_acknowledged());
    }

    #[test]
    fn test_unacknowledged_signal_forces_exit_with_record() {
        let dir = TempDir::new().unwrap();
        let log = TracebackLog::new(dir.path(), "Blocked");
        let interrupt = Interrupt::new();
        interrupt.arm(log.clone(), Duration::from_millis(20));
        let (exit, codes) = recording_exit();

        interrupt.signal(exit);
        assert!(interrupt.is_triggered());
        wait_for_exit(&codes, Duration::from_secs(5));

        assert_eq!(*codes.lock().unwrap(), vec![1]);
        let content = fs::read_to_string(log.path()).unwrap();
        assert!(content.contains("*** Blocked ***\nKeyboard interrupt\n\n"));
    }

    #[test]
    fn test_acknowledged_signal_does_not_exit() {
        let dir = TempDir::new().unwrap();
        let interrupt = Interrupt::new();
        interrupt.arm(TracebackLog::new(dir.path(), "Calm"), Duration::from_millis(20));
        let (exit, codes) = recording_exit();

        interrupt.signal(exit);
        interrupt.acknowledge();
        thread::sleep(Duration::from_millis(100));

        assert!(codes.lock().unwrap().is_empty());
    }

    #[test]
    fn test_reset_disarms_pending_watchdog() {
        let dir = TempDir::new().unwrap();
        let interrupt = Interrupt::new();
        interrupt.arm(TracebackLog::new(dir.path(), "Reset"), Duration::from_millis(20));
        let (exit, codes) = recording_exit();

        interrupt.signal(exit);
        interrupt.reset();
        thread::sleep(Duration::from_millis(100));

        assert!(codes.lock().unwrap().is_empty());
    }

    #[test]
    fn test_second_signal_exits_immediately() {
        let dir = TempDir::new().unwrap();
        let log = TracebackLog::new(dir.path(), "Twice");
        let interrupt = Interrupt::new();
        interrupt.arm(log.clone(), Duration::from_secs(60));
        interrupt.acknowledge();
        let (exit, codes) = recording_exit();

        interrupt.signal(exit.clone());
        interrupt.signal(exit);

        assert_eq!(*codes.lock().unwrap(), vec![1]);
        // the loop already recorded this interrupt
        assert!(!log.path().exists());
    }

    #[test]
    fn test_signal_without_arming_only_sets_flag() {
        let interrupt = Interrupt::new();
        let (exit, codes) = recording_exit();
        interrupt.signal(exit);
        thread::sleep(Duration::from_millis(50));
        assert!(interrupt.is_triggered());
        assert!(codes.lock().unwrap().is_empty());
    }
}
