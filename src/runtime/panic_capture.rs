//! Panic capture for hook calls.
//!
//! A single process-wide panic hook is installed on first use. While a hook is
//! running under [`capture`] on the current thread, a panic's location and
//! backtrace are stored instead of printed; panics anywhere else go to the
//! previously installed hook unchanged.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use thiserror::Error;

thread_local! {
    static CAPTURING: Cell<bool> = const { Cell::new(false) };
    static LAST_PANIC: RefCell<Option<(Option<String>, String)>> = const { RefCell::new(None) };
}

static INSTALL: Once = Once::new();

/// A panic raised by an application hook
#[derive(Debug, Error)]
#[error("hook panicked: {message}")]
pub struct HookPanic {
    /// Panic payload message
    pub message: String,
    /// `file:line:column` of the panic site
    pub location: Option<String>,
    /// Backtrace taken at the panic site
    pub backtrace: String,
}

impl HookPanic {
    /// Full text for the traceback log: message, panic site and backtrace.
    pub fn trace(&self) -> String {
        let location = self.location.as_deref().unwrap_or("<unknown location>");
        format!("{}\n  at {}\n\nBacktrace:\n{}", self, location, self.backtrace)
    }
}

fn install_hook() {
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if CAPTURING.with(Cell::get) {
                let location = info.location().map(|l| l.to_string());
                let backtrace = Backtrace::force_capture().to_string();
                LAST_PANIC.with(|slot| *slot.borrow_mut() = Some((location, backtrace)));
            } else {
                previous(info);
            }
        }));
    });
}

/// Run `hook`, turning a panic into a [`HookPanic`] without printing it.
pub(crate) fn capture<T>(hook: impl FnOnce() -> T) -> Result<T, HookPanic> {
    install_hook();
    CAPTURING.with(|c| c.set(true));
    let result = panic::catch_unwind(AssertUnwindSafe(hook));
    CAPTURING.with(|c| c.set(false));

    result.map_err(|payload| {
        let (location, backtrace) = LAST_PANIC
            .with(|slot| slot.borrow_mut().take())
            .unwrap_or((None, String::new()));
        HookPanic {
            message: panic_message(payload.as_ref()),
            location,
            backtrace,
        }
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
