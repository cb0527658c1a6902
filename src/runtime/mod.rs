//! Runtime core - the supervised run loop.
//!
//! This module provides:
//! - Application / RunContext: the hook contract and what hooks can see
//! - Runtime: the loop driver and its three exit paths
//! - TracebackLog: the per-application error log
//! - Console / Interrupt: the pluggable console and the interrupt flag
//! - HookPanic: a hook panic with its site and backtrace

mod application;
mod config;
mod console;
mod interrupt;
mod panic_capture;
mod runner;
mod traceback;

pub use application::{AppIdentity, Application, RunContext};
pub use config::RuntimeConfig;
pub use console::{Console, ScriptedConsole, Terminal};
pub use interrupt::Interrupt;
pub use panic_capture::HookPanic;
pub use runner::{BANNER_SEPARATOR, Runtime};
pub use traceback::{KEYBOARD_INTERRUPT, TIMESTAMP_FORMAT, TracebackLog};
