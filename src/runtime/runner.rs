//! Run loop implementation - drives an application through its lifecycle.
//!
//! The Runtime executes a single application run:
//! 1. Invokes the start hook once
//! 2. Invokes the work hook repeatedly, acting on the returned signal
//! 3. Leaves through exactly one of finish, error or interrupt handling
//! 4. Terminates the process with the outcome's exit code

use std::thread;
use std::time::{Duration, Instant};

use eyre::{WrapErr, eyre};
use log::{debug, error, info, warn};

use super::application::{Application, RunContext};
use super::config::RuntimeConfig;
use super::console::{Console, Terminal};
use super::interrupt::Interrupt;
use super::panic_capture::{HookPanic, capture};
use super::traceback::{KEYBOARD_INTERRUPT, TracebackLog};
use crate::domain::{LoopSignal, PauseSpec, RunOutcome, RunParameters, RunReport, RunState};

/// First line of the shutdown banner
pub const BANNER_SEPARATOR: &str = "----------------------------------------";

/// What happened while the loop was paused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PauseResult {
    Resumed,
    Interrupted,
}

/// Bookkeeping for one run
struct Tracker {
    states: Vec<RunState>,
    iterations: u64,
    records_logged: usize,
}

impl Tracker {
    fn new() -> Self {
        Self {
            states: vec![RunState::Created],
            iterations: 0,
            records_logged: 0,
        }
    }

    fn enter(&mut self, next: RunState) {
        if let Some(current) = self.states.last() {
            debug_assert!(
                current.can_transition_to(next),
                "illegal transition {:?} -> {:?}",
                current,
                next
            );
            debug!("State {:?} -> {:?}", current, next);
        }
        self.states.push(next);
    }

    fn finish(mut self, outcome: RunOutcome) -> RunReport {
        debug_assert!(
            matches!(outcome, RunOutcome::Exhausted { .. })
                || self.states.last().is_some_and(|state| state.is_exit_path()),
            "run ended outside an exit path: {:?}",
            self.states
        );
        self.enter(RunState::Terminated);
        RunReport {
            outcome,
            iterations: self.iterations,
            states: self.states,
            records_logged: self.records_logged,
        }
    }
}

/// Runtime executes one application run at a time.
///
/// The console defaults to the process terminal; tests substitute a
/// `ScriptedConsole`.
pub struct Runtime<C: Console = Terminal> {
    config: RuntimeConfig,
    console: C,
    interrupt: Interrupt,
}

impl Runtime<Terminal> {
    /// Create a runtime that talks to stdout/stdin.
    pub fn new(config: RuntimeConfig) -> Self {
        Self::with_console(config, Terminal)
    }
}

impl<C: Console> Runtime<C> {
    /// Create a runtime with a custom console.
    pub fn with_console(config: RuntimeConfig, console: C) -> Self {
        Self {
            config,
            console,
            interrupt: Interrupt::new(),
        }
    }

    /// Share an existing interrupt flag (e.g. one wired to Ctrl-C).
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Handle for raising the external interrupt
    pub fn interrupt(&self) -> &Interrupt {
        &self.interrupt
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn into_console(self) -> C {
        self.console
    }

    /// Run the application and terminate the process with the outcome's code.
    pub fn run<A: Application>(&mut self, app: A, params: RunParameters) -> ! {
        let report = self.execute(app, params);
        info!("Exiting with code {}", report.exit_code());
        std::process::exit(report.exit_code())
    }

    /// Drive the full lifecycle and return what happened instead of exiting.
    ///
    /// The interrupt flag is cleared when the run ends, so a runtime can be
    /// reused for another run.
    pub fn execute<A: Application>(&mut self, mut app: A, params: RunParameters) -> RunReport {
        let ctx = RunContext::new(app.identity().clone(), params);
        let log = TracebackLog::new(&self.config.log_dir, ctx.name());
        self.interrupt.arm(log.clone(), self.config.interrupt_grace);

        let report = self.drive(&mut app, &ctx, &log);
        self.interrupt.reset();
        report
    }

    fn drive<A: Application>(&mut self, app: &mut A, ctx: &RunContext, log: &TracebackLog) -> RunReport {
        let mut tracker = Tracker::new();

        info!("Starting application {} with {} parameter(s)", ctx.name(), ctx.params().len());
        tracker.enter(RunState::Started);
        let started = guarded(|| app.on_start(ctx));
        if self.interrupted_after(ctx, "start", &started) {
            return self.handle_interrupt(app, ctx, log, tracker);
        }
        if let Err(fault) = started {
            return self.handle_fault(app, ctx, log, tracker, fault);
        }

        tracker.enter(RunState::Looping);
        loop {
            if self.interrupt.is_triggered() {
                return self.handle_interrupt(app, ctx, log, tracker);
            }
            if let Some(max) = self.config.max_iterations {
                if tracker.iterations >= max {
                    info!("{} reached the iteration cap of {}", ctx.name(), max);
                    let iterations = tracker.iterations;
                    return tracker.finish(RunOutcome::Exhausted { iterations });
                }
            }

            let worked = guarded(|| app.work(ctx));
            tracker.iterations += 1;
            if self.interrupted_after(ctx, "work", &worked) {
                return self.handle_interrupt(app, ctx, log, tracker);
            }
            let signal = match worked {
                Ok(signal) => signal,
                Err(fault) => return self.handle_fault(app, ctx, log, tracker, fault),
            };

            match signal {
                LoopSignal::Continue => {}
                LoopSignal::Terminate(code) => {
                    return self.handle_finish(app, ctx, log, tracker, code);
                }
                LoopSignal::Pause(spec) => match self.pause(&spec) {
                    Ok(PauseResult::Resumed) => {}
                    Ok(PauseResult::Interrupted) => {
                        return self.handle_interrupt(app, ctx, log, tracker);
                    }
                    Err(fault) => return self.handle_fault(app, ctx, log, tracker, fault),
                },
            }
        }
    }

    /// An interrupt raised while a hook ran outranks whatever the hook returned.
    fn interrupted_after<T>(&self, ctx: &RunContext, hook: &str, result: &eyre::Result<T>) -> bool {
        if !self.interrupt.is_triggered() {
            return false;
        }
        if let Err(fault) = result {
            warn!("{} {} hook faulted after an interrupt: {}", ctx.name(), hook, fault);
        }
        true
    }

    fn handle_finish<A: Application>(
        &mut self,
        app: &mut A,
        ctx: &RunContext,
        log: &TracebackLog,
        mut tracker: Tracker,
        code: i32,
    ) -> RunReport {
        tracker.enter(RunState::Finishing);
        if let Err(fault) = guarded(|| app.on_finish(ctx)) {
            return self.handle_fault(app, ctx, log, tracker, fault);
        }

        info!("{} finished with exit code {}", ctx.name(), code);
        let banner = format!("{} finished with exit code {}", ctx.name(), code);
        for line in [BANNER_SEPARATOR, banner.as_str()] {
            if let Err(e) = self.console.line(line) {
                warn!("Failed to write shutdown banner: {}", e);
            }
        }
        tracker.finish(RunOutcome::Finished { code })
    }

    fn handle_fault<A: Application>(
        &mut self,
        app: &mut A,
        ctx: &RunContext,
        log: &TracebackLog,
        mut tracker: Tracker,
        fault: eyre::Report,
    ) -> RunReport {
        tracker.enter(RunState::ErrorHandling);
        let text = fault_text(&fault);
        error!("{} faulted: {}", ctx.name(), fault);
        self.record(ctx, log, &mut tracker, &text);

        if let Err(second) = guarded(|| app.on_error(ctx, &fault)) {
            error!("{} error hook faulted: {}", ctx.name(), second);
            self.record(ctx, log, &mut tracker, &fault_text(&second));
        }
        tracker.finish(RunOutcome::Faulted { message: text })
    }

    fn handle_interrupt<A: Application>(
        &mut self,
        app: &mut A,
        ctx: &RunContext,
        log: &TracebackLog,
        mut tracker: Tracker,
    ) -> RunReport {
        tracker.enter(RunState::InterruptHandling);
        self.interrupt.acknowledge();
        warn!("{} interrupted", ctx.name());
        self.record(ctx, log, &mut tracker, KEYBOARD_INTERRUPT);

        if let Err(fault) = guarded(|| app.on_interrupt(ctx)) {
            error!("{} interrupt hook faulted: {}", ctx.name(), fault);
            self.record(ctx, log, &mut tracker, &fault_text(&fault));
        }
        if let Err(e) = self.console.line("") {
            warn!("Failed to write to console: {}", e);
        }
        tracker.finish(RunOutcome::Interrupted)
    }

    /// Append a traceback record and optionally echo it.
    fn record(&mut self, ctx: &RunContext, log: &TracebackLog, tracker: &mut Tracker, text: &str) {
        match log.append(text) {
            Ok(()) => tracker.records_logged += 1,
            Err(e) => error!("Failed to write traceback record: {}", e),
        }
        if ctx.print_traceback() {
            if let Err(e) = self.console.fault(text) {
                warn!("Failed to echo traceback: {}", e);
            }
        }
    }

    fn pause(&mut self, spec: &PauseSpec) -> eyre::Result<PauseResult> {
        match spec {
            PauseSpec::Sleep(duration) => {
                debug!("Pausing for {:?}", duration);
                Ok(self.sleep(*duration))
            }
            PauseSpec::Prompt(text) => {
                debug!("Pausing for acknowledgment");
                let read = self.console.acknowledge(text);
                // Ctrl-C usually closes or breaks the read as well
                if self.interrupt.is_triggered() {
                    return Ok(PauseResult::Interrupted);
                }
                let line = read.wrap_err("Failed to read pause acknowledgment")?;
                if line.is_none() {
                    return Err(eyre!("End of input while waiting for pause acknowledgment"));
                }
                Ok(PauseResult::Resumed)
            }
        }
    }

    /// Sleep in slices of `interrupt_poll`, bailing out on interrupt.
    fn sleep(&self, duration: Duration) -> PauseResult {
        let deadline = Instant::now() + duration;
        loop {
            if self.interrupt.is_triggered() {
                return PauseResult::Interrupted;
            }
            let now = Instant::now();
            if now >= deadline {
                return PauseResult::Resumed;
            }
            thread::sleep((deadline - now).min(self.config.interrupt_poll));
        }
    }
}

/// Run a hook, turning a panic into a fault.
fn guarded<T>(hook: impl FnOnce() -> eyre::Result<T>) -> eyre::Result<T> {
    capture(hook).unwrap_or_else(|panic| Err(eyre::Report::new(panic)))
}

/// Log text for a fault. A panic carries its own site and backtrace.
fn fault_text(fault: &eyre::Report) -> String {
    match fault.downcast_ref::<HookPanic>() {
        Some(panic) => panic.trace(),
        None => format!("{:?}", fault),
    }
}
