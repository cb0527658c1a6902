//! Timed sample: counts down with sleeping pauses between ticks.
//!
//! Parameters: `from` (default 3), `interval` seconds (default 1.0) and an
//! optional `fail_at` tick that raises a fault.

use std::io::{self, Write};

use apprun::{AppIdentity, Application, LoopSignal, RunContext};
use eyre::{Result, WrapErr, bail};

pub struct Countdown<W> {
    identity: AppIdentity,
    output: W,
    remaining: u64,
    interval: f64,
    fail_at: Option<u64>,
}

impl Countdown<io::Stdout> {
    pub fn stdio(identity: AppIdentity) -> Self {
        Self::new(identity, io::stdout())
    }
}

impl<W: Write> Countdown<W> {
    pub fn new(identity: AppIdentity, output: W) -> Self {
        Self {
            identity,
            output,
            remaining: 3,
            interval: 1.0,
            fail_at: None,
        }
    }
}

impl<W: Write> Application for Countdown<W> {
    fn identity(&self) -> &AppIdentity {
        &self.identity
    }

    fn on_start(&mut self, ctx: &RunContext) -> Result<()> {
        let params = ctx.params();
        if let Some(from) = params.get_as::<u64>("from").wrap_err("'from' must be a whole number")? {
            self.remaining = from;
        }
        if let Some(interval) = params.get_as::<f64>("interval").wrap_err("'interval' must be a number")? {
            self.interval = interval;
        }
        self.fail_at = params.get_as::<u64>("fail_at").wrap_err("'fail_at' must be a whole number")?;
        writeln!(self.output, "{}: counting down from {}", ctx.name(), self.remaining)?;
        Ok(())
    }

    fn work(&mut self, _ctx: &RunContext) -> Result<LoopSignal> {
        if self.fail_at == Some(self.remaining) {
            bail!("Countdown failed at {}", self.remaining);
        }
        writeln!(self.output, "{}", self.remaining)?;
        if self.remaining == 0 {
            return Ok(LoopSignal::terminate(0));
        }
        self.remaining -= 1;
        Ok(LoopSignal::sleep_secs(self.interval))
    }

    fn on_finish(&mut self, _ctx: &RunContext) -> Result<()> {
        writeln!(self.output, "Liftoff")?;
        Ok(())
    }

    fn on_error(&mut self, ctx: &RunContext, fault: &eyre::Report) -> Result<()> {
        writeln!(
            self.output,
            "{} stopped: {} (details in {}_error.log)",
            ctx.name(),
            fault,
            ctx.name()
        )?;
        Ok(())
    }

    fn on_interrupt(&mut self, _ctx: &RunContext) -> Result<()> {
        writeln!(self.output, "Countdown aborted at {}", self.remaining)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apprun::{Bootstrap, RunOutcome, RunReport, RuntimeConfig, runtime::ScriptedConsole};
    use std::fs;
    use tempfile::TempDir;

    fn run(dir: &TempDir, bootstrap: Bootstrap) -> (RunReport, String) {
        let mut output = Vec::new();
        let report = bootstrap
            .config(RuntimeConfig::default().with_log_dir(dir.path()))
            .execute_with(ScriptedConsole::new(), |identity| Countdown::new(identity, &mut output));
        (report, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_counts_down_to_liftoff() {
        let dir = TempDir::new().unwrap();
        let bootstrap = Bootstrap::new("Rocket").param("from", 2).param("interval", 0.0);
        let (report, output) = run(&dir, bootstrap);
        assert_eq!(report.outcome, RunOutcome::Finished { code: 0 });
        assert_eq!(report.iterations, 3);
        assert_eq!(output, "Rocket: counting down from 2\n2\n1\n0\nLiftoff\n");
    }

    #[test]
    fn test_fail_at_routes_to_error_hook() {
        let dir = TempDir::new().unwrap();
        let bootstrap = Bootstrap::new("Faulty")
            .param("from", 3)
            .param("interval", 0.0)
            .param("fail_at", 1);
        let (report, output) = run(&dir, bootstrap);
        assert_eq!(report.exit_code(), 1);
        assert!(output.contains("Faulty stopped: Countdown failed at 1"));
        let log = fs::read_to_string(dir.path().join("Faulty_error.log")).unwrap();
        assert!(log.contains("Countdown failed at 1"));
    }

    #[test]
    fn test_bad_parameter_faults_in_start_hook() {
        let dir = TempDir::new().unwrap();
        let bootstrap = Bootstrap::new("BadParam").param("from", "many");
        let (report, _) = run(&dir, bootstrap);
        assert_eq!(report.iterations, 0);
        match report.outcome {
            RunOutcome::Faulted { message } => assert!(message.contains("'from' must be a whole number")),
            other => panic!("Expected fault, got {:?}", other),
        }
    }
}
