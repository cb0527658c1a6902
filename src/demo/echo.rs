//! Interactive sample: prompts for a line each iteration until `exit`.

use std::io::{self, BufRead, Write};

use apprun::{AppIdentity, Application, LoopSignal, RunContext};
use eyre::{Result, bail};

const FAREWELL: &str = "Leaving app...";

pub struct Echo<R, W> {
    identity: AppIdentity,
    input: R,
    output: W,
    farewell: Option<String>,
}

impl Echo<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio(identity: AppIdentity) -> Self {
        Self::new(identity, io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Echo<R, W> {
    pub fn new(identity: AppIdentity, input: R, output: W) -> Self {
        Self {
            identity,
            input,
            output,
            farewell: None,
        }
    }
}

impl<R: BufRead, W: Write> Application for Echo<R, W> {
    fn identity(&self) -> &AppIdentity {
        &self.identity
    }

    fn on_start(&mut self, _ctx: &RunContext) -> Result<()> {
        self.farewell = Some(FAREWELL.to_string());
        Ok(())
    }

    fn work(&mut self, _ctx: &RunContext) -> Result<LoopSignal> {
        writeln!(self.output, ">>>")?;
        write!(self.output, "To exit enter 'exit': ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            bail!("Input closed before 'exit' was entered");
        }
        if line.trim().eq_ignore_ascii_case("exit") {
            return Ok(LoopSignal::terminate(0));
        }
        Ok(LoopSignal::Continue)
    }

    fn on_finish(&mut self, _ctx: &RunContext) -> Result<()> {
        if let Some(farewell) = &self.farewell {
            writeln!(self.output, "{}", farewell)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apprun::{Bootstrap, RunOutcome, RuntimeConfig, runtime::ScriptedConsole};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn run(input: &str) -> (RunOutcome, u64, String) {
        let dir = TempDir::new().unwrap();
        let mut output = Vec::new();
        let report = Bootstrap::new("EchoTest")
            .config(RuntimeConfig::default().with_log_dir(dir.path()))
            .execute_with(ScriptedConsole::new(), |identity| {
                Echo::new(identity, Cursor::new(input.to_string()), &mut output)
            });
        (report.outcome, report.iterations, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_exit_terminates_with_zero() {
        let (outcome, iterations, output) = run("hello\nworld\nexit\n");
        assert_eq!(outcome, RunOutcome::Finished { code: 0 });
        assert_eq!(iterations, 3);
        assert_eq!(output.matches(">>>").count(), 3);
        assert!(output.ends_with("Leaving app...\n"));
    }

    #[test]
    fn test_exit_is_case_insensitive_and_trimmed() {
        let (outcome, iterations, _) = run("  EXIT  \n");
        assert_eq!(outcome, RunOutcome::Finished { code: 0 });
        assert_eq!(iterations, 1);
    }

    #[test]
    fn test_closed_input_is_a_fault() {
        let (outcome, _, output) = run("hello\n");
        assert!(matches!(outcome, RunOutcome::Faulted { .. }));
        assert!(!output.contains("Leaving app..."));
    }
}
