//! Console output and acknowledgment input for the runtime.
//!
//! The runtime never touches stdout/stdin directly; it goes through a
//! [`Console`] so tests can script it.

use std::io::{self, BufRead, Write};

use colored::*;

/// Everything the runtime prints or reads.
pub trait Console {
    /// Write a line of normal output.
    fn line(&mut self, text: &str) -> io::Result<()>;

    /// Echo fault text, visually distinguished from normal output.
    fn fault(&mut self, text: &str) -> io::Result<()>;

    /// Show `text` and block until a line is entered.
    ///
    /// Returns `Ok(None)` at end of input.
    fn acknowledge(&mut self, text: &str) -> io::Result<Option<String>>;
}

/// Stdout/stdin console with red fault echo
#[derive(Debug, Default, Clone, Copy)]
pub struct Terminal;

impl Console for Terminal {
    fn line(&mut self, text: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{}", text)?;
        out.flush()
    }

    fn fault(&mut self, text: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "\n{}", text.red())?;
        out.flush()
    }

    fn acknowledge(&mut self, text: &str) -> io::Result<Option<String>> {
        {
            let mut out = io::stdout().lock();
            write!(out, "{}", text)?;
            out.flush()?;
        }
        let mut input = String::new();
        let read = io::stdin().lock().read_line(&mut input)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(input.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// In-memory console: records output and serves queued input lines
#[derive(Debug, Default, Clone)]
pub struct ScriptedConsole {
    input: std::collections::VecDeque<String>,
    pub lines: Vec<String>,
    pub faults: Vec<String>,
    pub prompts: Vec<String>,
}

impl ScriptedConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue lines that `acknowledge` will return, in order.
    pub fn with_input<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input.extend(lines.into_iter().map(Into::into));
        self
    }

    /// Input lines not yet consumed
    pub fn pending_input(&self) -> usize {
        self.input.len()
    }
}

impl Console for ScriptedConsole {
    fn line(&mut self, text: &str) -> io::Result<()> {
        self.lines.push(text.to_string());
        Ok(())
    }

    fn fault(&mut self, text: &str) -> io::Result<()> {
        self.faults.push(text.to_string());
        Ok(())
    }

    fn acknowledge(&mut self, text: &str) -> io::Result<Option<String>> {
        self.prompts.push(text.to_string());
        Ok(self.input.pop_front())
    }
}

impl<C: Console + ?Sized> Console for &mut C {
    fn line(&mut self, text: &str) -> io::Result<()> {
        (**self).line(text)
    }

    fn fault(&mut self, text: &str) -> io::Result<()> {
        (**self).fault(text)
    }

    fn acknowledge(&mut self, text: &str) -> io::Result<Option<String>> {
        (**self).acknowledge(text)
    }
}
