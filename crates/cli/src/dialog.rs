//! Terminal dialog
//!
//! Prompts read a line from the input; end of input cancels. Notices are
//! written as titled blocks.

use crate::output::write_notice;
use owo_colors::OwoColorize;
use pinmap_core::dialog::{Dialog, Notice, TextPrompt};
use std::io::{self, BufRead, Write};

/// Dialog over a line-based reader and a writer.
pub struct TerminalDialog<R, W> {
    input: R,
    output: W,
}

impl TerminalDialog<io::StdinLock<'static>, io::Stdout> {
    /// Dialog on the process's stdin and stdout
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalDialog<R, W> {
    /// Dialog reading answers from `input` and writing to `output`
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Take back the writer
    pub fn into_output(self) -> W {
        self.output
    }

    fn ask(&mut self, prompt: &TextPrompt) -> io::Result<Option<String>> {
        writeln!(self.output, "{}", prompt.title.bold())?;

        loop {
            write!(self.output, "{} ", format!("{}:", prompt.label).dimmed())?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                return Ok(None);
            }

            let answer = line.trim_end_matches(['\r', '\n']);
            if prompt.accepts(answer) {
                return Ok(Some(answer.to_string()));
            }
            writeln!(self.output, "{} {}", "✗".red(), prompt.empty_message)?;
        }
    }
}

impl<R: BufRead, W: Write> Dialog for TerminalDialog<R, W> {
    fn prompt_text(&mut self, prompt: &TextPrompt) -> Option<String> {
        match self.ask(prompt) {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(error = %e, "Prompt failed, treating as cancelled");
                None
            }
        }
    }

    fn notify(&mut self, notice: &Notice) {
        if let Err(e) = write_notice(&mut self.output, notice) {
            tracing::warn!(error = %e, title = %notice.title, "Could not display notice");
        }
    }
}
