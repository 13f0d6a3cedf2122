//! Terminal rendering of session progress
//!
//! Implements [`OutputSink`] with a spinner for model calls and console
//! styling for tool calls, tool results and answers.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use termcoder_core::formatting::{LineStyle, StyledLine, format_tool_call, format_tool_result, truncate_chars};
use termcoder_core::session::{OutputSink, SessionOutput};

/// Thinking traces longer than this are cut for display
const THINKING_DISPLAY_CHARS: usize = 2000;

pub struct TerminalSink {
    workspace: PathBuf,
    spinner: Mutex<Option<ProgressBar>>,
}

impl TerminalSink {
    pub fn new(workspace: PathBuf) -> Self {
        Self {
            workspace,
            spinner: Mutex::new(None),
        }
    }

    fn start_spinner(&self, model: &str) {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.blue} {msg} {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(format!("Thinking ({})...", model));
        spinner.enable_steady_tick(Duration::from_millis(100));

        if let Some(previous) = self.slot().replace(spinner) {
            previous.finish_and_clear();
        }
    }

    /// Stop the spinner if one is running; safe to call repeatedly
    pub fn stop_spinner(&self) {
        if let Some(spinner) = self.slot().take() {
            spinner.finish_and_clear();
        }
    }

    // A panic while holding the lock must not leave the spinner running
    fn slot(&self) -> MutexGuard<'_, Option<ProgressBar>> {
        self.spinner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl OutputSink for TerminalSink {
    fn emit(&self, output: SessionOutput) {
        match output {
            SessionOutput::ModelCallStarted { model } => self.start_spinner(&model),
            SessionOutput::ModelCallFinished => self.stop_spinner(),
            SessionOutput::Thinking { content } => {
                println!("{}", style(truncate_chars(content.trim(), THINKING_DISPLAY_CHARS)).dim().italic());
                println!();
            }
            SessionOutput::ToolCall { name, arguments } => {
                let line = format_tool_call(&name, &arguments, &self.workspace);
                println!("{} {}", style("●").cyan(), style(line).bold());
            }
            SessionOutput::ToolResult { name, arguments, output } => {
                for line in format_tool_result(&name, &output, &arguments, &self.workspace) {
                    print_styled(&line);
                }
                println!();
            }
            SessionOutput::AssistantMessage { content } => {
                if !content.trim().is_empty() {
                    println!("{}", content.trim_end());
                    println!();
                }
            }
            SessionOutput::RoundLimitReached { rounds } => {
                println!(
                    "{}",
                    style(format!("Stopped after {} tool rounds. Send a message to continue.", rounds)).yellow()
                );
            }
        }
    }
}

fn print_styled(line: &StyledLine) {
    let text = line.text.as_str();
    match line.style {
        LineStyle::Normal => println!("{}", text),
        LineStyle::Dim => println!("{}", style(text).dim()),
        LineStyle::Error => println!("{}", style(text).red()),
        LineStyle::Removed => println!("{}", style(text).red()),
        LineStyle::Added => println!("{}", style(text).green()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_stop_is_idempotent() {
        let sink = TerminalSink::new(PathBuf::from("/tmp"));
        *sink.slot() = Some(ProgressBar::hidden());

        sink.stop_spinner();
        sink.stop_spinner();

        assert!(sink.slot().is_none());
    }

    #[test]
    fn test_stop_after_poisoned_lock() {
        let sink = Arc::new(TerminalSink::new(PathBuf::from("/tmp")));
        *sink.slot() = Some(ProgressBar::hidden());

        let poisoner = Arc::clone(&sink);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.spinner.lock();
            panic!("poison the spinner lock");
        })
        .join();
        assert!(sink.spinner.is_poisoned());

        sink.stop_spinner();

        assert!(sink.slot().is_none());
    }
}
