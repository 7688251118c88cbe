//! Yes/no confirmation seam. The asking side suspends the triggering action
//! until the user answers; dismissing the prompt counts as "no".

use std::collections::VecDeque;
use std::io::{BufRead, Write};

use anyhow::{Context, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptOutcome {
    Confirmed,
    Declined,
    /// The prompt went away without an explicit answer (EOF, escape). The
    /// pending action is canceled exactly as if the user had declined.
    Dismissed,
}

impl PromptOutcome {
    pub fn confirmed(self) -> bool {
        self == PromptOutcome::Confirmed
    }
}

pub trait ConfirmationPrompt {
    fn ask(&mut self, title: &str, message: &str) -> Result<PromptOutcome>;
}

/// Production prompt: prints the question and reads a y/n line from stdin.
/// Waits indefinitely; EOF dismisses.
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl ConfirmationPrompt for StdinPrompt {
    fn ask(&mut self, title: &str, message: &str) -> Result<PromptOutcome> {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        loop {
            write!(stdout, "{title}: {message} [y/n] ").context("writing prompt")?;
            stdout.flush().context("flushing prompt")?;
            let mut line = String::new();
            let read = stdin
                .lock()
                .read_line(&mut line)
                .context("reading prompt answer")?;
            if read == 0 {
                return Ok(PromptOutcome::Dismissed);
            }
            match line.trim().to_lowercase().as_str() {
                "y" | "yes" => return Ok(PromptOutcome::Confirmed),
                "n" | "no" => return Ok(PromptOutcome::Declined),
                _ => continue,
            }
        }
    }
}

/// Confirms everything without asking; backs the `--yes` flag.
#[derive(Debug, Default)]
pub struct AutoConfirm;

impl ConfirmationPrompt for AutoConfirm {
    fn ask(&mut self, _title: &str, _message: &str) -> Result<PromptOutcome> {
        Ok(PromptOutcome::Confirmed)
    }
}

/// Test prompt replaying scripted outcomes and recording what was asked.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    outcomes: VecDeque<PromptOutcome>,
    pub asked: Vec<(String, String)>,
}

impl ScriptedPrompt {
    pub fn replying(outcomes: impl IntoIterator<Item = PromptOutcome>) -> Self {
        Self {
            outcomes: outcomes.into_iter().collect(),
            asked: Vec::new(),
        }
    }
}

impl ConfirmationPrompt for ScriptedPrompt {
    fn ask(&mut self, title: &str, message: &str) -> Result<PromptOutcome> {
        self.asked.push((title.to_string(), message.to_string()));
        // Running out of scripted answers behaves like a dismissal.
        Ok(self.outcomes.pop_front().unwrap_or(PromptOutcome::Dismissed))
    }
}
