//! Confirmation strategies for destructive steps.
//!
//! The strategy is chosen once at startup from `--confirm` and terminal
//! attachment; phases only ever see a [`Confirm`] object.
use anyhow::{Context as _, Result};
use std::io::{self, BufRead, IsTerminal, Write};

/// How the run answers confirmation prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ConfirmMode {
    /// Prompt when attached to a terminal, otherwise proceed.
    #[default]
    Auto,
    /// Always prompt on the terminal.
    Prompt,
    /// Answer yes to every prompt.
    Yes,
    /// Answer no to every prompt.
    No,
}

/// Yes/no decision point for destructive operations.
#[cfg_attr(test, mockall::automock)]
pub trait Confirm {
    /// Ask the operator to approve `message`.
    ///
    /// # Errors
    ///
    /// Returns an error if the answer cannot be read.
    fn confirm(&self, message: &str) -> Result<bool>;

    /// Whether approval was assumed because nobody is there to answer.
    fn is_unattended(&self) -> bool {
        false
    }
}

/// Reads a `[y/N]` answer from stdin; anything but `y`/`yes` declines.
#[derive(Debug, Default, Clone, Copy)]
pub struct InteractivePrompt;

impl Confirm for InteractivePrompt {
    #[allow(clippy::print_stderr)]
    fn confirm(&self, message: &str) -> Result<bool> {
        eprint!("{message} [y/N] ");
        io::stderr().flush().context("flushing prompt")?;

        let mut input = String::new();
        io::stdin()
            .lock()
            .read_line(&mut input)
            .context("reading confirmation")?;
        Ok(parse_answer(&input))
    }
}

/// Approves every prompt.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysYes;

impl Confirm for AlwaysYes {
    fn confirm(&self, _message: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Approves every prompt because no terminal is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unattended;

impl Confirm for Unattended {
    fn confirm(&self, _message: &str) -> Result<bool> {
        Ok(true)
    }

    fn is_unattended(&self) -> bool {
        true
    }
}

/// Declines every prompt.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysNo;

impl Confirm for AlwaysNo {
    fn confirm(&self, _message: &str) -> Result<bool> {
        Ok(false)
    }
}

/// Interpret a typed answer. Only `y` and `yes` (any case) approve.
fn parse_answer(input: &str) -> bool {
    matches!(input.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Build the strategy for `mode`.
///
/// `Auto` prompts only when both stdin and stderr are terminals and
/// otherwise approves, so unattended runs proceed with their backups.
#[must_use]
pub fn select(mode: ConfirmMode) -> Box<dyn Confirm> {
    let attached = io::stdin().is_terminal() && io::stderr().is_terminal();
    select_for(mode, attached)
}

fn select_for(mode: ConfirmMode, attached: bool) -> Box<dyn Confirm> {
    match mode {
        ConfirmMode::Auto if attached => Box::new(InteractivePrompt),
        ConfirmMode::Auto => Box::new(Unattended),
        ConfirmMode::Yes => Box::new(AlwaysYes),
        ConfirmMode::Prompt => Box::new(InteractivePrompt),
        ConfirmMode::No => Box::new(AlwaysNo),
    }
}
