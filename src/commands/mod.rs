//! Top-level subcommand orchestration.
pub mod audit;
pub mod install;

use anyhow::Result;
use std::path::PathBuf;

use crate::cli::{GlobalOpts, InstallOpts};
use crate::error::PreconditionError;
use crate::logging::Logger;
use crate::tasks::{self, Context, Task};

/// Home and dotfiles root for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    /// Target directory packages are deployed into.
    pub home: PathBuf,
    /// Root of the dotfiles tree.
    pub root: PathBuf,
}

impl Paths {
    /// Resolve paths from the global options, falling back to `$HOME` and
    /// `<home>/dotfiles`.
    ///
    /// # Errors
    ///
    /// Returns [`PreconditionError::NoHome`] if no home directory is given
    /// and `HOME` is unset.
    pub fn resolve(global: &GlobalOpts) -> Result<Self, PreconditionError> {
        Self::resolve_with(global, std::env::var_os("HOME").map(PathBuf::from))
    }

    fn resolve_with(
        global: &GlobalOpts,
        env_home: Option<PathBuf>,
    ) -> Result<Self, PreconditionError> {
        let home = global
            .home
            .clone()
            .or(env_home)
            .filter(|home| !home.as_os_str().is_empty())
            .ok_or_else(|| PreconditionError::NoHome("HOME is not set".to_string()))?;
        let root = global
            .root
            .clone()
            .unwrap_or_else(|| home.join("dotfiles"));
        Ok(Self { home, root })
    }
}

/// Apply `--only` and `--skip` to the phase list.
///
/// Names match case-insensitively by substring; `--only` wins when both are
/// given.
#[must_use]
pub fn select_tasks<'a>(all: &'a [Box<dyn Task>], opts: &InstallOpts) -> Vec<&'a dyn Task> {
    all.iter()
        .filter(|t| {
            let name = t.name().to_lowercase();
            if !opts.only.is_empty() {
                return opts.only.iter().any(|o| name.contains(&o.to_lowercase()));
            }
            if !opts.skip.is_empty() {
                return !opts.skip.iter().any(|s| name.contains(&s.to_lowercase()));
            }
            true
        })
        .map(AsRef::as_ref)
        .collect()
}

/// Execute every task in order, print the summary, and bail if any task failed.
///
/// A fatal task error stops the run immediately.  Per-item failures let the
/// remaining tasks run and then fail the command unless `allow_failures` is
/// set.
///
/// # Errors
///
/// Returns the fatal error of the first task that aborted, or an error if
/// one or more tasks recorded failures and `allow_failures` is false.
pub fn run_tasks_to_completion<'a>(
    tasks: impl IntoIterator<Item = &'a dyn Task>,
    ctx: &Context,
    log: &Logger,
    allow_failures: bool,
) -> Result<()> {
    for task in tasks {
        if let Err(e) = tasks::execute(task, ctx) {
            log.print_summary();
            return Err(e);
        }
    }

    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        if allow_failures {
            log.warn(&format!(
                "ignoring failures in {count} task(s) (--allow-failures)"
            ));
        } else {
            anyhow::bail!("{count} task(s) completed with failures");
        }
    }
    Ok(())
}
