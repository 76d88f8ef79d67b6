//! Per-item outcomes and their aggregation into a task result.
use anyhow::Result;

use super::Context;
use crate::resources::ResourceChange;

/// Result of a single task execution.
///
/// # Examples
///
/// ```
/// use dotfiles_bootstrap::tasks::TaskResult;
///
/// let ok = TaskResult::Ok;
/// let skipped = TaskResult::Skipped("no uninstall list".into());
/// let partial = TaskResult::Incomplete { failed: 2 };
///
/// assert!(matches!(ok, TaskResult::Ok));
/// assert!(matches!(skipped, TaskResult::Skipped(_)));
/// assert!(matches!(partial, TaskResult::Incomplete { failed: 2 }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    /// Task completed and every item succeeded.
    Ok,
    /// Task had nothing to do.
    Skipped(String),
    /// Task ran in dry-run mode.
    DryRun,
    /// Task processed every item but some of them failed.
    Incomplete {
        /// Number of failed items.
        failed: usize,
    },
}

/// What happened to one item (a package, a backup target, a stow package).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// The change was made (or, in a dry run, would be made).
    Applied,
    /// Nothing to do; the item was already in the desired state.
    AlreadyOk,
    /// The item was passed over.
    Skipped(String),
    /// The change was attempted and failed.
    Failed(String),
}

/// Ordered record of item outcomes for one batch.
///
/// # Examples
///
/// ```
/// use dotfiles_bootstrap::tasks::{BatchReport, ItemOutcome};
///
/// let mut report = BatchReport::default();
/// report.push("neovim", ItemOutcome::Applied);
/// report.push("git", ItemOutcome::AlreadyOk);
/// report.push("spotify", ItemOutcome::Failed("no AUR helper".into()));
///
/// assert_eq!(report.summary(false), "1 changed, 1 already ok, 1 failed");
/// assert_eq!(report.failed(), vec!["spotify"]);
/// ```
#[derive(Debug, Default)]
pub struct BatchReport {
    items: Vec<(String, ItemOutcome)>,
}

impl BatchReport {
    /// Record the outcome for `name`.
    pub fn push(&mut self, name: &str, outcome: ItemOutcome) {
        self.items.push((name.to_string(), outcome));
    }

    /// Names of the items that failed, in processing order.
    #[must_use]
    pub fn failed(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter(|(_, outcome)| matches!(outcome, ItemOutcome::Failed(_)))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    fn count(&self, pred: impl Fn(&ItemOutcome) -> bool) -> usize {
        self.items.iter().filter(|(_, o)| pred(o)).count()
    }

    /// Format the summary (e.g. "3 changed, 10 already ok, 1 failed").
    ///
    /// Skipped and failed counts appear only when non-zero.
    #[must_use]
    pub fn summary(&self, dry_run: bool) -> String {
        let verb = if dry_run { "would change" } else { "changed" };
        let mut summary = format!(
            "{} {verb}, {} already ok",
            self.count(|o| matches!(o, ItemOutcome::Applied)),
            self.count(|o| matches!(o, ItemOutcome::AlreadyOk)),
        );
        let skipped = self.count(|o| matches!(o, ItemOutcome::Skipped(_)));
        if skipped > 0 {
            summary.push_str(&format!(", {skipped} skipped"));
        }
        let failed = self.count(|o| matches!(o, ItemOutcome::Failed(_)));
        if failed > 0 {
            summary.push_str(&format!(", {failed} failed"));
        }
        summary
    }

    /// Log a tagged line per item that was not already in place, then the
    /// summary, and return the matching [`TaskResult`].
    #[must_use]
    pub fn finish(self, ctx: &Context) -> TaskResult {
        for (name, outcome) in &self.items {
            let tag = match outcome {
                ItemOutcome::AlreadyOk => continue,
                ItemOutcome::Applied if ctx.dry_run => "would change",
                ItemOutcome::Applied => "changed",
                ItemOutcome::Skipped(_) => "skipped",
                ItemOutcome::Failed(_) => "failed",
            };
            ctx.log.item(tag, name);
        }
        ctx.log.info(&self.summary(ctx.dry_run));
        let failed = self.failed();
        if !failed.is_empty() {
            ctx.log.error(&format!("failed: {}", failed.join(", ")));
            return TaskResult::Incomplete {
                failed: failed.len(),
            };
        }
        if ctx.dry_run {
            TaskResult::DryRun
        } else {
            TaskResult::Ok
        }
    }
}

/// Turn the result of applying one resource into an [`ItemOutcome`].
///
/// Failures are logged with an error marker and never propagated.
pub fn settle(ctx: &Context, verb: &str, name: &str, result: Result<ResourceChange>) -> ItemOutcome {
    match result {
        Ok(ResourceChange::Applied) => ItemOutcome::Applied,
        Ok(ResourceChange::AlreadyCorrect) => ItemOutcome::AlreadyOk,
        Ok(ResourceChange::Skipped { reason }) => {
            ctx.log.info(&format!("{name}: {reason}"));
            ItemOutcome::Skipped(reason)
        }
        Err(e) => {
            ctx.log.error(&format!("failed to {verb} {name}: {e:#}"));
            ItemOutcome::Failed(format!("{e:#}"))
        }
    }
}
