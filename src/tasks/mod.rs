//! Named bootstrap phases that orchestrate resource changes.
pub mod backup;
pub mod context;
pub mod deploy;
pub mod packages;
mod report;

pub use context::Context;
pub use report::{BatchReport, ItemOutcome, TaskResult, settle};

use anyhow::Result;

use crate::logging::TaskStatus;

/// A named, executable phase of the bootstrap.
pub trait Task {
    /// Human-readable task name.
    fn name(&self) -> &'static str;

    /// Whether this task has anything to do in this run.
    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    /// Execute the task.
    ///
    /// Per-item failures are reported through [`TaskResult::Incomplete`];
    /// an `Err` means the whole run must stop.
    ///
    /// # Errors
    ///
    /// Returns an error on a precondition failure, a declined confirmation,
    /// or an unreadable configuration.
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

/// The install pipeline, in execution order.
#[must_use]
pub fn all_install_tasks() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(packages::InstallPackages),
        Box::new(packages::UninstallPackages),
        Box::new(backup::BackupConflicts),
        Box::new(deploy::DeployPackages),
    ]
}

/// Execute a task, recording the result in the logger.
///
/// # Errors
///
/// Propagates a fatal task error after recording the task as failed.
pub fn execute(task: &dyn Task, ctx: &Context) -> Result<()> {
    if !task.should_run(ctx) {
        ctx.log
            .debug(&format!("skipping task: {} (nothing to do)", task.name()));
        ctx.log.record_task(task.name(), TaskStatus::Skipped, None);
        return Ok(());
    }

    ctx.log.stage(task.name());

    match task.run(ctx) {
        Ok(TaskResult::Ok) => {
            ctx.log.record_task(task.name(), TaskStatus::Ok, None);
        }
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            ctx.log
                .record_task(task.name(), TaskStatus::Skipped, Some(&reason));
        }
        Ok(TaskResult::DryRun) => {
            ctx.log.record_task(task.name(), TaskStatus::DryRun, None);
        }
        Ok(TaskResult::Incomplete { failed }) => {
            ctx.log.record_task(
                task.name(),
                TaskStatus::Failed,
                Some(&format!("{failed} item(s) failed")),
            );
        }
        Err(e) => {
            ctx.log.error(&format!("{}: {e:#}", task.name()));
            ctx.log
                .record_task(task.name(), TaskStatus::Failed, Some(&format!("{e:#}")));
            return Err(e);
        }
    }
    Ok(())
}
