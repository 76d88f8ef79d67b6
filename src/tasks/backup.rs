//! Target resolution and backup of conflicting entries before deployment.
use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::Result;

use super::{BatchReport, Context, ItemOutcome, Task, TaskResult};
use crate::error::BootstrapError;
use crate::resources::backup::{BackupEntry, create_backup_root};
use crate::resources::stow::resolve_targets;
use crate::resources::{Applicable, Resource, ResourceState};

/// Compute the deduplicated set of home paths the selected packages occupy.
///
/// Package directories that do not exist are skipped with a warning.
///
/// # Errors
///
/// Returns an error if a package tree cannot be walked.
pub fn resolve_all_targets(ctx: &Context, packages: &[String]) -> Result<BTreeSet<PathBuf>> {
    let mut targets = BTreeSet::new();
    for package in packages {
        match resolve_targets(&ctx.config.root, package, &ctx.config.home)? {
            Some(found) => {
                ctx.log
                    .debug(&format!("{package}: {} top-level target(s)", found.len()));
                targets.extend(found);
            }
            None => ctx
                .log
                .warn(&format!("package directory not found, skipping: {package}")),
        }
    }
    Ok(targets)
}

/// Move pre-existing entries out of the way of the deployment.
#[derive(Debug)]
pub struct BackupConflicts;

impl Task for BackupConflicts {
    fn name(&self) -> &'static str {
        "Back up conflicting files"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let packages = ctx.config.deploy_packages()?;
        let targets = resolve_all_targets(ctx, &packages)?;
        ctx.log
            .debug(&format!("{} target(s) resolved", targets.len()));

        let mut conflicts = Vec::new();
        for target in &targets {
            let entry = BackupEntry::new(
                target,
                &ctx.config.home,
                &ctx.backup_root,
                &ctx.config.root,
            );
            if let ResourceState::Invalid { reason } = entry.current_state()? {
                ctx.log
                    .warn(&format!("leaving {} in place: {reason}", target.display()));
                continue;
            }
            if entry.needs_change()? {
                conflicts.push(entry);
            }
        }
        if conflicts.is_empty() {
            return Ok(TaskResult::Skipped("no conflicting files".to_string()));
        }

        let mut report = BatchReport::default();
        if ctx.dry_run {
            for entry in &conflicts {
                ctx.log
                    .dry_run(&format!("would back up {}", entry.description()));
                report.push(&entry.target.display().to_string(), ItemOutcome::Applied);
            }
            return Ok(report.finish(ctx));
        }

        ctx.log.info(&format!(
            "{} existing path(s) will be moved to {}:",
            conflicts.len(),
            ctx.backup_root.display()
        ));
        for entry in &conflicts {
            ctx.log.info(&format!("  {}", entry.target.display()));
        }
        let prompt = format!("Move {} path(s) to the backup directory?", conflicts.len());
        if !ctx.confirm.confirm(&prompt)? {
            return Err(BootstrapError::Declined {
                action: format!("backup of {} path(s)", conflicts.len()),
            }
            .into());
        }
        if ctx.confirm.is_unattended() {
            ctx.log.warn("not attached to a terminal; backing up without a prompt");
        }

        create_backup_root(&ctx.backup_root)?;
        for entry in &conflicts {
            entry.apply()?;
            ctx.log.info(&format!("backed up {}", entry.description()));
            report.push(&entry.target.display().to_string(), ItemOutcome::Applied);
        }
        Ok(report.finish(ctx))
    }
}
