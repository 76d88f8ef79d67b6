//! Package install and uninstall phases.
use std::collections::HashSet;

use anyhow::Result;

use super::{BatchReport, Context, ItemOutcome, Task, TaskResult, settle};
use crate::config::list;
use crate::resources::package::{InstallPlan, PackageResource, UninstallPlan};

/// Install every package on the install list.
#[derive(Debug)]
pub struct InstallPackages;

impl Task for InstallPackages {
    fn name(&self) -> &'static str {
        "Install packages"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let names = list::load_required(&ctx.config.install_list)?;
        if names.is_empty() {
            return Ok(TaskResult::Skipped("install list is empty".to_string()));
        }
        ctx.require_tool("pacman")?;
        ctx.require_tool("sudo")?;

        if ctx.aur_helper.is_none() {
            ctx.log
                .debug("no AUR helper; packages outside the official repositories will fail");
        }
        ctx.log.debug(&format!("{} packages to process", names.len()));

        let mut report = BatchReport::default();
        for name in &names {
            let resource =
                PackageResource::new(name.clone(), ctx.executor.as_ref(), ctx.aur_helper.as_deref());
            let plan = resource.install_plan();
            let outcome = match &plan {
                InstallPlan::AlreadyInstalled => {
                    ctx.log.debug(&format!("ok: {name} already installed"));
                    ItemOutcome::AlreadyOk
                }
                InstallPlan::Install(manager) if ctx.dry_run => {
                    ctx.log
                        .dry_run(&format!("would install {name} via {manager}"));
                    ItemOutcome::Applied
                }
                InstallPlan::Install(manager) => {
                    ctx.log.info(&format!("installing {name} via {manager}"));
                    settle(ctx, "install", name, resource.apply_install(&plan))
                }
                InstallPlan::Unresolvable => {
                    settle(ctx, "install", name, resource.apply_install(&plan))
                }
            };
            report.push(name, outcome);
        }
        Ok(report.finish(ctx))
    }
}

/// Remove every package on the optional uninstall list.
///
/// A name that also appears on the install list is kept.
#[derive(Debug)]
pub struct UninstallPackages;

impl Task for UninstallPackages {
    fn name(&self) -> &'static str {
        "Uninstall packages"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let Some(names) = list::load_optional(&ctx.config.uninstall_list)? else {
            return Ok(TaskResult::Skipped("no uninstall list".to_string()));
        };
        if names.is_empty() {
            return Ok(TaskResult::Skipped("uninstall list is empty".to_string()));
        }
        ctx.require_tool("pacman")?;
        ctx.require_tool("sudo")?;

        let keep: HashSet<String> = list::load_optional(&ctx.config.install_list)?
            .unwrap_or_default()
            .into_iter()
            .collect();

        let mut report = BatchReport::default();
        for name in &names {
            if keep.contains(name) {
                ctx.log
                    .warn(&format!("{name} is on both lists; keeping it installed"));
                report.push(name, ItemOutcome::Skipped("on the install list".to_string()));
                continue;
            }

            let resource =
                PackageResource::new(name.clone(), ctx.executor.as_ref(), ctx.aur_helper.as_deref());
            let plan = resource.uninstall_plan();
            let outcome = match &plan {
                UninstallPlan::Absent => {
                    ctx.log.info(&format!("{name} already absent"));
                    ItemOutcome::AlreadyOk
                }
                UninstallPlan::Remove(manager) if ctx.dry_run => {
                    ctx.log.dry_run(&format!("would remove {name} via {manager}"));
                    ItemOutcome::Applied
                }
                UninstallPlan::Remove(manager) => {
                    ctx.log.info(&format!("removing {name} via {manager}"));
                    settle(ctx, "remove", name, resource.apply_uninstall(&plan))
                }
            };
            report.push(name, outcome);
        }
        Ok(report.finish(ctx))
    }
}
