//! Stow deployment phase.
use anyhow::Result;

use super::{BatchReport, Context, ItemOutcome, Task, TaskResult, settle};
use crate::resources::stow::StowPackage;
use crate::resources::{Applicable, Resource, ResourceState};

/// Link every selected package into home, one stow invocation per package.
///
/// A failing package is recorded and the next one is still deployed;
/// earlier successes are never rolled back.
#[derive(Debug)]
pub struct DeployPackages;

impl Task for DeployPackages {
    fn name(&self) -> &'static str {
        "Deploy packages"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let packages = ctx.config.deploy_packages()?;
        if packages.is_empty() {
            return Ok(TaskResult::Skipped("no packages to deploy".to_string()));
        }
        ctx.require_tool("stow")?;

        let mut report = BatchReport::default();
        for name in &packages {
            let stow = StowPackage::new(
                name,
                &ctx.config.root,
                &ctx.config.home,
                ctx.executor.as_ref(),
            );
            let outcome = match stow.current_state()? {
                ResourceState::Invalid { reason } => {
                    ctx.log.warn(&format!("skipping {name}: {reason}"));
                    ItemOutcome::Skipped(reason)
                }
                _ if ctx.dry_run => {
                    ctx.log.dry_run(&format!("would stow {}", stow.description()));
                    ItemOutcome::Applied
                }
                _ => {
                    let outcome = settle(ctx, "deploy", name, stow.apply());
                    if outcome == ItemOutcome::Applied {
                        ctx.log.info(&format!("deployed {name}"));
                    }
                    outcome
                }
            };
            report.push(name, outcome);
        }
        Ok(report.finish(ctx))
    }
}
