//! Command: the full bootstrap pipeline.
use anyhow::Result;
use std::sync::Arc;

use super::{Paths, run_tasks_to_completion, select_tasks};
use crate::cli::{GlobalOpts, InstallOpts};
use crate::config::Config;
use crate::error::PreconditionError;
use crate::exec::{Executor, SystemExecutor};
use crate::logging::{Log, Logger, TaskStatus};
use crate::prompt::{self, Confirm};
use crate::resources::Applicable;
use crate::resources::repository::RepositoryClone;
use crate::tasks::{self, Context};

const CLONE_TASK: &str = "Clone repository";

/// Run the install command against the real system.
///
/// # Errors
///
/// Returns an error if a precondition fails, the operator declines the
/// backup, or a phase recorded failures (unless `--allow-failures`).
pub fn run(global: &GlobalOpts, opts: &InstallOpts, log: &Arc<Logger>) -> Result<()> {
    run_with(
        global,
        opts,
        log,
        Arc::new(SystemExecutor),
        prompt::select(global.confirm),
    )
}

/// Run the install command with an injected executor and confirmation
/// strategy.
///
/// # Errors
///
/// See [`run`].
pub fn run_with(
    global: &GlobalOpts,
    opts: &InstallOpts,
    log: &Arc<Logger>,
    executor: Arc<dyn Executor>,
    confirm: Box<dyn Confirm>,
) -> Result<()> {
    let paths = Paths::resolve(global)?;
    let version = option_env!("BOOTSTRAP_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    log.info(&format!("bootstrap {version}"));
    log.debug(&format!("dotfiles root: {}", paths.root.display()));
    log.debug(&format!("home: {}", paths.home.display()));

    if !ensure_root(global, &paths, executor.as_ref(), log)? {
        log.print_summary();
        return Ok(());
    }

    log.stage("Loading configuration");
    let config = Config::load(&paths.root, &paths.home)?;
    log.debug(&format!("install list: {}", config.install_list.display()));

    let ctx = Context::new(
        config,
        Arc::clone(log) as Arc<dyn Log>,
        executor,
        confirm,
        global.dry_run,
    );

    let all = tasks::all_install_tasks();
    let selected = select_tasks(&all, opts);
    run_tasks_to_completion(selected, &ctx, log, opts.allow_failures)
}

/// Make sure the dotfiles root exists, cloning it when a repository is
/// configured.
///
/// Returns `false` when the root is still missing after a dry run, in which
/// case the remaining phases have nothing to read.
fn ensure_root(
    global: &GlobalOpts,
    paths: &Paths,
    executor: &dyn Executor,
    log: &Logger,
) -> Result<bool> {
    if paths.root.exists() {
        return Ok(true);
    }
    let Some(url) = global.repo.as_deref() else {
        return Err(PreconditionError::MissingRoot(paths.root.clone()).into());
    };
    if !executor.which("git") {
        return Err(PreconditionError::MissingTool("git".to_string()).into());
    }

    log.stage(CLONE_TASK);
    let clone = RepositoryClone::new(url, &paths.root, executor);
    if global.dry_run {
        log.dry_run(&format!("would clone {}", clone.description()));
        log.record_task(CLONE_TASK, TaskStatus::DryRun, None);
        log.warn("dotfiles root does not exist yet; later phases not previewed");
        return Ok(false);
    }

    if let Err(e) = clone.apply() {
        log.record_task(CLONE_TASK, TaskStatus::Failed, Some(&format!("{e:#}")));
        return Err(e);
    }
    log.info(&format!("cloned {}", clone.description()));
    log.record_task(CLONE_TASK, TaskStatus::Ok, None);
    Ok(true)
}
