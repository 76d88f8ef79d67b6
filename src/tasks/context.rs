//! Shared execution context for tasks.
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;

use crate::config::Config;
use crate::exec::Executor;
use crate::logging::Log;
use crate::prompt::Confirm;
use crate::resources::backup::backup_root_path;
use crate::resources::package::detect_aur_helper;

/// Everything a task needs, resolved once before the first task runs.
pub struct Context {
    /// Resolved run configuration.
    pub config: Config,
    /// Logger for output and task recording.
    pub log: Arc<dyn Log>,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Confirmation strategy for destructive steps.
    pub confirm: Box<dyn Confirm>,
    /// Whether to perform a dry run (preview changes without applying).
    pub dry_run: bool,
    /// AUR helper detected at startup, if any.
    pub aur_helper: Option<String>,
    /// Run-scoped backup directory; created only if something is backed up.
    pub backup_root: PathBuf,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("log", &"<dyn Log>")
            .field("executor", &self.executor)
            .field("confirm", &"<dyn Confirm>")
            .field("dry_run", &self.dry_run)
            .field("aur_helper", &self.aur_helper)
            .field("backup_root", &self.backup_root)
            .finish()
    }
}

impl Context {
    /// Create a context, detecting the AUR helper and naming the backup root
    /// from the current local time.
    #[must_use]
    pub fn new(
        config: Config,
        log: Arc<dyn Log>,
        executor: Arc<dyn Executor>,
        confirm: Box<dyn Confirm>,
        dry_run: bool,
    ) -> Self {
        let aur_helper = detect_aur_helper(&config.aur_helpers, executor.as_ref());
        match &aur_helper {
            Some(helper) => log.debug(&format!("AUR helper: {helper}")),
            None => log.debug("no AUR helper found"),
        }
        let backup_root = backup_root_path(&config.home, &config.backup_prefix, &Local::now());
        Self {
            config,
            log,
            executor,
            confirm,
            dry_run,
            aur_helper,
            backup_root,
        }
    }

    /// Fail with a precondition error unless `program` is on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`PreconditionError::MissingTool`](crate::error::PreconditionError::MissingTool)
    /// when the program cannot be found.
    pub fn require_tool(&self, program: &str) -> anyhow::Result<()> {
        if self.executor.which(program) {
            Ok(())
        } else {
            Err(crate::error::PreconditionError::MissingTool(program.to_string()).into())
        }
    }
}
