#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for the `install` command.
//!
//! These tests exercise the phase list produced by [`all_install_tasks`],
//! the name-based filtering applied by `--skip` and `--only`, and full runs
//! of the pipeline against a temporary home with a scripted executor.

mod common;

use std::sync::Arc;

use common::{IntegrationTestContext, RecordingExecutor};
use dotfiles_bootstrap::cli::InstallOpts;
use dotfiles_bootstrap::commands::{install, select_tasks};
use dotfiles_bootstrap::error::{BootstrapError, ConfigError, PreconditionError};
use dotfiles_bootstrap::logging::{Logger, TaskStatus};
use dotfiles_bootstrap::prompt::{AlwaysNo, AlwaysYes, Confirm};
use dotfiles_bootstrap::tasks::all_install_tasks;

// ---------------------------------------------------------------------------
// Phase list
// ---------------------------------------------------------------------------

/// Any addition, removal, rename, or reordering of a phase fails here.
#[test]
fn install_task_names() {
    let all_tasks = all_install_tasks();
    let task_names: Vec<&str> = all_tasks.iter().map(|t| t.name()).collect();
    insta::assert_snapshot!(task_names.join("\n"), @r"
    Install packages
    Uninstall packages
    Back up conflicting files
    Deploy packages
    ");
}

#[test]
fn skip_removes_matching_phases() {
    let all = all_install_tasks();
    let opts = InstallOpts {
        skip: vec!["packages".to_string()],
        ..InstallOpts::default()
    };
    let names: Vec<&str> = select_tasks(&all, &opts).iter().map(|t| t.name()).collect();
    assert_eq!(names, vec!["Back up conflicting files"]);
}

#[test]
fn only_keeps_matching_phases() {
    let all = all_install_tasks();
    let opts = InstallOpts {
        only: vec!["INSTALL".to_string()],
        ..InstallOpts::default()
    };
    let names: Vec<&str> = select_tasks(&all, &opts).iter().map(|t| t.name()).collect();
    assert_eq!(names, vec!["Install packages", "Uninstall packages"]);
}

// ---------------------------------------------------------------------------
// Full runs
// ---------------------------------------------------------------------------

/// A dotfiles root with one `zsh` package, a conflicting `~/.zshrc`, and an
/// install list where `git` is present and `ripgrep` needs installing.
fn zsh_fixture() -> IntegrationTestContext {
    let ctx = IntegrationTestContext::new();
    ctx.write_root_file("packages.txt", "# base\ngit\nripgrep\n")
        .write_root_file("zsh/.zshrc", "export EDITOR=nvim\n")
        .write_root_file("zsh/.config/zsh/aliases", "alias ll='ls -l'\n")
        .write_home_file(".zshrc", "old shell config\n");
    ctx
}

fn zsh_executor(ctx: &IntegrationTestContext) -> Arc<RecordingExecutor> {
    let stow = format!(
        "stow --dir {} --target {} --restow zsh",
        ctx.root().display(),
        ctx.home().display()
    );
    Arc::new(
        RecordingExecutor::with_available(&["pacman", "sudo", "stow"])
            .respond("pacman -Qn git", true, "git 2.47.0-1\n")
            .respond("pacman -Si ripgrep", true, "Name : ripgrep\n")
            .respond("sudo pacman -S --needed --noconfirm ripgrep", true, "")
            .respond(&stow, true, ""),
    )
}

fn run(
    ctx: &IntegrationTestContext,
    dry_run: bool,
    opts: &InstallOpts,
    executor: &Arc<RecordingExecutor>,
    confirm: Box<dyn Confirm>,
) -> (anyhow::Result<()>, Arc<Logger>) {
    let log = Arc::new(Logger::with_log_file(None));
    let result = install::run_with(
        &ctx.global(dry_run),
        opts,
        &log,
        Arc::clone(executor) as Arc<dyn dotfiles_bootstrap::exec::Executor>,
        confirm,
    );
    (result, log)
}

fn statuses(log: &Logger) -> Vec<(String, TaskStatus)> {
    log.task_entries()
        .into_iter()
        .map(|entry| (entry.name, entry.status))
        .collect()
}

#[test]
fn full_run_backs_up_then_deploys() {
    let ctx = zsh_fixture();
    let executor = zsh_executor(&ctx);

    let (result, log) = run(
        &ctx,
        false,
        &InstallOpts::default(),
        &executor,
        Box::new(AlwaysYes),
    );
    result.unwrap();

    assert!(!ctx.home().join(".zshrc").exists());
    let backups = ctx.backup_dirs();
    assert_eq!(backups.len(), 1);
    assert_eq!(
        std::fs::read_to_string(backups[0].join(".zshrc")).unwrap(),
        "old shell config\n"
    );

    let calls = executor.calls();
    assert!(calls.contains(&"sudo pacman -S --needed --noconfirm ripgrep".to_string()));
    assert!(!calls.iter().any(|c| c.contains("-S --needed --noconfirm git")));
    assert!(calls.iter().any(|c| c.starts_with("stow ") && c.ends_with("--restow zsh")));

    assert_eq!(
        statuses(&log),
        vec![
            ("Install packages".to_string(), TaskStatus::Ok),
            ("Uninstall packages".to_string(), TaskStatus::Skipped),
            ("Back up conflicting files".to_string(), TaskStatus::Ok),
            ("Deploy packages".to_string(), TaskStatus::Ok),
        ]
    );
}

#[test]
fn dry_run_changes_nothing() {
    let ctx = zsh_fixture();
    let executor = zsh_executor(&ctx);

    let (result, log) = run(
        &ctx,
        true,
        &InstallOpts::default(),
        &executor,
        Box::new(AlwaysNo),
    );
    result.unwrap();

    assert_eq!(
        std::fs::read_to_string(ctx.home().join(".zshrc")).unwrap(),
        "old shell config\n"
    );
    assert!(ctx.backup_dirs().is_empty());
    let calls = executor.calls();
    assert!(!calls.iter().any(|c| c.starts_with("sudo ")));
    assert!(!calls.iter().any(|c| c.starts_with("stow ")));

    let dry: Vec<String> = statuses(&log)
        .into_iter()
        .filter(|(_, status)| *status == TaskStatus::DryRun)
        .map(|(name, _)| name)
        .collect();
    assert_eq!(
        dry,
        vec!["Install packages", "Back up conflicting files", "Deploy packages"]
    );
}

#[test]
fn declined_backup_aborts_before_deploy() {
    let ctx = zsh_fixture();
    ctx.write_root_file("packages.txt", "");
    let executor = zsh_executor(&ctx);

    let (result, _log) = run(
        &ctx,
        false,
        &InstallOpts::default(),
        &executor,
        Box::new(AlwaysNo),
    );
    let err = result.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BootstrapError>(),
        Some(BootstrapError::Declined { .. })
    ));

    assert!(ctx.home().join(".zshrc").exists());
    assert!(ctx.backup_dirs().is_empty());
    assert!(!executor.calls().iter().any(|c| c.starts_with("stow ")));
}

#[test]
fn only_deploy_skips_package_phases() {
    let ctx = zsh_fixture();
    std::fs::remove_file(ctx.home().join(".zshrc")).unwrap();
    let executor = zsh_executor(&ctx);
    let opts = InstallOpts {
        only: vec!["deploy".to_string()],
        ..InstallOpts::default()
    };

    let (result, log) = run(&ctx, false, &opts, &executor, Box::new(AlwaysNo));
    result.unwrap();

    assert!(!executor.calls().iter().any(|c| c.starts_with("pacman ")));
    assert_eq!(
        statuses(&log),
        vec![("Deploy packages".to_string(), TaskStatus::Ok)]
    );
}

#[test]
fn unresolvable_package_fails_the_run() {
    let ctx = IntegrationTestContext::new();
    ctx.write_root_file("packages.txt", "no-such-package\n");
    let executor = Arc::new(RecordingExecutor::with_available(&["pacman", "sudo", "stow"]));

    let (result, log) = run(
        &ctx,
        false,
        &InstallOpts::default(),
        &executor,
        Box::new(AlwaysYes),
    );
    let err = result.unwrap_err();
    assert!(
        err.to_string().contains("1 task(s) completed with failures"),
        "unexpected error: {err}"
    );
    assert_eq!(log.failure_count(), 1);
}

#[test]
fn allow_failures_keeps_exit_successful() {
    let ctx = IntegrationTestContext::new();
    ctx.write_root_file("packages.txt", "no-such-package\n");
    let executor = Arc::new(RecordingExecutor::with_available(&["pacman", "sudo", "stow"]));
    let opts = InstallOpts {
        allow_failures: true,
        ..InstallOpts::default()
    };

    let (result, log) = run(&ctx, false, &opts, &executor, Box::new(AlwaysYes));
    result.unwrap();
    assert!(log.has_failures());
}

#[test]
fn missing_install_list_is_a_config_error() {
    let ctx = IntegrationTestContext::new();
    let executor = Arc::new(RecordingExecutor::with_available(&["pacman", "sudo", "stow"]));

    let (result, _log) = run(
        &ctx,
        false,
        &InstallOpts::default(),
        &executor,
        Box::new(AlwaysYes),
    );
    let err = result.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::MissingListFile(_))
    ));
}

// ---------------------------------------------------------------------------
// Missing dotfiles root
// ---------------------------------------------------------------------------

#[test]
fn missing_root_without_repo_is_a_precondition_failure() {
    let ctx = IntegrationTestContext::without_root();
    let executor = Arc::new(RecordingExecutor::with_available(&["git"]));

    let (result, _log) = run(
        &ctx,
        false,
        &InstallOpts::default(),
        &executor,
        Box::new(AlwaysYes),
    );
    let err = result.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PreconditionError>(),
        Some(PreconditionError::MissingRoot(_))
    ));
    assert!(executor.calls().is_empty());
}

#[test]
fn missing_git_is_a_precondition_failure() {
    let ctx = IntegrationTestContext::without_root();
    let executor = Arc::new(RecordingExecutor::with_available(&[]));
    let log = Arc::new(Logger::with_log_file(None));
    let global = dotfiles_bootstrap::cli::GlobalOpts {
        repo: Some("https://example.com/dots.git".to_string()),
        ..ctx.global(false)
    };

    let err = install::run_with(
        &global,
        &InstallOpts::default(),
        &log,
        executor,
        Box::new(AlwaysYes),
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PreconditionError>(),
        Some(PreconditionError::MissingTool(tool)) if tool == "git"
    ));
}

#[test]
fn dry_run_with_missing_root_only_previews_the_clone() {
    let ctx = IntegrationTestContext::without_root();
    let executor = Arc::new(RecordingExecutor::with_available(&["git"]));
    let log = Arc::new(Logger::with_log_file(None));
    let global = dotfiles_bootstrap::cli::GlobalOpts {
        repo: Some("https://example.com/dots.git".to_string()),
        ..ctx.global(true)
    };

    install::run_with(
        &global,
        &InstallOpts::default(),
        &log,
        Arc::clone(&executor) as Arc<dyn dotfiles_bootstrap::exec::Executor>,
        Box::new(AlwaysYes),
    )
    .unwrap();

    assert!(executor.calls().is_empty());
    assert!(!ctx.root().exists());
    assert_eq!(
        statuses(&log),
        vec![("Clone repository".to_string(), TaskStatus::DryRun)]
    );
}

#[test]
fn failed_clone_is_recorded_and_fatal() {
    let ctx = IntegrationTestContext::without_root();
    let executor = Arc::new(RecordingExecutor::with_available(&["git"]));
    let log = Arc::new(Logger::with_log_file(None));
    let global = dotfiles_bootstrap::cli::GlobalOpts {
        repo: Some("https://example.com/dots.git".to_string()),
        ..ctx.global(false)
    };

    let result = install::run_with(
        &global,
        &InstallOpts::default(),
        &log,
        Arc::clone(&executor) as Arc<dyn dotfiles_bootstrap::exec::Executor>,
        Box::new(AlwaysYes),
    );
    assert!(result.is_err());
    assert_eq!(
        executor.calls(),
        vec![format!(
            "git clone https://example.com/dots.git {}",
            ctx.root().display()
        )]
    );
    assert_eq!(
        statuses(&log),
        vec![("Clone repository".to_string(), TaskStatus::Failed)]
    );
}
