// Shared helpers for integration tests.
//
// Provides a temporary home with a dotfiles root inside it, and a scripted
// executor so each integration test can drive the real command entry points
// without touching the system package manager or stow.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Result, bail};
use dotfiles_bootstrap::cli::GlobalOpts;
use dotfiles_bootstrap::exec::{ExecResult, Executor};

/// A temporary home directory with a dotfiles root at `<home>/dotfiles`.
///
/// Everything is deleted when the context is dropped.
pub struct IntegrationTestContext {
    dir: tempfile::TempDir,
}

impl IntegrationTestContext {
    /// Create a home with an empty dotfiles root.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir_all(dir.path().join("home").join("dotfiles"))
            .expect("create dotfiles root");
        Self { dir }
    }

    /// Create a home without a dotfiles root.
    pub fn without_root() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir_all(dir.path().join("home")).expect("create home");
        Self { dir }
    }

    /// Path to the home directory.
    pub fn home(&self) -> PathBuf {
        self.dir.path().join("home")
    }

    /// Path to the dotfiles root.
    pub fn root(&self) -> PathBuf {
        self.home().join("dotfiles")
    }

    /// Write `content` to `relative` inside the dotfiles root.
    pub fn write_root_file(&self, relative: &str, content: &str) -> &Self {
        write(&self.root().join(relative), content);
        self
    }

    /// Write `content` to `relative` inside the home directory.
    pub fn write_home_file(&self, relative: &str, content: &str) -> &Self {
        write(&self.home().join(relative), content);
        self
    }

    /// Global options pointing at this context's home and root.
    pub fn global(&self, dry_run: bool) -> GlobalOpts {
        GlobalOpts {
            dry_run,
            root: Some(self.root()),
            home: Some(self.home()),
            ..GlobalOpts::default()
        }
    }

    /// Backup directories created under home during the run.
    pub fn backup_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = std::fs::read_dir(self.home())
            .expect("read home")
            .map(|entry| entry.expect("read home entry").path())
            .filter(|path| {
                path.file_name()
                    .is_some_and(|name| name.to_string_lossy().starts_with(".dotfiles-backup-"))
            })
            .collect();
        dirs.sort();
        dirs
    }
}

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(path, content).expect("write file");
}

/// Executor that answers commands from a script and records every call.
///
/// Commands are matched on their full `program arg arg` line.  Unscripted
/// commands fail with empty output, which the package queries read as
/// "not found".
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    available: HashSet<String>,
    responses: HashMap<String, (bool, String)>,
    calls: Mutex<Vec<String>>,
}

impl RecordingExecutor {
    /// Create an executor where only `programs` are on `PATH`.
    pub fn with_available(programs: &[&str]) -> Self {
        Self {
            available: programs.iter().map(ToString::to_string).collect(),
            ..Self::default()
        }
    }

    /// Script the answer to `command`.
    pub fn respond(mut self, command: &str, success: bool, stdout: &str) -> Self {
        self.responses
            .insert(command.to_string(), (success, stdout.to_string()));
        self
    }

    /// Every command run so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn answer(&self, program: &str, args: &[&str]) -> ExecResult {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.calls.lock().expect("calls lock").push(line.clone());
        let (success, stdout) = self
            .responses
            .get(&line)
            .cloned()
            .unwrap_or((false, String::new()));
        ExecResult {
            stderr: if success {
                String::new()
            } else {
                format!("{program}: scripted failure")
            },
            stdout,
            success,
            code: Some(i32::from(!success)),
        }
    }
}

impl Executor for RecordingExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let result = self.answer(program, args);
        if !result.success {
            bail!("{program} failed: {}", result.diagnostics());
        }
        Ok(result)
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        Ok(self.answer(program, args))
    }

    fn which(&self, program: &str) -> bool {
        self.available.contains(program)
    }
}
