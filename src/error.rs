//! Domain-specific error types for the bootstrap engine.
//!
//! Every fatal error travels as an [`anyhow::Error`] wrapping one of three
//! typed errors; callers that need the category use `downcast_ref`.
//!
//! ```text
//! ConfigError        config file and list file loading
//! PreconditionError  missing tools, roots, backup collisions, no home
//! BootstrapError     operator refused a destructive step
//! ```
//!
//! Per-item failures (one package failing to install, one stow package
//! failing to deploy) are not errors. They are recorded as
//! [`ItemOutcome::Failed`](crate::tasks::ItemOutcome::Failed) and the batch
//! continues.

use std::path::PathBuf;

use thiserror::Error;

/// Aborts raised by the run itself rather than by its inputs.
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// The operator declined a destructive confirmation.
    #[error("Aborted: {action} was declined")]
    Declined {
        /// Short description of the refused action.
        action: String,
    },
}

/// Errors that arise from configuration and list file loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A list file that must exist is absent.
    #[error("Required list file not found: {}", .0.display())]
    MissingListFile(PathBuf),

    /// The `bootstrap.toml` file contains invalid TOML or unknown keys.
    #[error("Invalid config file {}: {message}", .path.display())]
    InvalidSyntax {
        /// Path to the malformed file.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },

    /// An I/O error occurred while reading a config or list file.
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors raised when the environment is not fit for the run.
#[derive(Error, Debug)]
pub enum PreconditionError {
    /// A required external program is not on `PATH`.
    #[error("Required tool '{0}' not found on PATH")]
    MissingTool(String),

    /// The dotfiles root does not exist and no repository URL was given.
    #[error("Dotfiles root {} does not exist and no repository URL is configured", .0.display())]
    MissingRoot(PathBuf),

    /// The generated backup root already exists on disk.
    #[error("Backup directory {} already exists", .0.display())]
    BackupRootExists(PathBuf),

    /// The home directory could not be determined.
    #[error("Cannot determine home directory: {0}")]
    NoHome(String),
}
