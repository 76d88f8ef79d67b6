//! Command-line interface definition.
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::prompt::ConfirmMode;

/// Top-level CLI entry point for the dotfiles bootstrap.
#[derive(Parser, Debug)]
#[command(
    name = "bootstrap",
    about = "Install packages, back up conflicts, and stow dotfiles into place",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Dotfiles root directory [default: ~/dotfiles]
    #[arg(long, global = true, env = "DOTFILES_ROOT")]
    pub root: Option<PathBuf>,

    /// Target directory packages are deployed into [default: $HOME]
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    /// Repository to clone when the dotfiles root does not exist
    #[arg(long, global = true, env = "DOTFILES_REPO")]
    pub repo: Option<String>,

    /// How to answer confirmation prompts
    #[arg(long, global = true, value_enum, default_value_t = ConfirmMode::Auto)]
    pub confirm: ConfirmMode,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Clone, install packages, back up conflicts, and deploy
    Install(InstallOpts),
    /// Report links under home that point into the dotfiles tree
    Audit,
    /// Print shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
    /// Print version information
    Version,
}

impl Command {
    /// Short name used for the log file.
    #[must_use]
    pub const fn log_name(&self) -> &'static str {
        match self {
            Self::Install(_) => "install",
            Self::Audit => "audit",
            Self::Completions { .. } => "completions",
            Self::Version => "version",
        }
    }
}

/// Options for the `install` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct InstallOpts {
    /// Skip specific phases (substring match on the phase name)
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Run only specific phases (substring match on the phase name)
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,

    /// Exit successfully even when individual packages fail
    #[arg(long)]
    pub allow_failures: bool,
}
