//! Dotfiles bootstrap engine.
//!
//! Brings a machine from a fresh install to a deployed dotfiles tree: clones
//! the dotfiles repository, installs packages through pacman with an AUR
//! helper fallback, removes unwanted packages, moves conflicting files into a
//! timestamped backup directory, and links every package into home with GNU
//! Stow.  A separate read-only audit reports which links under home point
//! back into the tree.
//!
//! The public API is organised into layers:
//!
//! - **[`config`]**: list files and the optional `bootstrap.toml`
//! - **[`resources`]**: idempotent `check + apply` primitives (packages, backups, stow)
//! - **[`tasks`]**: the ordered install phases wired to resources
//! - **[`commands`]**: top-level subcommand orchestration (`install`, `audit`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod audit;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod prompt;
pub mod resources;
pub mod tasks;
