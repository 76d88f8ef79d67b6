//! Run configuration: dotfiles layout, list files, and `bootstrap.toml`.
pub mod list;
pub mod settings;

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Resolved configuration for one run.
///
/// Built once at startup and passed explicitly to every phase.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the dotfiles tree (each top-level directory is a stow package).
    pub root: PathBuf,
    /// Target root that packages are deployed into.
    pub home: PathBuf,
    /// Path of the mandatory install list.
    pub install_list: PathBuf,
    /// Path of the optional uninstall list.
    pub uninstall_list: PathBuf,
    /// Path of the optional deployment list.
    pub deploy_list: PathBuf,
    /// AUR helper candidates, tried in order.
    pub aur_helpers: Vec<String>,
    /// Prefix of the timestamped backup directory.
    pub backup_prefix: String,
}

impl Config {
    /// Load `bootstrap.toml` from `root` and resolve list paths against it.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file exists but is unreadable or
    /// malformed.
    pub fn load(root: &Path, home: &Path) -> Result<Self, ConfigError> {
        let settings = settings::load(&root.join(settings::SETTINGS_FILE))?;
        Ok(Self {
            root: root.to_path_buf(),
            home: home.to_path_buf(),
            install_list: root.join(settings.install_list),
            uninstall_list: root.join(settings.uninstall_list),
            deploy_list: root.join(settings.deploy_list),
            aur_helpers: settings.aur_helpers,
            backup_prefix: settings.backup_prefix,
        })
    }

    /// Names of the stow packages selected for deployment.
    ///
    /// Reads the deployment list when it exists; otherwise every package
    /// directory in the dotfiles root is selected.
    ///
    /// # Errors
    ///
    /// Returns an error if the list or the dotfiles root cannot be read.
    pub fn deploy_packages(&self) -> Result<Vec<String>> {
        if let Some(names) = list::load_optional(&self.deploy_list)? {
            return Ok(names);
        }
        package_dirs(&self.root)
    }
}

/// List the stow package directories directly under `root`, sorted by name.
///
/// Hidden entries (`.git`, `.github`, ...) and plain files are not packages.
///
/// # Errors
///
/// Returns an error if `root` cannot be read.
pub fn package_dirs(root: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(root)
        .with_context(|| format!("reading dotfiles root {}", root.display()))?
    {
        let entry = entry.with_context(|| format!("reading entry in {}", root.display()))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') || !entry.path().is_dir() {
            continue;
        }
        names.push(name);
    }
    names.sort();
    Ok(names)
}
