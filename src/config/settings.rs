//! Optional `bootstrap.toml` settings stored at the dotfiles root.
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// File name of the settings file inside the dotfiles root.
pub const SETTINGS_FILE: &str = "bootstrap.toml";

/// Values read from `bootstrap.toml`, with defaults for every key.
///
/// Relative list paths are resolved against the dotfiles root by
/// [`Config::load`](super::Config::load).
///
/// ```toml
/// install_list = "packages.txt"
/// uninstall_list = "uninstall.txt"
/// deploy_list = "stow.txt"
/// aur_helpers = ["paru", "yay"]
/// backup_prefix = ".dotfiles-backup-"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Packages to install (mandatory list).
    pub install_list: PathBuf,
    /// Packages to remove (optional list).
    pub uninstall_list: PathBuf,
    /// Stow packages to deploy (optional list; all packages when absent).
    pub deploy_list: PathBuf,
    /// AUR helper candidates, tried in order.
    pub aur_helpers: Vec<String>,
    /// Prefix of the timestamped backup directory created under home.
    pub backup_prefix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            install_list: PathBuf::from("packages.txt"),
            uninstall_list: PathBuf::from("uninstall.txt"),
            deploy_list: PathBuf::from("stow.txt"),
            aur_helpers: vec!["paru".to_string(), "yay".to_string()],
            backup_prefix: ".dotfiles-backup-".to_string(),
        }
    }
}

/// Load settings from `path`, falling back to defaults when it is absent.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file exists but cannot be read, or
/// [`ConfigError::InvalidSyntax`] if it is not valid TOML or has unknown keys.
pub fn load(path: &Path) -> Result<Settings, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Settings::default()),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    toml::from_str(&content).map_err(|e| ConfigError::InvalidSyntax {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })
}
