//! Newline-delimited list files (packages to install, remove, or deploy).
//!
//! Format:
//! ```text
//! # comment
//! neovim
//!
//! firefox
//! ```
//!
//! Blank lines and lines whose first non-whitespace character is `#` are
//! ignored.  Remaining lines are trimmed and kept in file order; duplicates
//! are not removed.
use std::path::Path;

use crate::error::ConfigError;

/// Parse list content from a string.
///
/// # Examples
///
/// ```
/// use dotfiles_bootstrap::config::list::parse_list;
///
/// let names = parse_list("neovim\n# a comment\n\nfirefox\n");
/// assert_eq!(names, ["neovim", "firefox"]);
/// ```
#[must_use]
pub fn parse_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

/// Load a list file that must exist.
///
/// # Errors
///
/// Returns [`ConfigError::MissingListFile`] if `path` does not exist, or
/// [`ConfigError::Io`] if it cannot be read.
pub fn load_required(path: &Path) -> Result<Vec<String>, ConfigError> {
    load_optional(path)?.ok_or_else(|| ConfigError::MissingListFile(path.to_path_buf()))
}

/// Load a list file that may be absent.
///
/// Returns `Ok(None)` when the file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file exists but cannot be read.
pub fn load_optional(path: &Path) -> Result<Option<Vec<String>>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(parse_list(&content))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
