//! Stow package deployment resource and target resolution.
use anyhow::{Context as _, Result, bail};
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// Compute the top-level home paths a stow package will occupy.
///
/// Every entry below `<root>/<package>` contributes `<home>/<first segment>`
/// of its package-relative path, so a package holding `.config/nvim/init.lua`
/// claims `<home>/.config` and nothing deeper.  Returns `None` when the
/// package directory does not exist.
///
/// # Errors
///
/// Returns an error if the package tree cannot be walked.
///
/// # Examples
///
/// ```
/// use dotfiles_bootstrap::resources::stow::resolve_targets;
/// use std::path::Path;
///
/// let root = tempfile::tempdir().unwrap();
/// std::fs::create_dir_all(root.path().join("nvim/.config/nvim")).unwrap();
/// std::fs::write(root.path().join("nvim/.config/nvim/init.lua"), "").unwrap();
///
/// let targets = resolve_targets(root.path(), "nvim", Path::new("/home/u"))
///     .unwrap()
///     .unwrap();
/// let expected = Path::new("/home/u/.config").to_path_buf();
/// assert_eq!(targets.into_iter().collect::<Vec<_>>(), vec![expected]);
/// ```
pub fn resolve_targets(
    root: &Path,
    package: &str,
    home: &Path,
) -> Result<Option<BTreeSet<PathBuf>>> {
    let package_dir = root.join(package);
    if !package_dir.is_dir() {
        return Ok(None);
    }

    let mut targets = BTreeSet::new();
    for entry in walkdir::WalkDir::new(&package_dir)
        .min_depth(1)
        .follow_links(false)
    {
        let entry =
            entry.with_context(|| format!("walking package {}", package_dir.display()))?;
        let relative = entry
            .path()
            .strip_prefix(&package_dir)
            .with_context(|| format!("{} escapes its package", entry.path().display()))?;
        if let Some(Component::Normal(segment)) = relative.components().next() {
            targets.insert(home.join(segment));
        }
    }
    Ok(Some(targets))
}

/// A stow package to be linked into the target directory.
#[derive(Debug)]
pub struct StowPackage<'a> {
    /// Package name (a top-level directory of the dotfiles root).
    pub name: String,
    root: PathBuf,
    home: PathBuf,
    executor: &'a dyn Executor,
}

impl<'a> StowPackage<'a> {
    /// Create a new stow package resource.
    #[must_use]
    pub fn new(name: &str, root: &Path, home: &Path, executor: &'a dyn Executor) -> Self {
        Self {
            name: name.to_string(),
            root: root.to_path_buf(),
            home: home.to_path_buf(),
            executor,
        }
    }

    /// Path of the package directory inside the dotfiles root.
    #[must_use]
    pub fn source_dir(&self) -> PathBuf {
        self.root.join(&self.name)
    }
}

impl Applicable for StowPackage<'_> {
    fn description(&self) -> String {
        format!("{} -> {}", self.name, self.home.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        let root = self.root.to_string_lossy();
        let home = self.home.to_string_lossy();
        let result = self.executor.run_unchecked(
            "stow",
            &["--dir", &root, "--target", &home, "--restow", &self.name],
        )?;
        if !result.success {
            bail!("stow {} failed:\n{}", self.name, result.diagnostics());
        }
        Ok(ResourceChange::Applied)
    }
}

impl Resource for StowPackage<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        let dir = self.source_dir();
        if dir.is_dir() {
            // stow itself decides what is already linked; --restow is idempotent.
            Ok(ResourceState::Missing)
        } else {
            Ok(ResourceState::Invalid {
                reason: format!("package directory does not exist: {}", dir.display()),
            })
        }
    }
}
