//! Backup of pre-existing entries that would conflict with deployment.
use anyhow::{Context as _, Result};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::error::PreconditionError;

/// Path of the run-scoped backup root: `<home>/<prefix><YYYYmmdd-HHMMSS>`.
///
/// # Examples
///
/// ```
/// use chrono::{Local, TimeZone};
/// use dotfiles_bootstrap::resources::backup::backup_root_path;
/// use std::path::Path;
///
/// let at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
/// assert_eq!(
///     backup_root_path(Path::new("/home/u"), ".dotfiles-backup-", &at),
///     Path::new("/home/u/.dotfiles-backup-20240309-070501"),
/// );
/// ```
#[must_use]
pub fn backup_root_path(home: &Path, prefix: &str, at: &DateTime<Local>) -> PathBuf {
    home.join(format!("{prefix}{}", at.format("%Y%m%d-%H%M%S")))
}

/// Create the backup root. It must not exist yet; a backup root is never
/// reused across runs.
///
/// # Errors
///
/// Returns [`PreconditionError::BackupRootExists`] if something is already
/// at `path`, or an I/O error if the directory cannot be created.
pub fn create_backup_root(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    match std::fs::create_dir(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            Err(PreconditionError::BackupRootExists(path.to_path_buf()).into())
        }
        Err(e) => Err(e).with_context(|| format!("creating backup root {}", path.display())),
    }
}

/// One deployment target that may need moving aside before stow runs.
#[derive(Debug, Clone)]
pub struct BackupEntry {
    /// Path under home that a stow package will occupy.
    pub target: PathBuf,
    /// `target` relative to home; mirrored below the backup root.
    pub relative: PathBuf,
    backup_root: PathBuf,
    dotfiles_root: PathBuf,
}

impl BackupEntry {
    /// Create a backup entry for `target`.
    ///
    /// `dotfiles_root` is used to recognise targets that are already links
    /// into the dotfiles tree.
    #[must_use]
    pub fn new(target: &Path, home: &Path, backup_root: &Path, dotfiles_root: &Path) -> Self {
        let relative = target.strip_prefix(home).map_or_else(
            |_| target.file_name().map(PathBuf::from).unwrap_or_default(),
            Path::to_path_buf,
        );
        Self {
            target: target.to_path_buf(),
            relative,
            backup_root: backup_root.to_path_buf(),
            dotfiles_root: dotfiles_root.to_path_buf(),
        }
    }

    /// Where the entry ends up once backed up.
    #[must_use]
    pub fn destination(&self) -> PathBuf {
        self.backup_root.join(&self.relative)
    }

    fn links_into_dotfiles(&self) -> bool {
        let (Ok(resolved), Ok(root)) = (
            dunce::canonicalize(&self.target),
            dunce::canonicalize(&self.dotfiles_root),
        ) else {
            return false;
        };
        resolved.starts_with(root)
    }

    fn holds_dotfiles_root(&self) -> bool {
        if self.dotfiles_root.starts_with(&self.target) {
            return true;
        }
        match (
            dunce::canonicalize(&self.target),
            dunce::canonicalize(&self.dotfiles_root),
        ) {
            (Ok(target), Ok(root)) => root.starts_with(target),
            _ => false,
        }
    }
}

impl Applicable for BackupEntry {
    fn description(&self) -> String {
        format!("{} -> {}", self.target.display(), self.destination().display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        super::helpers::fs::move_path(&self.target, &self.destination())
            .with_context(|| format!("backing up {}", self.target.display()))?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for BackupEntry {
    fn current_state(&self) -> Result<ResourceState> {
        let Ok(meta) = self.target.symlink_metadata() else {
            return Ok(ResourceState::Correct);
        };

        if meta.file_type().is_symlink() && self.links_into_dotfiles() {
            return Ok(ResourceState::Correct);
        }
        // Moving an ancestor of the root would carry the packages away.
        if self.holds_dotfiles_root() {
            return Ok(ResourceState::Invalid {
                reason: "contains the dotfiles root".to_string(),
            });
        }
        if meta.file_type().is_symlink() {
            return Ok(ResourceState::Incorrect {
                current: "foreign symlink".to_string(),
            });
        }

        let kind = if meta.is_dir() { "directory" } else { "file" };
        Ok(ResourceState::Incorrect {
            current: format!("existing {kind}"),
        })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct Layout {
        _dir: tempfile::TempDir,
        home: PathBuf,
        dotfiles: PathBuf,
        backup: PathBuf,
    }

    fn layout() -> Layout {
        let dir = tempfile::tempdir().unwrap();
        let home = dir.path().join("home");
        let dotfiles = home.join("dotfiles");
        std::fs::create_dir_all(dotfiles.join("shell")).unwrap();
        std::fs::write(dotfiles.join("shell/.bashrc"), "# managed").unwrap();
        let backup = home.join(".dotfiles-backup-test");
        Layout {
            _dir: dir,
            home,
            dotfiles,
            backup,
        }
    }

    fn entry(l: &Layout, name: &str) -> BackupEntry {
        BackupEntry::new(&l.home.join(name), &l.home, &l.backup, &l.dotfiles)
    }

    #[test]
    fn backup_root_path_uses_second_granularity() {
        let at = Local.with_ymd_and_hms(2025, 12, 31, 23, 59, 58).unwrap();
        let path = backup_root_path(Path::new("/h"), ".bak-", &at);
        assert_eq!(path, Path::new("/h/.bak-20251231-235958"));
    }

    #[test]
    fn create_backup_root_refuses_existing_path() {
        let l = layout();
        create_backup_root(&l.backup).unwrap();
        assert!(l.backup.is_dir());

        let err = create_backup_root(&l.backup).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PreconditionError>(),
            Some(PreconditionError::BackupRootExists(_))
        ));
    }

    #[test]
    fn absent_target_needs_nothing() {
        let l = layout();
        assert_eq!(
            entry(&l, ".zshrc").current_state().unwrap(),
            ResourceState::Correct
        );
    }

    #[test]
    fn existing_file_and_directory_need_backup() {
        let l = layout();
        std::fs::write(l.home.join(".bashrc"), "# mine").unwrap();
        std::fs::create_dir_all(l.home.join(".config/nvim")).unwrap();

        assert!(entry(&l, ".bashrc").needs_change().unwrap());
        assert_eq!(
            entry(&l, ".config").current_state().unwrap(),
            ResourceState::Incorrect {
                current: "existing directory".to_string()
            }
        );
    }

    #[test]
    fn link_into_dotfiles_is_left_alone() {
        let l = layout();
        std::os::unix::fs::symlink(
            l.dotfiles.join("shell/.bashrc"),
            l.home.join(".bashrc"),
        )
        .unwrap();
        assert_eq!(
            entry(&l, ".bashrc").current_state().unwrap(),
            ResourceState::Correct
        );
    }

    #[test]
    fn foreign_and_dangling_links_need_backup() {
        let l = layout();
        std::os::unix::fs::symlink("/etc/hostname", l.home.join(".profile")).unwrap();
        std::os::unix::fs::symlink(l.home.join("gone"), l.home.join(".inputrc")).unwrap();

        assert!(entry(&l, ".profile").needs_change().unwrap());
        assert!(entry(&l, ".inputrc").needs_change().unwrap());
    }

    #[test]
    fn ancestor_of_dotfiles_root_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let home = dir.path().join("home");
        let dotfiles = home.join(".config/dotfiles");
        std::fs::create_dir_all(dotfiles.join("fish/.config/fish")).unwrap();
        let e = BackupEntry::new(
            &home.join(".config"),
            &home,
            &home.join(".dotfiles-backup-test"),
            &dotfiles,
        );

        assert_eq!(
            e.current_state().unwrap(),
            ResourceState::Invalid {
                reason: "contains the dotfiles root".to_string()
            }
        );
        assert!(!e.needs_change().unwrap());
    }

    #[test]
    fn link_to_an_ancestor_of_dotfiles_root_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let home = dir.path().join("home");
        let real = dir.path().join("sync");
        std::fs::create_dir_all(real.join("dotfiles")).unwrap();
        std::fs::create_dir_all(&home).unwrap();
        std::os::unix::fs::symlink(&real, home.join(".sync")).unwrap();
        let e = BackupEntry::new(
            &home.join(".sync"),
            &home,
            &home.join(".dotfiles-backup-test"),
            &real.join("dotfiles"),
        );

        assert!(matches!(
            e.current_state().unwrap(),
            ResourceState::Invalid { .. }
        ));
    }

    #[test]
    fn apply_moves_entry_to_mirrored_path() {
        let l = layout();
        std::fs::create_dir_all(l.home.join(".config/fish")).unwrap();
        std::fs::write(l.home.join(".config/fish/config.fish"), "set x 1").unwrap();
        create_backup_root(&l.backup).unwrap();

        let e = entry(&l, ".config");
        assert_eq!(e.apply().unwrap(), ResourceChange::Applied);

        assert!(l.home.join(".config").symlink_metadata().is_err());
        assert_eq!(
            std::fs::read_to_string(l.backup.join(".config/fish/config.fish")).unwrap(),
            "set x 1"
        );
    }

    #[test]
    fn relative_falls_back_to_file_name_outside_home() {
        let e = BackupEntry::new(
            Path::new("/elsewhere/.vimrc"),
            Path::new("/home/u"),
            Path::new("/home/u/.bak"),
            Path::new("/home/u/dotfiles"),
        );
        assert_eq!(e.destination(), Path::new("/home/u/.bak/.vimrc"));
    }
}
