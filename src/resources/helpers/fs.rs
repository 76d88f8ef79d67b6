//! File-system resource helpers.
use anyhow::{Context as _, Result};
use std::path::Path;

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}

/// Move the entry at `src` to `dst`, which must not exist yet.
///
/// Uses a rename when both paths share a filesystem; otherwise copies the
/// tree with [`copy_tree`] and deletes the source.  Symlinks are moved as
/// links, never followed.
///
/// # Errors
///
/// Returns an error if the entry cannot be renamed, copied, or removed.
pub fn move_path(src: &Path, dst: &Path) -> Result<()> {
    ensure_parent_dir(dst)?;
    if std::fs::rename(src, dst).is_ok() {
        return Ok(());
    }

    copy_tree(src, dst)
        .with_context(|| format!("cross-fs copy {} to {}", src.display(), dst.display()))?;
    let meta = std::fs::symlink_metadata(src)
        .with_context(|| format!("reading metadata: {}", src.display()))?;
    if meta.is_dir() {
        std::fs::remove_dir_all(src)
    } else {
        std::fs::remove_file(src)
    }
    .with_context(|| format!("removing moved source: {}", src.display()))
}

/// Recursively copy `src` to `dst`, recreating symlinks as links.
///
/// # Errors
///
/// Returns an error if a directory cannot be created, a source entry cannot
/// be read, or a file or link cannot be copied.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    let meta = std::fs::symlink_metadata(src)
        .with_context(|| format!("reading metadata: {}", src.display()))?;

    if meta.file_type().is_symlink() {
        let target = std::fs::read_link(src)
            .with_context(|| format!("reading link {}", src.display()))?;
        std::os::unix::fs::symlink(&target, dst)
            .with_context(|| format!("recreating link {}", dst.display()))?;
    } else if meta.is_dir() {
        std::fs::create_dir_all(dst)
            .with_context(|| format!("creating directory {}", dst.display()))?;
        for entry in std::fs::read_dir(src)
            .with_context(|| format!("reading directory {}", src.display()))?
        {
            let entry = entry.with_context(|| format!("reading entry in {}", src.display()))?;
            copy_tree(&entry.path(), &dst.join(entry.file_name()))?;
        }
    } else {
        std::fs::copy(src, dst)
            .with_context(|| format!("copying {} to {}", src.display(), dst.display()))?;
    }
    Ok(())
}
