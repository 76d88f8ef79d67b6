//! Read-only audit of the links under home that point into the dotfiles tree.
//!
//! Every symlink below home is resolved to its final real path.  Links that
//! land inside the dotfiles root are grouped by the package (top-level
//! directory) that owns their target; everything else, including dangling
//! links, is ignored.
use anyhow::{Context as _, Result};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use crate::config::package_dirs;

/// One symlink under home that resolves into the dotfiles tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLink {
    /// Location of the link, relative to home.
    pub link: PathBuf,
    /// Resolved target, relative to the dotfiles root.
    pub target: PathBuf,
    /// Whether the link points at a directory (a stow "folded" link).
    pub folded: bool,
}

/// Links grouped by owning package.
#[derive(Debug, Default)]
pub struct AuditReport {
    packages: BTreeMap<String, Vec<AuditLink>>,
}

impl AuditReport {
    /// Package names in report order (sorted).
    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    /// Links owned by `package`; empty for packages without links.
    #[must_use]
    pub fn links(&self, package: &str) -> &[AuditLink] {
        self.packages.get(package).map_or(&[], Vec::as_slice)
    }

    /// Total number of matched links.
    #[must_use]
    pub fn total(&self) -> usize {
        self.packages.values().map(Vec::len).sum()
    }

    /// Formatted lines for one package section.
    #[must_use]
    pub fn lines(&self, package: &str) -> Vec<String> {
        self.links(package)
            .iter()
            .map(|l| {
                let kind = if l.folded { "folded" } else { "file" };
                format!(
                    "{kind:<6}  ~/{} -> {}",
                    l.link.display(),
                    l.target.display()
                )
            })
            .collect()
    }

    /// Render the whole report as plain text, one heading per package.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for package in self.packages() {
            out.push_str(package);
            out.push('\n');
            let lines = self.lines(package);
            if lines.is_empty() {
                out.push_str("  (no links)\n");
            }
            for line in lines {
                out.push_str("  ");
                out.push_str(&line);
                out.push('\n');
            }
        }
        out
    }
}

/// Scan `home` for symlinks resolving into `root` and group them by package.
///
/// Every package directory of `root` gets a section, even when empty.
/// Directories that cannot be read are skipped, and the dotfiles root itself
/// is not descended into.
///
/// # Errors
///
/// Returns an error if `root` cannot be resolved or listed.
pub fn audit(home: &Path, root: &Path) -> Result<AuditReport> {
    let given_root = root;
    let root = dunce::canonicalize(given_root)
        .with_context(|| format!("resolving dotfiles root {}", given_root.display()))?;

    let mut report = AuditReport::default();
    for package in package_dirs(&root)? {
        report.packages.insert(package, Vec::new());
    }

    let walker = walkdir::WalkDir::new(home)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.path() != given_root && e.path() != root);

    for entry in walker.filter_map(Result::ok) {
        if !entry.path_is_symlink() {
            continue;
        }
        let Ok(resolved) = dunce::canonicalize(entry.path()) else {
            continue;
        };
        let Ok(inside) = resolved.strip_prefix(&root) else {
            continue;
        };
        let Some(Component::Normal(package)) = inside.components().next() else {
            continue;
        };
        let Some(links) = report.packages.get_mut(&*package.to_string_lossy()) else {
            continue;
        };
        links.push(AuditLink {
            link: entry
                .path()
                .strip_prefix(home)
                .unwrap_or_else(|_| entry.path())
                .to_path_buf(),
            target: inside.to_path_buf(),
            folded: resolved.is_dir(),
        });
    }

    for links in report.packages.values_mut() {
        links.sort_by(|a, b| a.link.cmp(&b.link));
    }
    Ok(report)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::os::unix::fs::symlink;

    struct Home {
        _dir: tempfile::TempDir,
        home: PathBuf,
        root: PathBuf,
    }

    fn home() -> Home {
        let dir = tempfile::tempdir().unwrap();
        let home = dir.path().join("home");
        let root = home.join("dotfiles");
        std::fs::create_dir_all(root.join("zsh")).unwrap();
        std::fs::write(root.join("zsh/.zshrc"), "").unwrap();
        std::fs::create_dir_all(root.join("nvim/.config/nvim")).unwrap();
        std::fs::create_dir_all(root.join("git")).unwrap();
        std::fs::create_dir_all(root.join(".git")).unwrap();
        Home {
            _dir: dir,
            home,
            root,
        }
    }

    #[test]
    fn groups_links_by_package() {
        let h = home();
        symlink(h.root.join("zsh/.zshrc"), h.home.join(".zshrc")).unwrap();
        std::fs::create_dir_all(h.home.join(".config")).unwrap();
        symlink(h.root.join("nvim/.config/nvim"), h.home.join(".config/nvim")).unwrap();

        let report = audit(&h.home, &h.root).unwrap();

        assert_eq!(report.packages().collect::<Vec<_>>(), vec!["git", "nvim", "zsh"]);
        assert_eq!(
            report.links("zsh"),
            &[AuditLink {
                link: PathBuf::from(".zshrc"),
                target: PathBuf::from("zsh/.zshrc"),
                folded: false,
            }]
        );
        assert!(report.links("nvim")[0].folded);
        assert!(report.links("git").is_empty());
        assert_eq!(report.total(), 2);
    }

    #[test]
    fn links_outside_the_root_are_excluded() {
        let h = home();
        let outside = h.home.join("elsewhere");
        std::fs::write(&outside, "").unwrap();
        symlink(&outside, h.home.join(".profile")).unwrap();

        let report = audit(&h.home, &h.root).unwrap();
        assert_eq!(report.total(), 0);
    }

    #[test]
    fn dangling_links_are_excluded() {
        let h = home();
        symlink(h.root.join("zsh/.gone"), h.home.join(".gone")).unwrap();

        let report = audit(&h.home, &h.root).unwrap();
        assert_eq!(report.total(), 0);
    }

    #[test]
    fn links_inside_the_dotfiles_root_are_not_scanned() {
        let h = home();
        symlink(h.root.join("zsh/.zshrc"), h.root.join("git/alias")).unwrap();

        let report = audit(&h.home, &h.root).unwrap();
        assert_eq!(report.total(), 0);
    }

    #[test]
    fn links_through_hidden_top_level_entries_are_ignored() {
        let h = home();
        std::fs::write(h.root.join(".git/config"), "").unwrap();
        symlink(h.root.join(".git/config"), h.home.join(".gitconfig")).unwrap();

        let report = audit(&h.home, &h.root).unwrap();
        assert_eq!(report.total(), 0);
    }

    #[test]
    fn render_report() {
        let h = home();
        symlink(h.root.join("zsh/.zshrc"), h.home.join(".zshrc")).unwrap();
        std::fs::create_dir_all(h.home.join(".config")).unwrap();
        symlink(h.root.join("nvim/.config/nvim"), h.home.join(".config/nvim")).unwrap();

        let report = audit(&h.home, &h.root).unwrap();
        insta::assert_snapshot!(report.render().trim_end(), @r"
        git
          (no links)
        nvim
          folded  ~/.config/nvim -> nvim/.config/nvim
        zsh
          file    ~/.zshrc -> zsh/.zshrc
        ");
    }
}
