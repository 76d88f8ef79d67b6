//! Dotfiles repository clone resource.
use anyhow::Result;
use std::path::{Path, PathBuf};

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// The dotfiles repository, cloned into the dotfiles root when absent.
#[derive(Debug)]
pub struct RepositoryClone<'a> {
    /// Clone source.
    pub url: String,
    /// Destination directory (the dotfiles root).
    pub dest: PathBuf,
    executor: &'a dyn Executor,
}

impl<'a> RepositoryClone<'a> {
    /// Create a new clone resource.
    #[must_use]
    pub fn new(url: &str, dest: &Path, executor: &'a dyn Executor) -> Self {
        Self {
            url: url.to_string(),
            dest: dest.to_path_buf(),
            executor,
        }
    }
}

impl Applicable for RepositoryClone<'_> {
    fn description(&self) -> String {
        format!("{} -> {}", self.url, self.dest.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        if self.dest.exists() {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        let dest = self.dest.to_string_lossy();
        self.executor.run("git", &["clone", &self.url, &dest])?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for RepositoryClone<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        if self.dest.exists() {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Missing)
        }
    }
}
