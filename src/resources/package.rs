//! Package installation resource.
//!
//! Installs prefer the official repositories through `pacman` and fall back
//! to the detected AUR helper.  Removals go through whichever source owns the
//! package.
use anyhow::{Result, bail};

use super::ResourceChange;
use crate::exec::Executor;

/// The package manager a package is installed or removed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageManager {
    /// Official Arch Linux packages (pacman, run through sudo).
    Pacman,
    /// AUR packages, via the named helper (`paru`, `yay`, ...).
    Aur(String),
}

impl std::fmt::Display for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pacman => write!(f, "pacman"),
            Self::Aur(helper) => write!(f, "{helper}"),
        }
    }
}

impl PackageManager {
    /// Install `name` non-interactively, skipping it if already up to date.
    ///
    /// # Errors
    ///
    /// Returns an error if the package manager cannot be spawned or exits
    /// non-zero.
    pub fn install(&self, name: &str, executor: &dyn Executor) -> Result<()> {
        match self {
            Self::Pacman => {
                executor.run("sudo", &["pacman", "-S", "--needed", "--noconfirm", name])?;
            }
            Self::Aur(helper) => {
                executor.run(helper, &["-S", "--needed", "--noconfirm", name])?;
            }
        }
        Ok(())
    }

    /// Remove `name` together with its unneeded dependencies.
    ///
    /// # Errors
    ///
    /// Returns an error if the package manager cannot be spawned or exits
    /// non-zero.
    pub fn remove(&self, name: &str, executor: &dyn Executor) -> Result<()> {
        match self {
            Self::Pacman => {
                executor.run("sudo", &["pacman", "-Rns", "--noconfirm", name])?;
            }
            Self::Aur(helper) => {
                executor.run(helper, &["-Rns", "--noconfirm", name])?;
            }
        }
        Ok(())
    }
}

/// Pick the first AUR helper in `candidates` that is on `PATH`.
///
/// The result is carried in the run context rather than re-detected per
/// package.
#[must_use]
pub fn detect_aur_helper(candidates: &[String], executor: &dyn Executor) -> Option<String> {
    candidates
        .iter()
        .find(|candidate| executor.which(candidate))
        .cloned()
}

/// Read-only queries against the official repositories and the AUR helper.
///
/// Every query runs unchecked: a non-zero exit, or a command that cannot be
/// spawned at all, answers `false`.
#[derive(Debug, Clone, Copy)]
pub struct PackageProber<'a> {
    executor: &'a dyn Executor,
    aur_helper: Option<&'a str>,
}

impl<'a> PackageProber<'a> {
    /// Create a prober. `aur_helper` is the helper detected at startup, if any.
    #[must_use]
    pub const fn new(executor: &'a dyn Executor, aur_helper: Option<&'a str>) -> Self {
        Self {
            executor,
            aur_helper,
        }
    }

    /// Whether the official repositories carry `name` (`pacman -Si`).
    #[must_use]
    pub fn is_available_officially(&self, name: &str) -> bool {
        self.query("pacman", &["-Si", name])
    }

    /// Whether `name` is installed from the official repositories (`pacman -Qn`).
    #[must_use]
    pub fn is_installed_officially(&self, name: &str) -> bool {
        self.query("pacman", &["-Qn", name])
    }

    /// Whether `name` is installed as a foreign package through the AUR
    /// helper (`<helper> -Qm`). Always `false` without a helper.
    #[must_use]
    pub fn is_installed_secondary(&self, name: &str) -> bool {
        self.aur_helper
            .is_some_and(|helper| self.query(helper, &["-Qm", name]))
    }

    /// Decide how `name` should be installed.
    #[must_use]
    pub fn install_plan(&self, name: &str) -> InstallPlan {
        if self.is_installed_officially(name) || self.is_installed_secondary(name) {
            InstallPlan::AlreadyInstalled
        } else if self.is_available_officially(name) {
            InstallPlan::Install(PackageManager::Pacman)
        } else if let Some(helper) = self.aur_helper {
            InstallPlan::Install(PackageManager::Aur(helper.to_string()))
        } else {
            InstallPlan::Unresolvable
        }
    }

    /// Decide how `name` should be removed.
    #[must_use]
    pub fn uninstall_plan(&self, name: &str) -> UninstallPlan {
        if self.is_installed_officially(name) {
            UninstallPlan::Remove(PackageManager::Pacman)
        } else if let Some(helper) = self
            .aur_helper
            .filter(|_| self.is_installed_secondary(name))
        {
            UninstallPlan::Remove(PackageManager::Aur(helper.to_string()))
        } else {
            UninstallPlan::Absent
        }
    }

    fn query(&self, program: &str, args: &[&str]) -> bool {
        self.executor
            .run_unchecked(program, args)
            .is_ok_and(|result| result.success && !result.stdout.trim().is_empty())
    }
}

/// Outcome of probing a package before installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallPlan {
    /// Installed from either source; nothing to do.
    AlreadyInstalled,
    /// Install with the given manager.
    Install(PackageManager),
    /// Not in the official repositories and no AUR helper is available.
    Unresolvable,
}

/// Outcome of probing a package before removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UninstallPlan {
    /// Remove with the manager that owns the package.
    Remove(PackageManager),
    /// Not installed from either source.
    Absent,
}

/// A system package that can be queried, installed, and removed.
#[derive(Debug)]
pub struct PackageResource<'a> {
    /// Package name.
    pub name: String,
    prober: PackageProber<'a>,
    executor: &'a dyn Executor,
}

impl<'a> PackageResource<'a> {
    /// Create a new package resource.
    #[must_use]
    pub const fn new(name: String, executor: &'a dyn Executor, aur_helper: Option<&'a str>) -> Self {
        Self {
            name,
            prober: PackageProber::new(executor, aur_helper),
            executor,
        }
    }

    /// Probe how this package would be installed.
    #[must_use]
    pub fn install_plan(&self) -> InstallPlan {
        self.prober.install_plan(&self.name)
    }

    /// Probe how this package would be removed.
    #[must_use]
    pub fn uninstall_plan(&self) -> UninstallPlan {
        self.prober.uninstall_plan(&self.name)
    }

    /// Carry out a previously computed install plan.
    ///
    /// # Errors
    ///
    /// Returns an error if the plan is [`InstallPlan::Unresolvable`] or the
    /// package manager fails.
    pub fn apply_install(&self, plan: &InstallPlan) -> Result<ResourceChange> {
        match plan {
            InstallPlan::AlreadyInstalled => Ok(ResourceChange::AlreadyCorrect),
            InstallPlan::Install(manager) => {
                manager.install(&self.name, self.executor)?;
                Ok(ResourceChange::Applied)
            }
            InstallPlan::Unresolvable => bail!(
                "'{}' is not in the official repositories and no AUR helper is available",
                self.name
            ),
        }
    }

    /// Carry out a previously computed uninstall plan.
    ///
    /// # Errors
    ///
    /// Returns an error if the package manager fails.
    pub fn apply_uninstall(&self, plan: &UninstallPlan) -> Result<ResourceChange> {
        match plan {
            UninstallPlan::Remove(manager) => {
                manager.remove(&self.name, self.executor)?;
                Ok(ResourceChange::Applied)
            }
            UninstallPlan::Absent => Ok(ResourceChange::Skipped {
                reason: "not installed".to_string(),
            }),
        }
    }
}
