//! Command: report the links under home that point into the dotfiles tree.
use anyhow::Result;

use super::Paths;
use crate::audit;
use crate::cli::GlobalOpts;
use crate::logging::Logger;

/// Run the audit and log one section per package.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined or the
/// dotfiles root cannot be read.
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let paths = Paths::resolve(global)?;
    log.debug(&format!(
        "scanning {} for links into {}",
        paths.home.display(),
        paths.root.display()
    ));

    let report = audit::audit(&paths.home, &paths.root)?;
    for package in report.packages() {
        log.stage(package);
        let lines = report.lines(package);
        if lines.is_empty() {
            log.info("(no links)");
        }
        for line in lines {
            log.info(&line);
        }
    }
    log.info(&format!(
        "{} link(s) into {}",
        report.total(),
        paths.root.display()
    ));
    Ok(())
}
