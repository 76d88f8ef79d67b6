//! `bootstrap` binary entry point.
use anyhow::Result;
use clap::{CommandFactory, Parser};
use std::sync::Arc;

use dotfiles_bootstrap::cli::{Cli, Command};
use dotfiles_bootstrap::{commands, logging};

#[allow(clippy::print_stdout)]
fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    match args.command {
        Command::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "bootstrap", &mut std::io::stdout());
            return Ok(());
        }
        Command::Version => {
            let version = option_env!("BOOTSTRAP_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
            println!("bootstrap {version}");
            return Ok(());
        }
        Command::Install(_) | Command::Audit => {}
    }

    let command = args.command.log_name();
    logging::init_subscriber(args.verbose, command);
    let log = Arc::new(logging::Logger::new(command));

    match &args.command {
        Command::Install(opts) => commands::install::run(&args.global, opts, &log),
        Command::Audit => commands::audit::run(&args.global, &log),
        Command::Completions { .. } | Command::Version => Ok(()),
    }
}
