//! `dotfiles` command-line entry point.
use std::io::Write as _;

use anyhow::{Result, bail};
use clap::Parser;

use dotfiles::cli::{Cli, Command};
use dotfiles::commands::{self, AssumeYes, Confirm, PromptConfirm, status::StatusOptions};
use dotfiles::config::Config;
use dotfiles::logging::{self, Logger};
use dotfiles::repository::Repository;

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    if matches!(args.command, Command::Version) {
        let version = option_env!("DOTFILES_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
        writeln!(std::io::stdout(), "dotfiles {version}")?;
        return Ok(());
    }

    let name = args.command.name();
    logging::init_subscriber(args.verbose, name);
    let log = Logger::new(name);
    let dry_run = args.global.dry_run;

    let config = Config::load(&args.global.overrides(), &log)?;
    let repo = Repository::new(&config)?;
    let confirm: &dyn Confirm = if args.global.yes {
        &AssumeYes
    } else {
        &PromptConfirm
    };

    if let Some((operation, files)) = args.command.operation() {
        commands::run(&repo, operation, files, confirm, &log, dry_run)?;
    } else {
        match &args.command {
            Command::Status(opts) => {
                let opts = StatusOptions {
                    all: opts.all,
                    color: opts.color,
                };
                commands::status::run(&repo, opts, &mut std::io::stdout().lock())?;
            }
            Command::Sync(opts) => commands::sync::run(&repo, opts.force, &log, dry_run)?,
            Command::Prune => commands::prune::run(&repo, &log, dry_run)?,
            Command::Move(opts) => {
                commands::relocate::run(&repo, &opts.destination, &log, dry_run)?;
            }
            Command::Add(_)
            | Command::Remove(_)
            | Command::Link(_)
            | Command::Unlink(_)
            | Command::Version => {}
        }
    }

    log.print_summary();
    let failed = log.failure_count();
    if failed > 0 {
        bail!("{failed} of {} files failed", log.outcomes().len());
    }
    Ok(())
}
