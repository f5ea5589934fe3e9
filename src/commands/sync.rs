//! `sync`: bring every managed dotfile into the linked state.
use anyhow::Result;

use crate::dotfile::State;
use crate::fs;
use crate::logging::{Log, OutcomeStatus};
use crate::repository::Repository;

/// Link every missing dotfile and turn identical copies into links.
///
/// Conflicting files are only replaced when `force` is set; otherwise they
/// are skipped with a warning.
///
/// # Errors
///
/// Returns an error if the repository cannot be listed; per-file failures
/// are logged and recorded.
pub fn run(repo: &Repository, force: bool, log: &dyn Log, dry_run: bool) -> Result<()> {
    let done = if dry_run {
        OutcomeStatus::DryRun
    } else {
        OutcomeStatus::Ok
    };

    log.stage("Syncing dotfiles");
    for dotfile in repo.contents()? {
        let short = repo.short_name(dotfile.name());
        let state = dotfile.state();
        let result = match state {
            State::Missing => dotfile.link(log, dry_run),
            State::External if !fs::lexists(dotfile.name()) => dotfile.link(log, dry_run),
            State::Copy => dotfile.replace(log, dry_run),
            State::Conflict if force => dotfile.replace(log, dry_run),
            State::Conflict => {
                log.warn(&format!("skipping '{short}': conflict (use --force to replace)"));
                log.record(&short, OutcomeStatus::Skipped, Some("conflict"));
                continue;
            }
            State::Ok | State::External | State::Error => continue,
        };
        match result {
            Ok(()) => {
                log.info(&format!("linked '{short}'"));
                log.record(&short, done, Some(state.as_str()));
            }
            Err(e) => {
                log.error(&e.to_string());
                log.record(&short, OutcomeStatus::Failed, Some(e.kind().message()));
            }
        }
    }
    Ok(())
}
