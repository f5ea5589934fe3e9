//! Subcommand implementations.
//!
//! The four per-file operations share one driver, [`run`], which resolves
//! the requested paths (or every managed dotfile), applies an [`Operation`]
//! to each, and records the outcome. A failure on one file never stops the
//! batch.
pub mod prune;
pub mod relocate;
pub mod status;
pub mod sync;

use std::path::PathBuf;

use anyhow::Result;

use crate::dotfile::Dotfile;
use crate::error::DotfileError;
use crate::logging::{Log, OutcomeStatus};
use crate::repository::Repository;

/// The closed set of per-file operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Move into the repository and link back.
    Add,
    /// Move out of the repository, replacing the link.
    Remove,
    /// Create the link.
    Link,
    /// Delete the link.
    Unlink,
}

impl Operation {
    /// Present-tense verb, as typed on the command line.
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Link => "link",
            Self::Unlink => "unlink",
        }
    }

    /// Past-tense verb used when reporting success.
    #[must_use]
    pub const fn past_tense(self) -> &'static str {
        match self {
            Self::Add => "added",
            Self::Remove => "removed",
            Self::Link => "linked",
            Self::Unlink => "unlinked",
        }
    }

    /// Stage header shown before a batch.
    #[must_use]
    pub const fn heading(self) -> &'static str {
        match self {
            Self::Add => "Adding dotfiles",
            Self::Remove => "Removing dotfiles",
            Self::Link => "Linking dotfiles",
            Self::Unlink => "Unlinking dotfiles",
        }
    }

    /// Apply this operation to one dotfile.
    ///
    /// # Errors
    ///
    /// Returns whatever the underlying [`Dotfile`] operation returns.
    pub fn apply(self, dotfile: &Dotfile, log: &dyn Log, dry_run: bool) -> Result<(), DotfileError> {
        match self {
            Self::Add => dotfile.add(log, dry_run),
            Self::Remove => dotfile.remove(log, dry_run),
            Self::Link => dotfile.link(log, dry_run),
            Self::Unlink => dotfile.unlink(log, dry_run),
        }
    }
}

/// Asks the user a yes/no question.
#[cfg_attr(test, mockall::automock)]
pub trait Confirm {
    /// Return `true` if the user agreed.
    fn confirm(&self, prompt: &str) -> bool;
}

/// Interactive [`Confirm`] on the terminal.
#[derive(Debug, Clone, Copy)]
pub struct PromptConfirm;

impl Confirm for PromptConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        inquire::Confirm::new(prompt)
            .with_default(false)
            .prompt()
            .unwrap_or(false)
    }
}

/// [`Confirm`] that always agrees (`--yes`).
#[derive(Debug, Clone, Copy)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Apply `operation` to `files`, or to every managed dotfile after
/// confirmation when `files` is empty.
///
/// `remove` prunes the repository afterwards and `unlink` prunes the empty
/// home directories it leaves behind.
///
/// # Errors
///
/// Returns an error only if the repository cannot be listed or pruned;
/// per-file failures are logged and recorded.
pub fn run(
    repo: &Repository,
    operation: Operation,
    files: &[PathBuf],
    confirm: &dyn Confirm,
    log: &dyn Log,
    dry_run: bool,
) -> Result<()> {
    let dotfiles = if files.is_empty() {
        if !confirm.confirm(&format!("{} all dotfiles?", operation.verb())) {
            log.info("nothing to do");
            return Ok(());
        }
        repo.contents()?
    } else {
        let (resolved, errors) = repo.resolve(files);
        for err in &errors {
            log.error(&err.to_string());
            log.record(
                &repo.short_name(err.path()),
                OutcomeStatus::Failed,
                Some(err.kind().message()),
            );
        }
        resolved
    };

    let done = if dry_run {
        OutcomeStatus::DryRun
    } else {
        OutcomeStatus::Ok
    };

    let mut moved_out = Vec::new();
    log.stage(operation.heading());
    for dotfile in &dotfiles {
        let short = repo.short_name(dotfile.name());
        match operation.apply(dotfile, log, dry_run) {
            Ok(()) => {
                log.info(&format!("{} '{short}'", operation.past_tense()));
                log.record(&short, done, None);
                match operation {
                    Operation::Unlink => repo.prune_parents(dotfile.name(), log, dry_run),
                    Operation::Remove => moved_out.push(dotfile.target().to_path_buf()),
                    Operation::Add | Operation::Link => {}
                }
            }
            Err(e) => {
                log.error(&e.to_string());
                log.record(&short, OutcomeStatus::Failed, Some(e.kind().message()));
            }
        }
    }

    if operation == Operation::Remove {
        repo.prune_after(&moved_out, log, dry_run)?;
    }
    Ok(())
}
