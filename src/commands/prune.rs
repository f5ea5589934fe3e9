//! `prune`: remove empty directories from the repository.
use anyhow::Result;

use crate::logging::Log;
use crate::repository::Repository;

/// Prune the repository and report how many directories went away.
///
/// # Errors
///
/// Returns an error if the repository cannot be walked or a directory
/// cannot be removed.
pub fn run(repo: &Repository, log: &dyn Log, dry_run: bool) -> Result<()> {
    let removed = repo.prune(log, dry_run)?;
    match removed.len() {
        0 => log.info("no empty directories"),
        1 => log.info("pruned 1 empty directory"),
        n => log.info(&format!("pruned {n} empty directories")),
    }
    Ok(())
}
