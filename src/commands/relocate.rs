//! `move`: relocate the repository and re-point its links.
use std::path::Path;

use anyhow::{Context as _, Result};

use crate::config::RC_FILE;
use crate::logging::Log;
use crate::repository::Repository;

/// Move the repository to `destination`.
///
/// The rc files are not rewritten; the user is reminded to update the
/// `repository` setting.
///
/// # Errors
///
/// Returns an error if the destination exists or the move fails.
pub fn run(repo: &Repository, destination: &Path, log: &dyn Log, dry_run: bool) -> Result<()> {
    let moved = repo
        .relocate(destination, log, dry_run)
        .with_context(|| format!("moving repository to {}", destination.display()))?;
    if !dry_run {
        log.info(&format!("moved repository to {}", moved.path().display()));
        log.warn(&format!(
            "update the repository location in ~/{RC_FILE} (or pass --repository)"
        ));
    }
    Ok(())
}
