//! Tracing-backed logger with dry-run awareness and outcome collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::{DRY_RUN_TARGET, STAGE_TARGET};
use super::types::{Log, Outcome, OutcomeStatus};
use super::utils::log_file_path;

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Logger used by the command-line front end.
///
/// Messages go through [`tracing`], so they reach both the console and the
/// log file at `$XDG_CACHE_HOME/dotfiles/<command>.log` once
/// [`init_subscriber`](super::subscriber::init_subscriber) has run.
#[derive(Debug)]
pub struct Logger {
    outcomes: Mutex<Vec<Outcome>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a new logger.
    ///
    /// Only remembers the log file path for the summary; the file itself is
    /// created by [`FileLayer`](super::subscriber::FileLayer).
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            outcomes: Mutex::new(Vec::new()),
            log_file: log_file_path(command),
        }
    }

    /// Return the log file path, if available.
    #[cfg(test)]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Return a clone of all recorded outcomes.
    #[must_use]
    pub fn outcomes(&self) -> Vec<Outcome> {
        self.outcomes.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header.
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message.
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a mutation skipped by dry-run mode.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    /// Record a per-file outcome for the summary.
    pub fn record(&self, name: &str, status: OutcomeStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.outcomes.lock() {
            guard.push(Outcome {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Count the number of failed outcomes.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.outcomes.lock().map_or(0, |guard| {
            guard
                .iter()
                .filter(|o| o.status == OutcomeStatus::Failed)
                .count()
        })
    }

    /// Log totals per status, and the log file location when anything failed.
    pub fn print_summary(&self) {
        let outcomes = self.outcomes();
        if outcomes.is_empty() {
            return;
        }

        let count = |status| outcomes.iter().filter(|o| o.status == status).count();
        let ok = count(OutcomeStatus::Ok);
        let skipped = count(OutcomeStatus::Skipped);
        let dry_run = count(OutcomeStatus::DryRun);
        let failed = count(OutcomeStatus::Failed);

        self.info(&format!(
            "{} files: {ok} ok, {skipped} skipped, {dry_run} dry-run, {failed} failed",
            outcomes.len()
        ));

        if failed > 0
            && let Some(path) = &self.log_file
        {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run);

    fn record(&self, name: &str, status: OutcomeStatus, message: Option<&str>) {
        self.record(name, status, message);
    }
}
