//! Core logging types: per-file outcomes, their status, and the [`Log`] trait.

/// Result of applying an operation to one dotfile, kept for the summary.
#[derive(Debug, Clone)]
pub struct Outcome {
    /// Path the operation was applied to, relative to the home directory.
    pub name: String,
    /// Final status of the operation.
    pub status: OutcomeStatus,
    /// Optional detail message (e.g., skip reason or error description).
    pub message: Option<String>,
}

/// Status of a completed per-file operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// Operation completed successfully.
    Ok,
    /// Operation was not attempted (e.g., a conflict without `--force`).
    Skipped,
    /// Operation ran in dry-run mode; no changes were applied.
    DryRun,
    /// Operation was refused or failed.
    Failed,
}

/// Abstraction over logging backends.
///
/// Both [`Logger`](super::logger::Logger) (console and log file) and
/// [`BufferedLog`](super::buffered::BufferedLog) (in-memory record)
/// implement this trait, so dotfile operations can report their steps
/// without knowing where the output goes.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a mutation that dry-run mode skipped.
    fn dry_run(&self, msg: &str);
    /// Record a per-file outcome for the summary.
    fn record(&self, name: &str, status: OutcomeStatus, message: Option<&str>);
}
