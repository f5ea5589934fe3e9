//! In-memory logger that records every message it receives.
use std::sync::Mutex;

use super::types::{Log, Outcome, OutcomeStatus};

/// A single recorded log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    /// A stage header entry.
    Stage(String),
    /// An informational entry.
    Info(String),
    /// A debug entry.
    Debug(String),
    /// A warning entry.
    Warn(String),
    /// An error entry.
    Error(String),
    /// A dry-run entry.
    DryRun(String),
}

/// Implement the display methods of [`Log`] by pushing each message into
/// `self.entries` as the corresponding [`LogEntry`] variant.
macro_rules! buffer_log_methods {
    ($($method:ident => $variant:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                if let Ok(mut guard) = self.entries.lock() {
                    guard.push(LogEntry::$variant(msg.to_string()));
                }
            }
        )+
    };
}

/// Logger that keeps messages and outcomes in memory.
///
/// Library callers that want to inspect or post-process what an operation
/// reported (including the exact dry-run step sequence) use this instead of
/// [`Logger`](super::logger::Logger).
#[derive(Debug, Default)]
pub struct BufferedLog {
    entries: Mutex<Vec<LogEntry>>,
    outcomes: Mutex<Vec<Outcome>>,
}

impl BufferedLog {
    /// Create an empty buffered log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries recorded so far, in order.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Messages of the dry-run entries, in order.
    #[must_use]
    pub fn dry_run_steps(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|e| match e {
                LogEntry::DryRun(msg) => Some(msg),
                _ => None,
            })
            .collect()
    }

    /// Messages of the error entries, in order.
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|e| match e {
                LogEntry::Error(msg) => Some(msg),
                _ => None,
            })
            .collect()
    }

    /// All recorded outcomes, in order.
    #[must_use]
    pub fn outcomes(&self) -> Vec<Outcome> {
        self.outcomes.lock().map_or_else(|_| vec![], |g| g.clone())
    }
}

impl Log for BufferedLog {
    buffer_log_methods! {
        stage   => Stage,
        info    => Info,
        debug   => Debug,
        warn    => Warn,
        error   => Error,
        dry_run => DryRun,
    }

    fn record(&self, name: &str, status: OutcomeStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.outcomes.lock() {
            guard.push(Outcome {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }
}
