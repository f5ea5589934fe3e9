//! Tracing subscriber setup.
//!
//! Every event is classified once into an [`EventKind`]; the console format
//! and the log file each render that kind their own way.
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write as _;
use std::sync::Mutex;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Metadata, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;

use super::utils::{format_utc_datetime, format_utc_time, log_file_path, strip_ansi};

/// Target used for stage headers.
pub(super) const STAGE_TARGET: &str = "dotfiles::stage";
/// Target used for skipped dry-run mutations.
pub(super) const DRY_RUN_TARGET: &str = "dotfiles::dry_run";

/// How an event is presented, derived from its level and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EventKind {
    Stage,
    DryRun,
    Info,
    Warn,
    Error,
    Debug,
}

impl EventKind {
    fn of(metadata: &Metadata<'_>) -> Self {
        match *metadata.level() {
            Level::ERROR => Self::Error,
            Level::WARN => Self::Warn,
            Level::INFO => match metadata.target() {
                STAGE_TARGET => Self::Stage,
                DRY_RUN_TARGET => Self::DryRun,
                _ => Self::Info,
            },
            _ => Self::Debug,
        }
    }

    /// Plain-text prefix used in the log file.
    const fn file_prefix(self) -> &'static str {
        match self {
            Self::Stage => "==> ",
            Self::DryRun => "    [dry run] ",
            Self::Info => "    ",
            Self::Warn => "    [warn] ",
            Self::Error => "    [error] ",
            Self::Debug => "    [debug] ",
        }
    }

    /// Write `msg` to the terminal with colour.
    fn write_console(self, writer: &mut Writer<'_>, msg: &str) -> fmt::Result {
        match self {
            Self::Error => writeln!(writer, "\x1b[31mERROR:\x1b[0m {msg}"),
            Self::Warn => writeln!(writer, "\x1b[33mWARNING:\x1b[0m {msg}"),
            Self::Stage => writeln!(writer, "\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m"),
            Self::DryRun => writeln!(writer, "\x1b[33m[dry run]\x1b[0m {msg}"),
            Self::Info => writeln!(writer, "{msg}"),
            Self::Debug => writeln!(writer, "\x1b[2m{msg}\x1b[0m"),
        }
    }
}

/// The `message` field of an event.
#[derive(Default)]
struct Message(String);

impl Message {
    fn of(event: &Event<'_>) -> String {
        let mut message = Self::default();
        event.record(&mut message);
        message.0
    }
}

impl Visit for Message {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            value.clone_into(&mut self.0);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

/// A [`tracing_subscriber::Layer`] appending every event to the per-command
/// log file, timestamped, with ANSI codes stripped.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<File>,
}

impl FileLayer {
    /// Start a fresh log file for `command` with a run header.
    ///
    /// `None` when the cache directory or the file is unavailable; logging
    /// then only reaches the console.
    pub(super) fn new(command: &str) -> Option<Self> {
        let path = log_file_path(command)?;
        let version =
            option_env!("DOTFILES_VERSION").unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        let mut file = File::create(&path).ok()?;
        writeln!(file, "# dotfiles {version} {command} {}", format_utc_datetime()).ok()?;
        drop(file);
        let file = OpenOptions::new().append(true).open(&path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let prefix = EventKind::of(event.metadata()).file_prefix();
        let msg = strip_ansi(&Message::of(event));
        if let Ok(mut file) = self.file.lock() {
            writeln!(file, "[{}] {prefix}{msg}", format_utc_time()).ok();
        }
    }
}

/// Console rendering of events.
struct ConsoleFormat;

impl<S, N> FormatEvent<S, N> for ConsoleFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        EventKind::of(event.metadata()).write_console(&mut writer, &Message::of(event))
    }
}

/// Install the global subscriber for `command`.
///
/// The console shows info and above (debug too when `verbose`), with
/// warnings and errors on stderr. The log file under
/// `$XDG_CACHE_HOME/dotfiles/` always records debug and above.
pub fn init_subscriber(verbose: bool, command: &str) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        Layer as _, filter::LevelFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _,
    };

    let stderr = std::io::stderr.with_max_level(Level::WARN);
    let stdout = std::io::stdout.with_min_level(Level::INFO);
    let console = tracing_subscriber::fmt::layer()
        .event_format(ConsoleFormat)
        .with_writer(stderr.and(stdout))
        .with_filter(if verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        });
    let file = FileLayer::new(command).map(|layer| layer.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry().with(console).with(file).init();
}
