//! A single managed pairing between a home-directory name and its
//! repository target.
//!
//! Every mutating operation checks its preconditions first and returns a
//! [`DotfileError`] without touching the filesystem if one fails. In dry-run
//! mode the checks run identically, then each mutation is reported through
//! [`Log::dry_run`] in execution order instead of being performed:
//!
//! ```text
//! MKDIR  <dir>
//! MOVE   <from> -> <to>
//! LINK   <link> -> <target>
//! UNLINK <link>
//! ```
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{DotfileError, ErrorKind};
use crate::fs::{self, LinkStyle};
use crate::logging::Log;
use crate::policy::normalize;

/// On-disk condition of a [`Dotfile`], recomputed on every call to
/// [`Dotfile::state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// The name is absent (or a dangling symlink).
    Missing,
    /// The name is a symlink resolving to the target.
    Ok,
    /// Something unrelated occupies the name.
    Conflict,
    /// The name is a plain file identical to the target.
    Copy,
    /// The target is itself a symlink pointing outside the repository.
    External,
    /// The target does not exist.
    Error,
}

impl State {
    /// Single-character marker used by `status`.
    #[must_use]
    pub const fn marker(self) -> char {
        match self {
            Self::Ok => ' ',
            Self::Copy => '=',
            Self::External => '@',
            Self::Missing => '?',
            Self::Conflict => '!',
            Self::Error => 'E',
        }
    }

    /// Lowercase name of the state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Ok => "ok",
            Self::Conflict => "conflict",
            Self::Copy => "copy",
            Self::External => "external",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `(name, target)` pairing.
///
/// Holds no knowledge of ignore rules or repository layout; construct it
/// through [`Repository`](crate::repository::Repository) to get a validated
/// pairing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dotfile {
    name: PathBuf,
    target: PathBuf,
    link_style: LinkStyle,
}

impl Dotfile {
    /// Pair `name` with `target`, creating relative links.
    #[must_use]
    pub fn new(name: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            link_style: LinkStyle::default(),
        }
    }

    /// Use `style` for links this pairing creates.
    #[must_use]
    pub const fn with_link_style(mut self, style: LinkStyle) -> Self {
        self.link_style = style;
        self
    }

    /// Home-directory side of the pairing.
    #[must_use]
    pub fn name(&self) -> &Path {
        &self.name
    }

    /// Repository side of the pairing.
    #[must_use]
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Classify the pairing from the current filesystem.
    #[must_use]
    pub fn state(&self) -> State {
        if fs::is_symlink(&self.target) {
            return State::External;
        }
        if !fs::lexists(&self.target) {
            return State::Error;
        }
        if !self.name.exists() {
            return State::Missing;
        }
        if fs::is_symlink(&self.name) {
            return if fs::same_file(&self.name, &self.target) {
                State::Ok
            } else {
                State::Conflict
            };
        }
        if self.name.is_file() && fs::same_content(&self.name, &self.target).unwrap_or(false) {
            return State::Copy;
        }
        State::Conflict
    }

    /// Move the file at `name` into the repository and link it back.
    ///
    /// If `name` is a symlink pointing elsewhere, the repository captures the
    /// link itself: the target becomes a symlink to the same destination and
    /// `name` is re-pointed at the target.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::IsSymlink`] if `name` already links to the target.
    /// - [`ErrorKind::TargetExists`] if anything exists at the target.
    /// - [`ErrorKind::DoesNotExist`] if nothing exists at `name`, or `name`
    ///   is a dangling symlink.
    /// - [`ErrorKind::IsDirectory`] if `name` is a directory.
    /// - [`ErrorKind::Io`] if a filesystem call fails.
    pub fn add(&self, log: &dyn Log, dry_run: bool) -> Result<(), DotfileError> {
        if fs::is_symlink(&self.name) && fs::same_file(&self.name, &self.target) {
            return Err(DotfileError::rejected(ErrorKind::IsSymlink, &self.name));
        }
        if fs::lexists(&self.target) {
            return Err(DotfileError::rejected(ErrorKind::TargetExists, &self.target));
        }
        let Ok(meta) = self.name.symlink_metadata() else {
            return Err(DotfileError::rejected(ErrorKind::DoesNotExist, &self.name));
        };
        if meta.is_dir() {
            return Err(DotfileError::rejected(ErrorKind::IsDirectory, &self.name));
        }
        if meta.file_type().is_symlink() && !self.name.exists() {
            return Err(DotfileError::rejected(ErrorKind::DoesNotExist, &self.name));
        }

        let steps = Steps::new(log, dry_run);
        steps.mkdirs(&self.name)?;
        steps.mkdirs(&self.target)?;
        if meta.file_type().is_symlink() {
            let destination = resolve_link(&self.name)?;
            steps.link(&self.target, &destination, LinkStyle::Absolute)?;
            steps.unlink(&self.name)?;
        } else {
            steps.mv(&self.name, &self.target)?;
        }
        steps.link(&self.name, &self.target, self.link_style)
    }

    /// Replace the link at `name` with the repository file, taking it out of
    /// the repository.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::NotASymlink`] if `name` is not a symlink.
    /// - [`ErrorKind::TargetMissing`] if the target is absent or a directory.
    /// - [`ErrorKind::Io`] if a filesystem call fails.
    pub fn remove(&self, log: &dyn Log, dry_run: bool) -> Result<(), DotfileError> {
        if !fs::is_symlink(&self.name) {
            return Err(DotfileError::rejected(ErrorKind::NotASymlink, &self.name));
        }
        if !self
            .target
            .symlink_metadata()
            .is_ok_and(|meta| !meta.is_dir())
        {
            return Err(DotfileError::rejected(ErrorKind::TargetMissing, &self.target));
        }

        let steps = Steps::new(log, dry_run);
        steps.unlink(&self.name)?;
        steps.mv(&self.target, &self.name)
    }

    /// Create the link at `name`.
    ///
    /// A dangling symlink at `name` is replaced.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::Exists`] if `name` exists (following links).
    /// - [`ErrorKind::TargetMissing`] if the target is absent.
    /// - [`ErrorKind::Io`] if a filesystem call fails.
    pub fn link(&self, log: &dyn Log, dry_run: bool) -> Result<(), DotfileError> {
        if self.name.exists() {
            return Err(DotfileError::rejected(ErrorKind::Exists, &self.name));
        }
        if !fs::lexists(&self.target) {
            return Err(DotfileError::rejected(ErrorKind::TargetMissing, &self.target));
        }

        let steps = Steps::new(log, dry_run);
        steps.mkdirs(&self.name)?;
        if fs::is_symlink(&self.name) {
            steps.unlink(&self.name)?;
        }
        steps.link(&self.name, &self.target, self.link_style)
    }

    /// Delete the link at `name`, leaving the repository file in place.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::NotASymlink`] if `name` is not a symlink.
    /// - [`ErrorKind::TargetMissing`] if the target is absent.
    /// - [`ErrorKind::Inconsistent`] if `name` points somewhere else.
    /// - [`ErrorKind::Io`] if a filesystem call fails.
    pub fn unlink(&self, log: &dyn Log, dry_run: bool) -> Result<(), DotfileError> {
        if !fs::is_symlink(&self.name) {
            return Err(DotfileError::rejected(ErrorKind::NotASymlink, &self.name));
        }
        if !fs::lexists(&self.target) {
            return Err(DotfileError::rejected(ErrorKind::TargetMissing, &self.target));
        }
        if !fs::same_file(&self.name, &self.target) {
            return Err(DotfileError::rejected(ErrorKind::Inconsistent, &self.name));
        }

        Steps::new(log, dry_run).unlink(&self.name)
    }

    /// Discard whatever file occupies `name` and link it to the target.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::TargetMissing`] if the target is absent.
    /// - [`ErrorKind::IsDirectory`] if `name` is a real directory.
    /// - [`ErrorKind::Io`] if a filesystem call fails.
    pub fn replace(&self, log: &dyn Log, dry_run: bool) -> Result<(), DotfileError> {
        if !fs::lexists(&self.target) {
            return Err(DotfileError::rejected(ErrorKind::TargetMissing, &self.target));
        }
        let existing = self.name.symlink_metadata().ok();
        if existing.as_ref().is_some_and(std::fs::Metadata::is_dir) {
            return Err(DotfileError::rejected(ErrorKind::IsDirectory, &self.name));
        }

        let steps = Steps::new(log, dry_run);
        steps.mkdirs(&self.name)?;
        if existing.is_some() {
            steps.unlink(&self.name)?;
        }
        steps.link(&self.name, &self.target, self.link_style)
    }
}

/// Absolute destination of the symlink at `link`, without requiring the
/// destination to exist.
fn resolve_link(link: &Path) -> Result<PathBuf, DotfileError> {
    let raw = std::fs::read_link(link).map_err(DotfileError::io("reading symlink", link))?;
    if raw.is_absolute() {
        return Ok(raw);
    }
    let base = link.parent().unwrap_or_else(|| Path::new(""));
    Ok(normalize(&base.join(raw)))
}

/// Reports each mutation and performs it unless in dry-run mode.
struct Steps<'a> {
    log: &'a dyn Log,
    dry_run: bool,
}

impl<'a> Steps<'a> {
    const fn new(log: &'a dyn Log, dry_run: bool) -> Self {
        Self { log, dry_run }
    }

    /// Report `msg`; return `true` if the step should actually run.
    fn report(&self, msg: &str) -> bool {
        if self.dry_run {
            self.log.dry_run(msg);
        } else {
            self.log.debug(msg);
        }
        !self.dry_run
    }

    fn mkdirs(&self, path: &Path) -> Result<(), DotfileError> {
        for dir in fs::missing_parents(path) {
            if self.report(&format!("MKDIR  {}", dir.display())) {
                fs::create_dir(&dir)?;
            }
        }
        Ok(())
    }

    fn mv(&self, from: &Path, to: &Path) -> Result<(), DotfileError> {
        if self.report(&format!("MOVE   {} -> {}", from.display(), to.display())) {
            fs::move_path(from, to)?;
        }
        Ok(())
    }

    fn link(&self, link: &Path, target: &Path, style: LinkStyle) -> Result<(), DotfileError> {
        if self.report(&format!("LINK   {} -> {}", link.display(), target.display())) {
            fs::create_symlink(&fs::link_destination(link, target, style), link)?;
        }
        Ok(())
    }

    fn unlink(&self, link: &Path) -> Result<(), DotfileError> {
        if self.report(&format!("UNLINK {}", link.display())) {
            fs::remove_symlink(link)?;
        }
        Ok(())
    }
}

#[cfg(all(test, unix))]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::BufferedLog;
    use std::os::unix::fs::symlink;

    struct Fixture {
        _tmp: tempfile::TempDir,
        home: PathBuf,
        repo: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let tmp = tempfile::tempdir().unwrap();
            let root = dunce::canonicalize(tmp.path()).unwrap();
            let home = root.join("home");
            let repo = root.join("home/Dotfiles");
            std::fs::create_dir_all(&repo).unwrap();
            Self {
                _tmp: tmp,
                home,
                repo,
            }
        }

        fn dotfile(&self, rel: &str) -> Dotfile {
            let name = self.home.join(format!(".{rel}"));
            let target = self.repo.join(rel);
            Dotfile::new(name, target)
        }

        fn write(path: &Path, content: &str) {
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }
    }

    fn kind(result: Result<(), DotfileError>) -> ErrorKind {
        result.unwrap_err().kind()
    }

    // -----------------------------------------------------------------------
    // state
    // -----------------------------------------------------------------------

    #[test]
    fn state_error_when_target_absent() {
        let fx = Fixture::new();
        assert_eq!(fx.dotfile("foo").state(), State::Error);
    }

    #[test]
    fn state_missing_when_name_absent() {
        let fx = Fixture::new();
        let df = fx.dotfile("foo");
        Fixture::write(df.target(), "x");
        assert_eq!(df.state(), State::Missing);
    }

    #[test]
    fn state_missing_when_name_is_dangling() {
        let fx = Fixture::new();
        let df = fx.dotfile("foo");
        Fixture::write(df.target(), "x");
        symlink(fx.home.join("nowhere"), df.name()).unwrap();
        assert_eq!(df.state(), State::Missing);
    }

    #[test]
    fn state_ok_when_linked() {
        let fx = Fixture::new();
        let df = fx.dotfile("foo");
        Fixture::write(df.target(), "x");
        symlink(df.target(), df.name()).unwrap();
        assert_eq!(df.state(), State::Ok);
    }

    #[test]
    fn state_conflict_when_linked_elsewhere() {
        let fx = Fixture::new();
        let df = fx.dotfile("foo");
        Fixture::write(df.target(), "x");
        let other = fx.home.join("other");
        Fixture::write(&other, "x");
        symlink(&other, df.name()).unwrap();
        assert_eq!(df.state(), State::Conflict);
    }

    #[test]
    fn state_copy_when_identical_file() {
        let fx = Fixture::new();
        let df = fx.dotfile("foo");
        Fixture::write(df.target(), "same");
        Fixture::write(df.name(), "same");
        assert_eq!(df.state(), State::Copy);
    }

    #[test]
    fn state_conflict_when_different_file() {
        let fx = Fixture::new();
        let df = fx.dotfile("foo");
        Fixture::write(df.target(), "one");
        Fixture::write(df.name(), "two");
        assert_eq!(df.state(), State::Conflict);
    }

    #[test]
    fn state_conflict_when_directory() {
        let fx = Fixture::new();
        let df = fx.dotfile("foo");
        Fixture::write(df.target(), "one");
        std::fs::create_dir(df.name()).unwrap();
        assert_eq!(df.state(), State::Conflict);
    }

    #[test]
    fn state_external_when_target_is_symlink() {
        let fx = Fixture::new();
        let df = fx.dotfile("foo");
        symlink("/somewhere/else", df.target()).unwrap();
        assert_eq!(df.state(), State::External);
    }

    #[test]
    fn state_markers() {
        let markers: String = [
            State::Ok,
            State::Copy,
            State::External,
            State::Missing,
            State::Conflict,
            State::Error,
        ]
        .iter()
        .map(|s| s.marker())
        .collect();
        assert_eq!(markers, " =@?!E");
    }

    // -----------------------------------------------------------------------
    // add
    // -----------------------------------------------------------------------

    #[test]
    fn add_moves_file_and_links_back() {
        let fx = Fixture::new();
        let df = fx.dotfile("foo/bar/baz");
        Fixture::write(df.name(), "content");
        df.add(&BufferedLog::new(), false).unwrap();
        assert!(fs::is_symlink(df.name()));
        assert_eq!(std::fs::read_to_string(df.target()).unwrap(), "content");
        assert_eq!(df.state(), State::Ok);
    }

    #[test]
    fn add_dry_run_reports_steps_in_order() {
        let fx = Fixture::new();
        let df = fx.dotfile("foo/bar/baz");
        Fixture::write(df.name(), "content");
        let log = BufferedLog::new();
        df.add(&log, true).unwrap();
        let n = df.name().display();
        let t = df.target().display();
        let r = fx.repo.display();
        assert_eq!(
            log.dry_run_steps(),
            vec![
                format!("MKDIR  {r}/foo"),
                format!("MKDIR  {r}/foo/bar"),
                format!("MOVE   {n} -> {t}"),
                format!("LINK   {n} -> {t}"),
            ]
        );
        assert!(!fs::is_symlink(df.name()));
        assert!(!fs::lexists(&fx.repo.join("foo")));
    }

    #[test]
    fn add_twice_fails_with_is_symlink() {
        let fx = Fixture::new();
        let df = fx.dotfile("foo");
        Fixture::write(df.name(), "x");
        df.add(&BufferedLog::new(), false).unwrap();
        assert_eq!(kind(df.add(&BufferedLog::new(), false)), ErrorKind::IsSymlink);
    }

    #[test]
    fn add_refuses_existing_target() {
        let fx = Fixture::new();
        let df = fx.dotfile("foo");
        Fixture::write(df.name(), "x");
        Fixture::write(df.target(), "y");
        assert_eq!(kind(df.add(&BufferedLog::new(), true)), ErrorKind::TargetExists);
    }

    #[test]
    fn add_refuses_missing_name() {
        let fx = Fixture::new();
        assert_eq!(
            kind(fx.dotfile("foo").add(&BufferedLog::new(), false)),
            ErrorKind::DoesNotExist
        );
    }

    #[test]
    fn add_captures_foreign_symlink() {
        let fx = Fixture::new();
        let df = fx.dotfile("foo");
        let elsewhere = fx.home.join("elsewhere");
        Fixture::write(&elsewhere, "x");
        symlink(&elsewhere, df.name()).unwrap();
        df.add(&BufferedLog::new(), false).unwrap();
        assert_eq!(std::fs::read_link(df.target()).unwrap(), elsewhere);
        assert!(fs::same_file(df.name(), df.target()));
        assert_eq!(df.state(), State::External);
    }

    #[test]
    fn add_refuses_dangling_symlink_to_target() {
        let fx = Fixture::new();
        let df = fx.dotfile("foo");
        symlink(df.target(), df.name()).unwrap();
        assert_eq!(
            kind(df.add(&BufferedLog::new(), false)),
            ErrorKind::DoesNotExist
        );
        assert!(!fs::lexists(df.target()));
        assert!(fs::is_symlink(df.name()));
    }

    #[test]
    fn add_refuses_dangling_symlink_elsewhere() {
        let fx = Fixture::new();
        let df = fx.dotfile("foo");
        symlink(fx.home.join("gone"), df.name()).unwrap();
        assert_eq!(
            kind(df.add(&BufferedLog::new(), false)),
            ErrorKind::DoesNotExist
        );
        assert!(!fs::lexists(df.target()));
    }

    // -----------------------------------------------------------------------
    // remove
    // -----------------------------------------------------------------------

    #[test]
    fn remove_restores_file() {
        let fx = Fixture::new();
        let df = fx.dotfile("foo");
        Fixture::write(df.name(), "content");
        df.add(&BufferedLog::new(), false).unwrap();
        df.remove(&BufferedLog::new(), false).unwrap();
        assert!(!fs::is_symlink(df.name()));
        assert_eq!(std::fs::read_to_string(df.name()).unwrap(), "content");
        assert!(!fs::lexists(df.target()));
    }

    #[test]
    fn remove_dry_run_reports_unlink_then_move() {
        let fx = Fixture::new();
        let df = fx.dotfile("foo");
        Fixture::write(df.target(), "x");
        symlink(df.target(), df.name()).unwrap();
        let log = BufferedLog::new();
        df.remove(&log, true).unwrap();
        let n = df.name().display();
        let t = df.target().display();
        assert_eq!(
            log.dry_run_steps(),
            vec![format!("UNLINK {n}"), format!("MOVE   {t} -> {n}")]
        );
        assert_eq!(df.state(), State::Ok);
    }

    #[test]
    fn remove_twice_fails_with_not_a_symlink() {
        let fx = Fixture::new();
        let df = fx.dotfile("foo");
        Fixture::write(df.name(), "x");
        df.add(&BufferedLog::new(), false).unwrap();
        df.remove(&BufferedLog::new(), false).unwrap();
        assert_eq!(
            kind(df.remove(&BufferedLog::new(), false)),
            ErrorKind::NotASymlink
        );
    }

    #[test]
    fn remove_refuses_missing_target() {
        let fx = Fixture::new();
        let df = fx.dotfile("foo");
        symlink(df.target(), df.name()).unwrap();
        assert_eq!(
            kind(df.remove(&BufferedLog::new(), false)),
            ErrorKind::TargetMissing
        );
    }

    // -----------------------------------------------------------------------
    // link / unlink
    // -----------------------------------------------------------------------

    #[test]
    fn link_creates_parents_and_relative_link() {
        let fx = Fixture::new();
        let df = fx.dotfile("foo/bar/baz");
        Fixture::write(df.target(), "x");
        let log = BufferedLog::new();
        df.link(&log, true).unwrap();
        let h = fx.home.display();
        assert_eq!(
            log.dry_run_steps(),
            vec![
                format!("MKDIR  {h}/.foo"),
                format!("MKDIR  {h}/.foo/bar"),
                format!("LINK   {} -> {}", df.name().display(), df.target().display()),
            ]
        );
        df.link(&BufferedLog::new(), false).unwrap();
        assert!(std::fs::read_link(df.name()).unwrap().is_relative());
        assert_eq!(df.state(), State::Ok);
    }

    #[test]
    fn link_honours_absolute_style() {
        let fx = Fixture::new();
        let df = fx.dotfile("foo").with_link_style(LinkStyle::Absolute);
        Fixture::write(df.target(), "x");
        df.link(&BufferedLog::new(), false).unwrap();
        assert_eq!(std::fs::read_link(df.name()).unwrap(), df.target());
    }

    #[test]
    fn link_twice_fails_with_exists() {
        let fx = Fixture::new();
        let df = fx.dotfile("foo");
        Fixture::write(df.target(), "x");
        df.link(&BufferedLog::new(), false).unwrap();
        assert_eq!(kind(df.link(&BufferedLog::new(), false)), ErrorKind::Exists);
    }

    #[test]
    fn link_repairs_dangling_symlink() {
        let fx = Fixture::new();
        let df = fx.dotfile("foo");
        Fixture::write(df.target(), "x");
        symlink(fx.home.join("gone"), df.name()).unwrap();
        df.link(&BufferedLog::new(), false).unwrap();
        assert_eq!(df.state(), State::Ok);
    }

    #[test]
    fn link_refuses_missing_target() {
        let fx = Fixture::new();
        assert_eq!(
            kind(fx.dotfile("foo").link(&BufferedLog::new(), false)),
            ErrorKind::TargetMissing
        );
    }

    #[test]
    fn unlink_leaves_target() {
        let fx = Fixture::new();
        let df = fx.dotfile("foo");
        Fixture::write(df.target(), "x");
        df.link(&BufferedLog::new(), false).unwrap();
        df.unlink(&BufferedLog::new(), false).unwrap();
        assert!(!fs::lexists(df.name()));
        assert!(df.target().is_file());
        assert_eq!(
            kind(df.unlink(&BufferedLog::new(), false)),
            ErrorKind::NotASymlink
        );
    }

    #[test]
    fn unlink_refuses_link_to_elsewhere() {
        let fx = Fixture::new();
        let df = fx.dotfile("foo");
        Fixture::write(df.target(), "x");
        let other = fx.home.join("other");
        Fixture::write(&other, "x");
        symlink(&other, df.name()).unwrap();
        assert_eq!(
            kind(df.unlink(&BufferedLog::new(), false)),
            ErrorKind::Inconsistent
        );
        assert!(fs::is_symlink(df.name()));
    }

    // -----------------------------------------------------------------------
    // replace
    // -----------------------------------------------------------------------

    #[test]
    fn replace_discards_conflicting_file() {
        let fx = Fixture::new();
        let df = fx.dotfile("foo");
        Fixture::write(df.target(), "repo");
        Fixture::write(df.name(), "local");
        df.replace(&BufferedLog::new(), false).unwrap();
        assert_eq!(df.state(), State::Ok);
        assert_eq!(std::fs::read_to_string(df.name()).unwrap(), "repo");
    }

    #[test]
    fn replace_refuses_directory() {
        let fx = Fixture::new();
        let df = fx.dotfile("foo");
        Fixture::write(df.target(), "repo");
        std::fs::create_dir(df.name()).unwrap();
        assert_eq!(
            kind(df.replace(&BufferedLog::new(), false)),
            ErrorKind::IsDirectory
        );
    }

    // -----------------------------------------------------------------------
    // dry run preconditions
    // -----------------------------------------------------------------------

    type Operation = fn(&Dotfile, &dyn Log, bool) -> Result<(), DotfileError>;
    type Setup = fn(&Fixture, &Dotfile);

    #[test]
    fn dry_run_raises_the_same_errors_as_a_real_run() {
        let cases: [(&str, Setup, Operation, ErrorKind); 9] = [
            (
                "add over existing target",
                |_, df| {
                    Fixture::write(df.name(), "x");
                    Fixture::write(df.target(), "y");
                },
                Dotfile::add,
                ErrorKind::TargetExists,
            ),
            (
                "add already linked",
                |_, df| {
                    Fixture::write(df.target(), "x");
                    symlink(df.target(), df.name()).unwrap();
                },
                Dotfile::add,
                ErrorKind::IsSymlink,
            ),
            ("add nothing", |_, _| {}, Dotfile::add, ErrorKind::DoesNotExist),
            (
                "link over file",
                |_, df| {
                    Fixture::write(df.target(), "x");
                    Fixture::write(df.name(), "y");
                },
                Dotfile::link,
                ErrorKind::Exists,
            ),
            (
                "link without target",
                |_, _| {},
                Dotfile::link,
                ErrorKind::TargetMissing,
            ),
            (
                "unlink plain file",
                |_, df| {
                    Fixture::write(df.target(), "x");
                    Fixture::write(df.name(), "x");
                },
                Dotfile::unlink,
                ErrorKind::NotASymlink,
            ),
            (
                "unlink foreign link",
                |fx, df| {
                    Fixture::write(df.target(), "x");
                    let other = fx.home.join("other");
                    Fixture::write(&other, "x");
                    symlink(&other, df.name()).unwrap();
                },
                Dotfile::unlink,
                ErrorKind::Inconsistent,
            ),
            (
                "remove plain file",
                |_, df| {
                    Fixture::write(df.target(), "x");
                    Fixture::write(df.name(), "x");
                },
                Dotfile::remove,
                ErrorKind::NotASymlink,
            ),
            (
                "remove without target",
                |_, df| symlink(df.target(), df.name()).unwrap(),
                Dotfile::remove,
                ErrorKind::TargetMissing,
            ),
        ];

        for (label, setup, operation, expected) in cases {
            let fx = Fixture::new();
            let df = fx.dotfile("foo");
            setup(&fx, &df);
            let log = BufferedLog::new();
            let dry = kind(operation(&df, &log, true));
            let real = kind(operation(&df, &log, false));
            assert_eq!(dry, expected, "{label}: dry run");
            assert_eq!(real, expected, "{label}: real run");
            assert!(log.dry_run_steps().is_empty(), "{label}: reported steps");
        }
    }
}
