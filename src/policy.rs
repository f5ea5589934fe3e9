//! Pure translation between home-directory names and repository targets.
//!
//! Nothing in this module touches the filesystem except [`absolutize`],
//! which canonicalises the parent of a user-supplied path.
use std::ffi::OsString;
use std::io;
use std::path::{Component, Path, PathBuf};

use glob::Pattern;

use crate::error::{DotfileError, ErrorKind};

/// Rules mapping a repository file to its appearance under the home directory.
#[derive(Debug, Clone, Default)]
pub struct PathPolicy {
    remove_leading_dot: bool,
    ignore: Vec<Pattern>,
    packages: Vec<PathBuf>,
}

impl PathPolicy {
    /// Create a policy.
    ///
    /// `packages` are repository-relative directories whose top-level segment
    /// is always exposed with a leading dot (whatever `remove_leading_dot`
    /// says) and whose members are never renamed.
    #[must_use]
    pub const fn new(remove_leading_dot: bool, ignore: Vec<Pattern>, packages: Vec<PathBuf>) -> Self {
        Self {
            remove_leading_dot,
            ignore,
            packages,
        }
    }

    /// Whether the repository stores files without their leading dot.
    #[must_use]
    pub const fn remove_leading_dot(&self) -> bool {
        self.remove_leading_dot
    }

    fn in_package(&self, relative: &Path) -> bool {
        self.packages.iter().any(|root| relative.starts_with(root))
    }

    /// Map a repository file to its home-directory name.
    ///
    /// `target` is expected to lie under `repo`; if it does not, it is treated
    /// as already relative.
    #[must_use]
    pub fn name_from_target(&self, target: &Path, repo: &Path, home: &Path) -> PathBuf {
        let relative = target.strip_prefix(repo).unwrap_or(target);
        if !(self.remove_leading_dot || self.in_package(relative)) {
            return home.join(relative);
        }
        let mut components = relative.components();
        match components.next() {
            Some(Component::Normal(first)) => {
                let mut dotted = OsString::from(".");
                dotted.push(first);
                join_rest(home.join(dotted), components.as_path())
            }
            _ => home.join(relative),
        }
    }

    /// Map a home-directory name to the repository file backing it.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::NotRootedInHome`] if `name` is not under `home`.
    /// - [`ErrorKind::NotADotfile`] if the leading dot is required but absent.
    pub fn target_from_name(
        &self,
        name: &Path,
        repo: &Path,
        home: &Path,
    ) -> Result<PathBuf, DotfileError> {
        let relative = name
            .strip_prefix(home)
            .map_err(|_| DotfileError::rejected(ErrorKind::NotRootedInHome, name))?;
        let mut components = relative.components();
        let stripped = match components.next() {
            Some(Component::Normal(first)) => first
                .to_str()
                .and_then(|s| s.strip_prefix('.'))
                .filter(|s| !s.is_empty())
                .map(|s| join_rest(PathBuf::from(s), components.as_path())),
            _ => None,
        };

        if self.remove_leading_dot {
            let stripped =
                stripped.ok_or_else(|| DotfileError::rejected(ErrorKind::NotADotfile, name))?;
            return Ok(repo.join(stripped));
        }
        match stripped {
            Some(candidate) if self.in_package(&candidate) => Ok(repo.join(candidate)),
            _ => Ok(repo.join(relative)),
        }
    }

    /// Whether a repository-relative path is excluded.
    ///
    /// A pattern excludes the path when it matches the whole relative path or
    /// any single segment of it, so an ignored directory hides its contents.
    #[must_use]
    pub fn is_ignored(&self, relative: &Path) -> bool {
        self.ignore.iter().any(|pattern| {
            pattern.matches_path(relative)
                || relative.components().any(|c| match c {
                    Component::Normal(segment) => pattern.matches(&segment.to_string_lossy()),
                    _ => false,
                })
        })
    }
}

fn join_rest(base: PathBuf, rest: &Path) -> PathBuf {
    if rest.as_os_str().is_empty() {
        base
    } else {
        base.join(rest)
    }
}

/// Fold `.` and `..` components without consulting the filesystem.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Make `path` absolute and normalised, resolving symlinks in its parent
/// directory but never in its final component.
///
/// # Errors
///
/// Returns an error if the current directory is needed and unavailable.
pub fn absolutize(path: &Path) -> io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    let normalized = normalize(&absolute);
    match (normalized.parent(), normalized.file_name()) {
        (Some(parent), Some(file_name)) => Ok(dunce::canonicalize(parent)
            .map_or_else(|_| normalized.clone(), |parent| parent.join(file_name))),
        _ => Ok(normalized),
    }
}
