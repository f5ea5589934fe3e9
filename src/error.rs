//! Error types for dotfile operations and configuration loading.
//!
//! Every failure of a [`Dotfile`](crate::dotfile::Dotfile) or
//! [`Repository`](crate::repository::Repository) operation is a
//! [`DotfileError`] carrying an [`ErrorKind`] tag and the offending path, so
//! callers can match on the kind without parsing messages. Command handlers
//! at the CLI boundary convert errors to [`anyhow::Error`] via `?`.
//!
//! # Error hierarchy
//!
//! ```text
//! DotfileError
//! ├── Rejected { kind, path }   precondition failures, tagged by ErrorKind
//! └── Io { action, path, .. }   unrecoverable OS errors
//!
//! ConfigError                   rc file I/O, syntax and value errors
//! ```

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Closed set of reasons an operation can be refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The path does not lie under the home directory.
    NotRootedInHome,
    /// The path lies inside the repository itself.
    InRepository,
    /// The computed target matches an ignore pattern.
    TargetIgnored,
    /// The path is a directory where a file was expected.
    IsDirectory,
    /// The path does not follow the leading-dot convention.
    NotADotfile,
    /// Something already exists where a link would be created.
    Exists,
    /// The name is already a symlink into the repository.
    IsSymlink,
    /// The name is expected to be a symlink but is not.
    NotASymlink,
    /// The repository already holds a file at the target.
    TargetExists,
    /// The repository copy is missing.
    TargetMissing,
    /// Nothing exists at the given path.
    DoesNotExist,
    /// The name is a symlink, but not to its target.
    Inconsistent,
    /// The operating system reported an error.
    Io,
}

impl ErrorKind {
    /// Human-readable message, rendered after the quoted path.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotRootedInHome => "not rooted in home directory",
            Self::InRepository => "is within the repository",
            Self::TargetIgnored => "targets an ignored file",
            Self::IsDirectory => "is a directory",
            Self::NotADotfile => "is not a dotfile",
            Self::Exists => "already exists",
            Self::IsSymlink => "is a symlink",
            Self::NotASymlink => "is not a symlink",
            Self::TargetExists => "target already exists",
            Self::TargetMissing => "target is missing",
            Self::DoesNotExist => "does not exist",
            Self::Inconsistent => "does not point to its target",
            Self::Io => "could not be accessed",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Error returned by dotfile and repository operations.
#[derive(Error, Debug)]
pub enum DotfileError {
    /// A precondition failed; nothing was changed.
    #[error("'{}' {kind}", .path.display())]
    Rejected {
        /// Why the operation was refused.
        kind: ErrorKind,
        /// The path the check failed on.
        path: PathBuf,
    },

    /// A filesystem call failed part way through an operation.
    #[error("{action} '{}': {source}", .path.display())]
    Io {
        /// What was being attempted (e.g. `"creating symlink"`).
        action: &'static str,
        /// The path the call was made on.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl DotfileError {
    /// Build a [`DotfileError::Rejected`] for `path`.
    pub fn rejected(kind: ErrorKind, path: impl Into<PathBuf>) -> Self {
        Self::Rejected {
            kind,
            path: path.into(),
        }
    }

    /// Return a closure that wraps an [`io::Error`] with `action` and `path`,
    /// for use with `map_err`.
    pub fn io<'a>(action: &'static str, path: &'a Path) -> impl FnOnce(io::Error) -> Self + 'a {
        move |source| Self::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }

    /// The tag of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Rejected { kind, .. } => *kind,
            Self::Io { .. } => ErrorKind::Io,
        }
    }

    /// The path this error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Rejected { path, .. } | Self::Io { path, .. } => path,
        }
    }
}

/// Errors that arise from loading configuration files.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The rc file contains a line that cannot be parsed.
    #[error("Invalid INI syntax in {file}: {message}")]
    InvalidSyntax {
        /// Path to the offending file.
        file: String,
        /// Parser message including the line number.
        message: String,
    },

    /// A key holds a value of the wrong shape.
    #[error("Invalid value '{value}' for '{key}': expected {expected}")]
    InvalidValue {
        /// Key name within the `[dotfiles]` section.
        key: String,
        /// Raw value as written.
        value: String,
        /// Description of accepted values.
        expected: &'static str,
    },

    /// A glob in the ignore list does not compile.
    #[error("Invalid ignore pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The pattern as written.
        pattern: String,
        /// Error reported by the glob compiler.
        #[source]
        source: glob::PatternError,
    },

    /// The home directory could not be determined.
    #[error("could not determine the home directory")]
    NoHomeDirectory,

    /// An I/O error occurred while reading a config file.
    #[error("IO error reading config file {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        source: io::Error,
    },
}
