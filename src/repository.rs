//! The repository directory and its relationship to the home directory.
//!
//! A [`Repository`] resolves user-supplied paths into validated
//! [`Dotfile`] pairings, discovers every managed file by walking the
//! repository, and cleans up empty directories. It never caches: every call
//! reflects the filesystem as it is now.
//!
//! # Hosts mode
//!
//! When the repository holds an `all.host` directory, files are split per
//! machine: `all.host/` is shared and `<hostname>.host/` holds files for one
//! host only. A host file shadows the shared file with the same name.
//!
//! # Externals
//!
//! Externals pair a home path with a target outside the repository. They
//! behave like any other dotfile but are never moved by `relocate` or
//! walked by `prune`.
use std::collections::{BTreeMap, HashSet};
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::config::Config;
use crate::dotfile::{Dotfile, State};
use crate::error::{DotfileError, ErrorKind};
use crate::fs::{self, LinkStyle};
use crate::logging::Log;
use crate::policy::{PathPolicy, absolutize, normalize};

/// Host directory holding files shared by every host.
pub const SHARED_HOST: &str = "all";

const HOST_SUFFIX: &str = ".host";

/// Directory name holding the files of `host`.
#[must_use]
pub fn host_dir_name(host: &str) -> String {
    format!("{host}{HOST_SUFFIX}")
}

fn is_host_dir_name(name: &OsStr) -> bool {
    name.to_str().is_some_and(|n| n.len() > HOST_SUFFIX.len() && n.ends_with(HOST_SUFFIX))
}

/// A repository of dotfiles paired with a home directory.
#[derive(Debug, Clone)]
pub struct Repository {
    path: PathBuf,
    homedir: PathBuf,
    policy: PathPolicy,
    link_style: LinkStyle,
    hostname: Option<String>,
    externals: Vec<(PathBuf, PathBuf)>,
}

impl Repository {
    /// Open the repository described by `config`.
    ///
    /// # Errors
    ///
    /// See [`Repository::open`].
    pub fn new(config: &Config) -> Result<Self, DotfileError> {
        Ok(Self::open(
            &config.repository,
            &config.home,
            config.policy(),
            config.link_style,
        )?
        .with_hostname(config.hostname.clone())
        .with_externals(&config.externals))
    }

    /// Open the repository at `path`, creating the directory if needed.
    ///
    /// Both roots are canonicalised so that descendant checks hold even when
    /// they are reached through a symlinked prefix.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::DoesNotExist`] if `homedir` does not exist.
    /// - [`ErrorKind::Io`] if the repository directory cannot be created.
    pub fn open(
        path: &Path,
        homedir: &Path,
        policy: PathPolicy,
        link_style: LinkStyle,
    ) -> Result<Self, DotfileError> {
        let homedir = dunce::canonicalize(homedir)
            .ok()
            .filter(|home| home.is_dir())
            .ok_or_else(|| DotfileError::rejected(ErrorKind::DoesNotExist, homedir))?;
        std::fs::create_dir_all(path).map_err(DotfileError::io("creating repository", path))?;
        let path = dunce::canonicalize(path).map_err(DotfileError::io("resolving", path))?;
        Ok(Self {
            path,
            homedir,
            policy,
            link_style,
            hostname: None,
            externals: Vec::new(),
        })
    }

    /// Use `hostname` to pick this machine's host directory in hosts mode.
    #[must_use]
    pub fn with_hostname(mut self, hostname: Option<String>) -> Self {
        self.hostname = hostname;
        self
    }

    /// Manage `externals`, home-relative names mapped to targets outside
    /// the repository.
    #[must_use]
    pub fn with_externals(mut self, externals: &BTreeMap<PathBuf, PathBuf>) -> Self {
        self.externals = externals
            .iter()
            .map(|(name, target)| {
                (
                    normalize(&self.homedir.join(name)),
                    normalize(&self.homedir.join(target)),
                )
            })
            .collect();
        self
    }

    /// Repository root.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Home directory root.
    #[must_use]
    pub fn homedir(&self) -> &Path {
        &self.homedir
    }

    /// Whether the repository is split into per-host directories.
    #[must_use]
    pub fn hosts_mode(&self) -> bool {
        self.path.join(host_dir_name(SHARED_HOST)).is_dir()
    }

    /// Shared content root and, in hosts mode, this host's own root.
    fn roots(&self) -> (PathBuf, Option<PathBuf>) {
        if !self.hosts_mode() {
            return (self.path.clone(), None);
        }
        let own = self
            .hostname
            .as_deref()
            .filter(|host| *host != SHARED_HOST)
            .map(|host| self.path.join(host_dir_name(host)));
        (self.path.join(host_dir_name(SHARED_HOST)), own)
    }

    fn pairing(&self, name: PathBuf, target: PathBuf) -> Dotfile {
        Dotfile::new(name, target).with_link_style(self.link_style)
    }

    fn external(&self, name: &Path) -> Option<&Path> {
        self.externals
            .iter()
            .find(|(external, _)| external == name)
            .map(|(_, target)| target.as_path())
    }

    /// Path of a repository entry below its content root.
    fn relative<'a>(&self, path: &'a Path) -> Option<&'a Path> {
        let relative = path.strip_prefix(&self.path).ok()?;
        let mut components = relative.components();
        match components.next() {
            Some(Component::Normal(first)) if is_host_dir_name(first) && self.hosts_mode() => {
                Some(components.as_path())
            }
            _ => Some(relative),
        }
    }

    fn is_ignored(&self, path: &Path) -> bool {
        self.relative(path)
            .is_some_and(|relative| self.policy.is_ignored(relative))
    }

    /// Repository path for `name`: this host's copy if one exists, else
    /// the shared one.
    fn target_for(&self, name: &Path) -> Result<PathBuf, DotfileError> {
        let (shared, own) = self.roots();
        if let Some(own) = own {
            let target = self.policy.target_from_name(name, &own, &self.homedir)?;
            if fs::lexists(&target) {
                return Ok(target);
            }
        }
        self.policy.target_from_name(name, &shared, &self.homedir)
    }

    /// Every managed file in the repository, sorted by name.
    ///
    /// Symlinks stored in the repository are included and report
    /// [`State::External`]. In hosts mode only the shared and this host's
    /// files are listed. Externals are appended to the repository's files.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository cannot be read.
    pub fn contents(&self) -> Result<Vec<Dotfile>, DotfileError> {
        let (shared, own) = self.roots();
        let mut found = BTreeMap::new();
        for root in std::iter::once(shared).chain(own.filter(|own| own.is_dir())) {
            let walker = WalkDir::new(&root)
                .min_depth(1)
                .follow_links(false)
                .into_iter()
                .filter_entry(|entry| !self.is_ignored(entry.path()));
            for entry in walker {
                let entry = entry.map_err(|e| walk_error(e, &root))?;
                if entry.file_type().is_dir() {
                    continue;
                }
                let target = entry.into_path();
                let name = self.policy.name_from_target(&target, &root, &self.homedir);
                found.insert(name.clone(), self.pairing(name, target));
            }
        }
        for (name, target) in &self.externals {
            found.insert(name.clone(), self.pairing(name.clone(), target.clone()));
        }
        Ok(found.into_values().collect())
    }

    /// Resolve one home-directory path into a validated pairing.
    ///
    /// # Errors
    ///
    /// Checked in this order:
    /// - [`ErrorKind::NotRootedInHome`] if the path is outside the home directory.
    /// - [`ErrorKind::InRepository`] if the path is inside the repository.
    /// - [`ErrorKind::NotADotfile`] if it breaks the leading-dot convention.
    /// - [`ErrorKind::TargetIgnored`] if the target matches an ignore pattern.
    /// - [`ErrorKind::IsDirectory`] if the path is a directory.
    ///
    /// Externals skip the last three checks.
    pub fn dotfile(&self, path: &Path) -> Result<Dotfile, DotfileError> {
        let name = absolutize(path).map_err(DotfileError::io("resolving", path))?;
        if !name.starts_with(&self.homedir) {
            return Err(DotfileError::rejected(ErrorKind::NotRootedInHome, name));
        }
        if name.starts_with(&self.path) {
            return Err(DotfileError::rejected(ErrorKind::InRepository, name));
        }
        if let Some(target) = self.external(&name) {
            let target = target.to_path_buf();
            return Ok(self.pairing(name, target));
        }
        let target = self.target_for(&name)?;
        if self.is_ignored(&target) {
            return Err(DotfileError::rejected(ErrorKind::TargetIgnored, name));
        }
        if name.symlink_metadata().is_ok_and(|meta| meta.is_dir()) {
            return Err(DotfileError::rejected(ErrorKind::IsDirectory, name));
        }
        Ok(self.pairing(name, target))
    }

    /// Resolve many paths, expanding directories to the files below them.
    ///
    /// Duplicates are dropped, keeping the first occurrence. A path that
    /// fails to resolve is reported through `log` and skipped; the rest of
    /// the batch is still returned.
    pub fn dotfiles(&self, paths: &[PathBuf], log: &dyn Log) -> Vec<Dotfile> {
        let (resolved, errors) = self.resolve(paths);
        for err in &errors {
            log.error(&err.to_string());
        }
        resolved
    }

    /// Like [`dotfiles`](Self::dotfiles), but hands the per-path errors back
    /// to the caller instead of logging them.
    #[must_use]
    pub fn resolve(&self, paths: &[PathBuf]) -> (Vec<Dotfile>, Vec<DotfileError>) {
        let mut seen = HashSet::new();
        let mut resolved = Vec::new();
        let mut errors = Vec::new();
        for path in paths {
            let candidates = match absolutize(path) {
                Ok(absolute) => self.expand(&absolute, &mut errors),
                Err(e) => {
                    errors.push(DotfileError::io("resolving", path)(e));
                    continue;
                }
            };
            for candidate in candidates {
                if !seen.insert(candidate.clone()) {
                    continue;
                }
                match self.dotfile(&candidate) {
                    Ok(dotfile) => resolved.push(dotfile),
                    Err(e) => errors.push(e),
                }
            }
        }
        (resolved, errors)
    }

    /// `name` relative to the home directory, for display.
    #[must_use]
    pub fn short_name(&self, name: &Path) -> String {
        name.strip_prefix(&self.homedir)
            .unwrap_or(name)
            .display()
            .to_string()
    }

    /// Files below `path` if it is a home directory outside the repository,
    /// otherwise `path` itself.
    ///
    /// Entries whose repository path would be ignored are skipped, as are
    /// whole directories that map to an ignored repository directory.
    /// Unreadable entries are pushed onto `errors`.
    fn expand(&self, path: &Path, errors: &mut Vec<DotfileError>) -> Vec<PathBuf> {
        let is_dir = path.symlink_metadata().is_ok_and(|meta| meta.is_dir());
        if !is_dir
            || !path.starts_with(&self.homedir)
            || path.starts_with(&self.path)
            || self.external(path).is_some()
        {
            return vec![path.to_path_buf()];
        }
        let walker = WalkDir::new(path)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                !entry.path().starts_with(&self.path) && !self.maps_to_ignored(entry.path())
            });
        let mut files = Vec::new();
        for entry in walker {
            match entry {
                Ok(entry) if entry.file_type().is_dir() => {}
                Ok(entry) => files.push(entry.into_path()),
                Err(e) => errors.push(walk_error(e, path)),
            }
        }
        files
    }

    /// Whether home path `name` would be stored at an ignored repository path.
    fn maps_to_ignored(&self, name: &Path) -> bool {
        self.external(name).is_none()
            && self
                .target_for(name)
                .is_ok_and(|target| self.is_ignored(&target))
    }

    /// Remove every empty, non-ignored directory below the repository root.
    ///
    /// Directories that only become empty because their children are
    /// pruned in the same pass are removed too, in dry-run mode as well.
    /// Host directories directly below the root are kept. Returns the
    /// removed directories, deepest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository cannot be read or a directory
    /// cannot be removed.
    pub fn prune(&self, log: &dyn Log, dry_run: bool) -> Result<Vec<PathBuf>, DotfileError> {
        self.prune_after(&[], log, dry_run)
    }

    /// Like [`prune`](Self::prune), treating `gone` as already removed.
    ///
    /// A dry-run `remove` passes the targets it would have moved out so the
    /// predicted `RMDIR` steps match a real run.
    ///
    /// # Errors
    ///
    /// See [`prune`](Self::prune).
    pub fn prune_after(
        &self,
        gone: &[PathBuf],
        log: &dyn Log,
        dry_run: bool,
    ) -> Result<Vec<PathBuf>, DotfileError> {
        let mut dirs = Vec::new();
        let walker = WalkDir::new(&self.path)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_ignored(entry.path()));
        for entry in walker {
            let entry = entry.map_err(|e| walk_error(e, &self.path))?;
            if entry.file_type().is_dir() && !self.is_host_root(entry.path()) {
                dirs.push(entry.into_path());
            }
        }

        let mut removed: HashSet<PathBuf> = gone.iter().cloned().collect();
        let mut order = Vec::new();
        // Reversed pre-order visits every directory after its descendants.
        for dir in dirs.into_iter().rev() {
            if !only_contains(&dir, &removed)? {
                continue;
            }
            if report(log, dry_run, &format!("RMDIR  {}", dir.display())) {
                std::fs::remove_dir(&dir).map_err(DotfileError::io("removing directory", &dir))?;
            }
            removed.insert(dir.clone());
            order.push(dir);
        }
        Ok(order)
    }

    fn is_host_root(&self, dir: &Path) -> bool {
        dir.parent() == Some(self.path.as_path()) && dir.file_name().is_some_and(is_host_dir_name)
    }

    /// Remove now-empty ancestors of `name`, stopping at the home directory.
    ///
    /// Best effort: a directory that cannot be read or removed ends the walk
    /// and is logged at debug level.
    pub fn prune_parents(&self, name: &Path, log: &dyn Log, dry_run: bool) {
        let mut removed = HashSet::new();
        if dry_run {
            removed.insert(name.to_path_buf());
        }
        for dir in name.ancestors().skip(1) {
            if dir == self.homedir || !dir.starts_with(&self.homedir) || dir.starts_with(&self.path)
            {
                break;
            }
            match only_contains(dir, &removed) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    log.debug(&e.to_string());
                    break;
                }
            }
            if report(log, dry_run, &format!("RMDIR  {}", dir.display()))
                && let Err(e) = std::fs::remove_dir(dir)
            {
                log.debug(&DotfileError::io("removing directory", dir)(e).to_string());
                break;
            }
            removed.insert(dir.to_path_buf());
        }
    }

    /// Move the repository to `destination` and re-point every link that was
    /// intact before the move. Returns the repository at its new location.
    ///
    /// Externals point outside the repository and are left alone.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::Exists`] if `destination` already exists.
    /// - [`ErrorKind::Io`] if the move or a re-link fails.
    pub fn relocate(
        &self,
        destination: &Path,
        log: &dyn Log,
        dry_run: bool,
    ) -> Result<Self, DotfileError> {
        let destination =
            absolutize(destination).map_err(DotfileError::io("resolving", destination))?;
        if fs::lexists(&destination) {
            return Err(DotfileError::rejected(ErrorKind::Exists, destination));
        }

        let linked: Vec<(PathBuf, PathBuf)> = self
            .contents()?
            .into_iter()
            .filter(|dotfile| dotfile.state() == State::Ok)
            .filter_map(|dotfile| {
                let relative = dotfile.target().strip_prefix(&self.path).ok()?;
                Some((dotfile.name().to_path_buf(), relative.to_path_buf()))
            })
            .collect();

        for dir in fs::missing_parents(&destination) {
            if report(log, dry_run, &format!("MKDIR  {}", dir.display())) {
                fs::create_dir(&dir)?;
            }
        }
        let msg = format!("MOVE   {} -> {}", self.path.display(), destination.display());
        if !report(log, dry_run, &msg) {
            for (name, relative) in &linked {
                log.dry_run(&format!("UNLINK {}", name.display()));
                log.dry_run(&format!(
                    "LINK   {} -> {}",
                    name.display(),
                    destination.join(relative).display()
                ));
            }
            return Ok(Self {
                path: destination,
                ..self.clone()
            });
        }

        fs::move_path(&self.path, &destination)?;
        let moved = Self {
            path: dunce::canonicalize(&destination)
                .map_err(DotfileError::io("resolving", &destination))?,
            ..self.clone()
        };
        for (name, relative) in linked {
            let target = moved.path.join(relative);
            moved.pairing(name, target).link(log, false)?;
        }
        Ok(moved)
    }
}

/// Report `msg` as a dry-run step or debug message; `true` if the step
/// should actually run.
fn report(log: &dyn Log, dry_run: bool, msg: &str) -> bool {
    if dry_run {
        log.dry_run(msg);
    } else {
        log.debug(msg);
    }
    !dry_run
}

/// Whether every entry of `dir` is in `removed` (vacuously true when empty).
fn only_contains(dir: &Path, removed: &HashSet<PathBuf>) -> Result<bool, DotfileError> {
    let entries = std::fs::read_dir(dir).map_err(DotfileError::io("reading directory", dir))?;
    for entry in entries {
        let entry = entry.map_err(DotfileError::io("reading entry in", dir))?;
        if !removed.contains(&entry.path()) {
            return Ok(false);
        }
    }
    Ok(true)
}

fn walk_error(err: walkdir::Error, root: &Path) -> DotfileError {
    let path = err.path().unwrap_or(root).to_path_buf();
    DotfileError::io("walking", &path)(err.into())
}
