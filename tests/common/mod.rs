// Shared helpers for integration tests.
//
// Provides a temporary home directory with a repository inside it, plus a
// fingerprint of both trees so tests can assert that nothing changed.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use dotfiles::config::{Config, ConfigOverrides};
use dotfiles::fs::LinkStyle;
use dotfiles::logging::BufferedLog;
use dotfiles::policy::PathPolicy;
use dotfiles::repository::Repository;
use sha2::{Digest, Sha256};

/// An isolated home directory backed by a [`tempfile::TempDir`].
///
/// The layout is `<tmp>/home` with the repository at `<tmp>/home/Dotfiles`.
/// Everything is deleted when the context is dropped.
pub struct TestContext {
    root: tempfile::TempDir,
    home: PathBuf,
}

impl TestContext {
    /// Create an empty home directory.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        let home = dunce::canonicalize(root.path())
            .expect("canonicalize temp dir")
            .join("home");
        std::fs::create_dir(&home).expect("create home");
        Self { root, home }
    }

    /// Home directory root.
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Default repository location.
    pub fn repo_path(&self) -> PathBuf {
        self.home.join("Dotfiles")
    }

    /// A path outside the home directory, inside the temp dir.
    pub fn outside(&self, rel: &str) -> PathBuf {
        self.root.path().join(rel)
    }

    /// Write `content` to `rel` below the home directory, creating parents.
    pub fn write_home(&self, rel: &str, content: &str) -> PathBuf {
        write(&self.home.join(rel), content)
    }

    /// Write `content` to `rel` below the repository, creating parents.
    pub fn write_repo(&self, rel: &str, content: &str) -> PathBuf {
        write(&self.repo_path().join(rel), content)
    }

    /// Open the repository with the given ignore patterns and dot policy.
    pub fn repository(&self, ignore: &[&str], remove_leading_dot: bool) -> Repository {
        let patterns = ignore
            .iter()
            .map(|p| glob::Pattern::new(p).expect("valid pattern"))
            .collect();
        Repository::open(
            &self.repo_path(),
            &self.home,
            PathPolicy::new(remove_leading_dot, patterns, Vec::new()),
            LinkStyle::Relative,
        )
        .expect("open repository")
    }

    /// Overrides pointing every layer at this context.
    ///
    /// The global rc file is `<home>/.dotfilesrc` so the user's real one is
    /// never read.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_file: Some(self.home.join(".dotfilesrc")),
            repository: Some(self.repo_path()),
            home: Some(self.home.clone()),
            ..ConfigOverrides::default()
        }
    }

    /// Resolve configuration for this context.
    pub fn load_config(&self, overrides: &ConfigOverrides) -> Config {
        Config::load(overrides, &BufferedLog::new()).expect("load config")
    }

    /// Digest of every path below the home directory, with file content or
    /// symlink destination.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for entry in walkdir::WalkDir::new(&self.home)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry.expect("walk home");
            let path = entry.path();
            hasher.update(path.to_string_lossy().as_bytes());
            let kind = entry.file_type();
            if kind.is_symlink() {
                let dest = std::fs::read_link(path).expect("read link");
                hasher.update(b"L");
                hasher.update(dest.to_string_lossy().as_bytes());
            } else if kind.is_file() {
                hasher.update(b"F");
                hasher.update(std::fs::read(path).expect("read file"));
            } else {
                hasher.update(b"D");
            }
        }
        hasher
            .finalize()
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect()
    }
}

fn write(path: &Path, content: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent");
    }
    std::fs::write(path, content).expect("write file");
    path.to_path_buf()
}
