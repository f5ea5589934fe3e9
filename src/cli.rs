//! Command-line definitions.
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::Operation;
use crate::config::ConfigOverrides;
use crate::fs::LinkStyle;

/// Keep dotfiles in a repository and symlink them into the home directory.
#[derive(Parser, Debug)]
#[command(
    name = "dotfiles",
    about = "Keep dotfiles in a repository and symlink them into the home directory",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared across all subcommands.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Show what would change without touching the filesystem
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Repository location (default ~/Dotfiles)
    #[arg(short = 'R', long, global = true)]
    pub repository: Option<PathBuf>,

    /// Home directory to link into
    #[arg(short = 'H', long, global = true)]
    pub home: Option<PathBuf>,

    /// Global configuration file (default ~/.dotfilesrc)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Store files without their leading dot
    #[arg(long, global = true, conflicts_with = "no_dot")]
    pub dot: bool,

    /// Store files under the same name they have in the home directory
    #[arg(long = "no-dot", global = true)]
    pub no_dot: bool,

    /// Ignore pattern; replaces the configured list (repeatable)
    #[arg(short = 'i', long = "ignore", global = true)]
    pub ignore: Vec<String>,

    /// Package root inside the repository (repeatable)
    #[arg(short = 'P', long = "package", global = true)]
    pub packages: Vec<PathBuf>,

    /// Create absolute instead of relative symlinks
    #[arg(long, global = true)]
    pub absolute: bool,

    /// Host directory to use when the repository is split per host
    #[arg(long, global = true, value_name = "NAME")]
    pub host: Option<String>,

    /// Link a home path to a location outside the repository (repeatable)
    #[arg(
        short = 'E',
        long = "external",
        global = true,
        value_name = "NAME=PATH",
        value_parser = parse_external
    )]
    pub externals: Vec<(PathBuf, PathBuf)>,

    /// Do not ask before applying an operation to every dotfile
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,
}

fn parse_external(raw: &str) -> Result<(PathBuf, PathBuf), String> {
    let (name, target) = raw
        .split_once('=')
        .filter(|(name, target)| !name.is_empty() && !target.is_empty())
        .ok_or_else(|| format!("expected NAME=PATH, got '{raw}'"))?;
    Ok((
        PathBuf::from(name),
        PathBuf::from(shellexpand::tilde(target).into_owned()),
    ))
}

impl GlobalOpts {
    /// Settings given on the command line, as a configuration layer.
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        let remove_leading_dot = if self.dot {
            Some(true)
        } else if self.no_dot {
            Some(false)
        } else {
            None
        };
        ConfigOverrides {
            config_file: self.config.clone(),
            repository: self.repository.clone(),
            home: self.home.clone(),
            ignore: self.ignore.clone(),
            remove_leading_dot,
            packages: self.packages.clone(),
            link_style: self.absolute.then_some(LinkStyle::Absolute),
            hostname: self.host.clone(),
            externals: self.externals.iter().cloned().collect(),
        }
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Move files into the repository and link them back
    Add(FilesOpts),
    /// Move files out of the repository, replacing their links
    Remove(FilesOpts),
    /// Create links for files already in the repository
    Link(FilesOpts),
    /// Delete links, leaving the repository untouched
    Unlink(FilesOpts),
    /// Show dotfiles that are not correctly linked
    Status(StatusOpts),
    /// Link everything in the repository
    Sync(SyncOpts),
    /// Remove empty directories from the repository
    Prune,
    /// Move the repository and re-point its links
    Move(MoveOpts),
    /// Print version information
    Version,
}

impl Command {
    /// Name of the subcommand, used for the log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Add(_) => "add",
            Self::Remove(_) => "remove",
            Self::Link(_) => "link",
            Self::Unlink(_) => "unlink",
            Self::Status(_) => "status",
            Self::Sync(_) => "sync",
            Self::Prune => "prune",
            Self::Move(_) => "move",
            Self::Version => "version",
        }
    }

    /// The per-file operation and its arguments, for the four file commands.
    #[must_use]
    pub fn operation(&self) -> Option<(Operation, &[PathBuf])> {
        match self {
            Self::Add(opts) => Some((Operation::Add, &opts.files)),
            Self::Remove(opts) => Some((Operation::Remove, &opts.files)),
            Self::Link(opts) => Some((Operation::Link, &opts.files)),
            Self::Unlink(opts) => Some((Operation::Unlink, &opts.files)),
            _ => None,
        }
    }
}

/// Arguments of the per-file subcommands.
#[derive(Parser, Debug, Clone)]
pub struct FilesOpts {
    /// Files or directories; all dotfiles when omitted
    pub files: Vec<PathBuf>,
}

/// Options for the `status` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct StatusOpts {
    /// Include correctly linked dotfiles
    #[arg(short, long)]
    pub all: bool,

    /// Colour output by state
    #[arg(short, long)]
    pub color: bool,
}

/// Options for the `sync` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct SyncOpts {
    /// Replace conflicting files with links
    #[arg(short, long)]
    pub force: bool,
}

/// Options for the `move` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct MoveOpts {
    /// New repository location
    pub destination: PathBuf,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::path::Path;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_add_files() {
        let cli = Cli::parse_from(["dotfiles", "add", "~/.vimrc", "~/.bashrc"]);
        let (op, files) = cli.command.operation().expect("file command");
        assert_eq!(op, Operation::Add);
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn parse_link_without_files() {
        let cli = Cli::parse_from(["dotfiles", "link"]);
        let (op, files) = cli.command.operation().expect("file command");
        assert_eq!(op, Operation::Link);
        assert!(files.is_empty());
    }

    #[test]
    fn parse_dry_run_short_after_subcommand() {
        let cli = Cli::parse_from(["dotfiles", "unlink", "-d", "x"]);
        assert!(cli.global.dry_run);
    }

    #[test]
    fn parse_status_flags() {
        let cli = Cli::parse_from(["dotfiles", "status", "-a", "--color"]);
        assert!(matches!(
            cli.command,
            Command::Status(StatusOpts {
                all: true,
                color: true
            })
        ));
    }

    #[test]
    fn parse_sync_force() {
        let cli = Cli::parse_from(["dotfiles", "sync", "-f"]);
        assert!(matches!(cli.command, Command::Sync(SyncOpts { force: true })));
    }

    #[test]
    fn parse_move_destination() {
        let cli = Cli::parse_from(["dotfiles", "move", "/tmp/new"]);
        assert!(
            matches!(&cli.command, Command::Move(opts) if opts.destination == PathBuf::from("/tmp/new"))
        );
    }

    #[test]
    fn dot_flags_conflict() {
        assert!(Cli::try_parse_from(["dotfiles", "--dot", "--no-dot", "status"]).is_err());
    }

    #[test]
    fn overrides_map_flags() {
        let cli = Cli::parse_from([
            "dotfiles",
            "-R",
            "/r",
            "--no-dot",
            "-i",
            "*.swp",
            "-i",
            ".git",
            "--absolute",
            "status",
        ]);
        let overrides = cli.global.overrides();
        assert_eq!(overrides.repository, Some(PathBuf::from("/r")));
        assert_eq!(overrides.remove_leading_dot, Some(false));
        assert_eq!(overrides.ignore, vec!["*.swp", ".git"]);
        assert_eq!(overrides.link_style, Some(LinkStyle::Absolute));
    }

    #[test]
    fn overrides_leave_unset_values_to_config() {
        let cli = Cli::parse_from(["dotfiles", "prune"]);
        let overrides = cli.global.overrides();
        assert_eq!(overrides.remove_leading_dot, None);
        assert_eq!(overrides.link_style, None);
        assert_eq!(cli.command.name(), "prune");
    }

    #[test]
    fn host_and_externals_reach_the_overrides() {
        let cli = Cli::parse_from([
            "dotfiles",
            "--host",
            "laptop",
            "-E",
            ".lastpass=/tmp/lp",
            "sync",
        ]);
        let overrides = cli.global.overrides();
        assert_eq!(overrides.hostname.as_deref(), Some("laptop"));
        assert_eq!(
            overrides.externals.get(Path::new(".lastpass")),
            Some(&PathBuf::from("/tmp/lp"))
        );
    }

    #[test]
    fn external_needs_name_and_path() {
        assert!(Cli::try_parse_from(["dotfiles", "-E", ".lastpass", "sync"]).is_err());
        assert!(Cli::try_parse_from(["dotfiles", "-E", "=/tmp", "sync"]).is_err());
    }

    #[test]
    fn parse_version() {
        let cli = Cli::parse_from(["dotfiles", "version"]);
        assert!(matches!(cli.command, Command::Version));
    }
}
