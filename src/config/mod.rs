//! Layered configuration.
//!
//! Settings are resolved once per invocation into an immutable [`Config`].
//! Later layers override earlier ones:
//!
//! 1. built-in defaults
//! 2. the global rc file (`~/.dotfilesrc`, or `--config`)
//! 3. the repository-local rc file (`<repository>/.dotfilesrc`)
//! 4. command-line flags
//!
//! Each rc file is INI with a `[dotfiles]` section and an optional
//! `[externals]` section mapping home-relative names to outside paths:
//!
//! ```ini
//! [dotfiles]
//! repository = ~/src/dotfiles
//! ignore = .git, .gitignore, README*, *~
//! dot = true
//! packages = config
//! link_style = relative
//! host = laptop
//!
//! [externals]
//! .lastpass = ~/Sync/lastpass
//! ```
pub mod ini;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use glob::Pattern;

use crate::error::ConfigError;
use crate::fs::LinkStyle;
use crate::logging::Log;
use crate::policy::PathPolicy;

/// Name of the rc file, both in the home directory and in the repository.
pub const RC_FILE: &str = ".dotfilesrc";

/// Section of the rc file holding settings.
const SECTION: &str = "dotfiles";

/// Section of the rc file holding externals.
const EXTERNALS: &str = "externals";

/// Patterns ignored when no layer sets `ignore`.
pub const DEFAULT_IGNORE: &[&str] = &[".git", ".gitignore", ".hg", "README*", "*~", RC_FILE];

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Repository root.
    pub repository: PathBuf,
    /// Home directory root.
    pub home: PathBuf,
    /// Repository-relative glob patterns excluded from management.
    pub ignore_patterns: Vec<Pattern>,
    /// Store files without their leading dot.
    pub remove_leading_dot: bool,
    /// Repository-relative package roots.
    pub packages: Vec<PathBuf>,
    /// How new symlinks store their destination.
    pub link_style: LinkStyle,
    /// Host directory to use in hosts mode; the machine's hostname by default.
    pub hostname: Option<String>,
    /// Home-relative names linked to paths outside the repository.
    pub externals: BTreeMap<PathBuf, PathBuf>,
}

/// Command-line settings, the highest-precedence layer.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Alternative global rc file.
    pub config_file: Option<PathBuf>,
    /// Repository root.
    pub repository: Option<PathBuf>,
    /// Home directory root.
    pub home: Option<PathBuf>,
    /// Ignore patterns; replaces the configured list when non-empty.
    pub ignore: Vec<String>,
    /// Leading-dot policy.
    pub remove_leading_dot: Option<bool>,
    /// Package roots; replaces the configured list when non-empty.
    pub packages: Vec<PathBuf>,
    /// Link style.
    pub link_style: Option<LinkStyle>,
    /// Host name used in hosts mode.
    pub hostname: Option<String>,
    /// Externals added on top of the configured ones.
    pub externals: BTreeMap<PathBuf, PathBuf>,
}

/// Settings contributed by a single layer; `None` leaves the value to lower
/// layers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Layer {
    repository: Option<PathBuf>,
    home: Option<PathBuf>,
    ignore: Option<Vec<String>>,
    dot: Option<bool>,
    packages: Option<Vec<PathBuf>>,
    link_style: Option<LinkStyle>,
    hostname: Option<String>,
    externals: BTreeMap<PathBuf, PathBuf>,
}

impl Layer {
    fn defaults(home: Option<&Path>) -> Self {
        Self {
            repository: home.map(|h| h.join("Dotfiles")),
            home: home.map(Path::to_path_buf),
            ignore: Some(DEFAULT_IGNORE.iter().map(|p| (*p).to_string()).collect()),
            dot: Some(true),
            packages: Some(Vec::new()),
            link_style: Some(LinkStyle::Relative),
            hostname: hostname::get().ok().and_then(|name| name.into_string().ok()),
            externals: BTreeMap::new(),
        }
    }

    fn from_overrides(overrides: &ConfigOverrides) -> Self {
        Self {
            repository: overrides.repository.clone(),
            home: overrides.home.clone(),
            ignore: (!overrides.ignore.is_empty()).then(|| overrides.ignore.clone()),
            dot: overrides.remove_leading_dot,
            packages: (!overrides.packages.is_empty()).then(|| overrides.packages.clone()),
            link_style: overrides.link_style,
            hostname: overrides.hostname.clone(),
            externals: overrides.externals.clone(),
        }
    }

    /// Read the `[dotfiles]` and `[externals]` sections of the rc file at
    /// `path`.
    fn from_file(path: &Path, log: &dyn Log) -> Result<Self, ConfigError> {
        let mut layer = Self::default();
        for section in ini::parse_kv_sections(path)? {
            if section.header == EXTERNALS {
                for (name, target) in &section.entries {
                    layer
                        .externals
                        .insert(PathBuf::from(name), expand_path(target));
                }
                continue;
            }
            if section.header != SECTION {
                log.warn(&format!(
                    "{}: ignoring unknown section [{}]",
                    path.display(),
                    section.header
                ));
                continue;
            }
            for (key, value) in &section.entries {
                match key.as_str() {
                    "repository" => layer.repository = Some(expand_path(value)),
                    "home" | "homedir" => layer.home = Some(expand_path(value)),
                    "ignore" => layer.ignore = Some(split_list(value)),
                    "dot" => layer.dot = Some(parse_bool(key, value)?),
                    "packages" => {
                        layer.packages = Some(split_list(value).into_iter().map(PathBuf::from).collect());
                    }
                    "link_style" => layer.link_style = Some(parse_link_style(key, value)?),
                    "host" | "hostname" => layer.hostname = Some(value.clone()),
                    _ => log.warn(&format!("{}: ignoring unknown key '{key}'", path.display())),
                }
            }
        }
        Ok(layer)
    }

    /// Apply `over` on top of `self`. Externals are merged by name.
    fn merge(self, over: Self) -> Self {
        let mut externals = self.externals;
        externals.extend(over.externals);
        Self {
            repository: over.repository.or(self.repository),
            home: over.home.or(self.home),
            ignore: over.ignore.or(self.ignore),
            dot: over.dot.or(self.dot),
            packages: over.packages.or(self.packages),
            link_style: over.link_style.or(self.link_style),
            hostname: over.hostname.or(self.hostname),
            externals,
        }
    }
}

impl Config {
    /// Resolve settings from defaults, rc files, and `overrides`.
    ///
    /// Missing rc files are skipped; warnings about unknown keys go to `log`.
    ///
    /// # Errors
    ///
    /// Returns an error if an rc file cannot be read or parsed, a value is
    /// invalid, or the home directory cannot be determined.
    pub fn load(overrides: &ConfigOverrides, log: &dyn Log) -> Result<Self, ConfigError> {
        let user_home = dirs::home_dir();
        let cli = Layer::from_overrides(overrides);

        let global_rc = overrides
            .config_file
            .clone()
            .or_else(|| user_home.as_ref().map(|h| h.join(RC_FILE)));
        let global = match global_rc {
            Some(path) => Layer::from_file(&path, log)?,
            None => Layer::default(),
        };
        let base = Layer::defaults(user_home.as_deref()).merge(global);

        let repository = cli
            .repository
            .clone()
            .or_else(|| base.repository.clone())
            .ok_or(ConfigError::NoHomeDirectory)?;
        let local = Layer::from_file(&repository.join(RC_FILE), log)?;

        Self::from_layer(base.merge(local).merge(cli))
    }

    fn from_layer(layer: Layer) -> Result<Self, ConfigError> {
        let home = layer.home.ok_or(ConfigError::NoHomeDirectory)?;
        let repository = layer.repository.ok_or(ConfigError::NoHomeDirectory)?;
        let ignore_patterns = layer
            .ignore
            .unwrap_or_default()
            .iter()
            .map(|raw| {
                Pattern::new(raw).map_err(|source| ConfigError::InvalidPattern {
                    pattern: raw.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            repository,
            home,
            ignore_patterns,
            remove_leading_dot: layer.dot.unwrap_or(true),
            packages: layer.packages.unwrap_or_default(),
            link_style: layer.link_style.unwrap_or_default(),
            hostname: layer.hostname.filter(|name| !name.is_empty()),
            externals: layer.externals,
        })
    }

    /// Path policy derived from these settings.
    #[must_use]
    pub fn policy(&self) -> PathPolicy {
        PathPolicy::new(
            self.remove_leading_dot,
            self.ignore_patterns.clone(),
            self.packages.clone(),
        )
    }
}

fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
            expected: "true or false",
        }),
    }
}

fn parse_link_style(key: &str, raw: &str) -> Result<LinkStyle, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "relative" => Ok(LinkStyle::Relative),
        "absolute" => Ok(LinkStyle::Absolute),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
            expected: "relative or absolute",
        }),
    }
}
