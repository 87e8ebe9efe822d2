//! Configuration file support for debpin.
//!
//! debpin supports two configuration file locations:
//! - Global: `~/.debpin/config.toml` - User-wide defaults
//! - Project: `.debpin/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Rule kind whose rules are updated by default.
pub const DEFAULT_RULE_KIND: &str = "deb_packages";

/// Tag that exempts a rule from automatic updates.
pub const DEFAULT_MANUAL_TAG: &str = "manual_update";

/// debpin configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Network settings
    pub net: NetConfig,

    /// Trusted key settings
    pub keys: KeysConfig,

    /// Rule update settings
    pub update: UpdateConfig,
}

/// Network-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetConfig {
    /// HTTP timeout in seconds
    pub timeout_secs: Option<u64>,

    /// User agent sent to mirrors
    pub user_agent: Option<String>,
}

impl NetConfig {
    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("debpin/{}", env!("CARGO_PKG_VERSION")))
    }
}

/// Trusted key configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeysConfig {
    /// Directory relative key paths are resolved against (default: cwd)
    pub root: Option<PathBuf>,

    /// Armored public keys trusted in addition to `--pgp-key`
    #[serde(default)]
    pub paths: Vec<PathBuf>,
}

impl KeysConfig {
    /// Resolve key paths (configured ones first, then `extra`) against
    /// the key root, itself relative to `cwd`.
    pub fn resolve_paths(&self, cwd: &Path, extra: &[PathBuf]) -> Vec<PathBuf> {
        let root = match &self.root {
            Some(root) => cwd.join(root),
            None => cwd.to_path_buf(),
        };

        self.paths.iter().chain(extra).map(|p| root.join(p)).collect()
    }
}

/// Rule update configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateConfig {
    /// Kind of rule to update (array-of-tables name)
    pub rule_kind: Option<String>,

    /// Tag marking rules that must not be updated automatically
    pub manual_tag: Option<String>,
}

impl UpdateConfig {
    pub fn rule_kind(&self) -> &str {
        self.rule_kind.as_deref().unwrap_or(DEFAULT_RULE_KIND)
    }

    pub fn manual_tag(&self) -> &str {
        self.manual_tag.as_deref().unwrap_or(DEFAULT_MANUAL_TAG)
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        // Net settings
        if other.net.timeout_secs.is_some() {
            self.net.timeout_secs = other.net.timeout_secs;
        }
        if other.net.user_agent.is_some() {
            self.net.user_agent = other.net.user_agent;
        }

        // Key settings
        if other.keys.root.is_some() {
            self.keys.root = other.keys.root;
        }
        if !other.keys.paths.is_empty() {
            self.keys.paths = other.keys.paths;
        }

        // Update settings
        if other.update.rule_kind.is_some() {
            self.update.rule_kind = other.update.rule_kind;
        }
        if other.update.manual_tag.is_some() {
            self.update.manual_tag = other.update.manual_tag;
        }
    }
}

/// Get the global debpin config directory (~/.debpin).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".debpin"))
}

/// Get the global config path (~/.debpin/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.debpin/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".debpin").join("config.toml")
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.debpin/config.toml)
/// 2. Global config (~/.debpin/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    // Load global config first
    if let Some(global_path) = global_path {
        if global_path.exists() {
            config.merge(Config::load_or_default(global_path));
        }
    }

    // Project config overrides global
    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}
