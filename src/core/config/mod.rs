//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! devkit has two configuration scopes:
//! - **Global**: User-level settings
//! - **Project**: Settings checked in next to the compose file / repository
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Global config file
//! 3. Project config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! `--config <file>` replaces the search entirely. Otherwise, in order:
//! 1. `$DEVKIT_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/devkit/config.toml`
//! 3. `~/.devkit/config.toml`
//!
//! # Project Config Locations
//!
//! Only `<root>/.devkit.toml` is read.
//!
//! # Example
//!
//! ```no_run
//! use devkit::core::config::Config;
//! use std::path::Path;
//!
//! let config = Config::load(Some(Path::new(".")), None).unwrap();
//! println!("compose project: {}", config.project());
//! println!("remote: {}", config.remote());
//! ```

pub mod schema;

pub use schema::{ConfigFile, EnvironmentConfig, SyncConfig};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::core::types::{BranchMenu, BranchName, ProtectedBranches};

/// Built-in defaults.
pub mod defaults {
    pub const COMPOSE_CANDIDATES: &[&str] =
        &["Docker_Files/docker-compose.yml", "docker-compose.yml"];
    pub const PROJECT: &str = "sep";
    pub const SERVICE: &str = "web";
    pub const CONTAINER_PORT: u16 = 8000;
    pub const DEFAULT_URL: &str = "http://127.0.0.1:8000";
    pub const READY_TIMEOUT_SECS: u64 = 120;
    pub const POLL_INTERVAL_SECS: u64 = 1;
    pub const REMOTE: &str = "origin";
    pub const REMOTE_URL: &str = "https://github.com/mikeb2113/Software_Engineering_Project.git";
    pub const CLONE_DIR: &str = "repo_clone";
    pub const BRANCHES: &[&str] = &["main", "michael", "marvin", "saksham"];
    pub const PROTECTED: &[&str] = &["main", "master", "develop"];
}

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value in '{path}': {message}")]
    Invalid { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Merged configuration from all sources.
///
/// Accessors apply precedence automatically: project over global over
/// built-in defaults.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: ConfigFile,
    /// Project configuration (if present)
    pub project: Option<ConfigFile>,
}

impl Config {
    /// Load configuration.
    ///
    /// `root` is the directory searched for a project file. `explicit`, when
    /// given, is used instead of the global search and must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed,
    /// or validated. Missing files are not an error (defaults are used).
    pub fn load(root: Option<&Path>, explicit: Option<&Path>) -> Result<Config, ConfigError> {
        let (global, global_path) = match explicit {
            Some(path) => (Self::read_file(path)?, Some(path.to_path_buf())),
            None => Self::load_global()?,
        };

        let (project, project_path) = match root {
            Some(root) => Self::load_project(root)?,
            None => (None, None),
        };

        tracing::debug!(
            global = ?global_path,
            project = ?project_path,
            "configuration loaded"
        );

        Ok(Config { global, project })
    }

    fn load_global() -> Result<(ConfigFile, Option<PathBuf>), ConfigError> {
        let mut candidates = Vec::new();
        if let Ok(path) = std::env::var("DEVKIT_CONFIG") {
            candidates.push(PathBuf::from(path));
        }
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            candidates.push(PathBuf::from(xdg_home).join("devkit/config.toml"));
        }
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(".devkit/config.toml"));
        }

        for path in candidates {
            if path.exists() {
                let config = Self::read_file(&path)?;
                return Ok((config, Some(path)));
            }
        }
        Ok((ConfigFile::default(), None))
    }

    fn load_project(root: &Path) -> Result<(Option<ConfigFile>, Option<PathBuf>), ConfigError> {
        let path = Self::project_config_path(root);
        if !path.exists() {
            return Ok((None, None));
        }
        let config = Self::read_file(&path)?;
        Ok((Some(config), Some(path)))
    }

    fn read_file(path: &Path) -> Result<ConfigFile, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        config.validate().map_err(|e| ConfigError::Invalid {
            path: path.to_path_buf(),
            message: match e {
                ConfigError::InvalidValue(message) => message,
                other => other.to_string(),
            },
        })?;
        Ok(config)
    }

    /// Canonical project config path under `root`.
    pub fn project_config_path(root: &Path) -> PathBuf {
        root.join(".devkit.toml")
    }

    fn env_value<T>(&self, get: impl Fn(&EnvironmentConfig) -> Option<T>) -> Option<T> {
        self.project
            .as_ref()
            .and_then(|p| p.environment.as_ref())
            .and_then(&get)
            .or_else(|| self.global.environment.as_ref().and_then(&get))
    }

    fn sync_value<T>(&self, get: impl Fn(&SyncConfig) -> Option<T>) -> Option<T> {
        self.project
            .as_ref()
            .and_then(|p| p.sync.as_ref())
            .and_then(&get)
            .or_else(|| self.global.sync.as_ref().and_then(&get))
    }

    // =========================================================================
    // Environment accessors
    // =========================================================================

    /// Compose descriptor candidates relative to the project root.
    pub fn compose_candidates(&self) -> Vec<PathBuf> {
        self.env_value(|e| e.compose_candidates.clone())
            .map(|c| c.into_iter().map(PathBuf::from).collect())
            .unwrap_or_else(|| {
                defaults::COMPOSE_CANDIDATES
                    .iter()
                    .map(PathBuf::from)
                    .collect()
            })
    }

    /// Compose project name. Defaults to "sep".
    pub fn project(&self) -> String {
        self.env_value(|e| e.project.clone())
            .unwrap_or_else(|| defaults::PROJECT.to_string())
    }

    /// Service whose port is published. Defaults to "web".
    pub fn service(&self) -> String {
        self.env_value(|e| e.service.clone())
            .unwrap_or_else(|| defaults::SERVICE.to_string())
    }

    pub fn container_port(&self) -> u16 {
        self.env_value(|e| e.container_port)
            .unwrap_or(defaults::CONTAINER_PORT)
    }

    pub fn default_url(&self) -> String {
        self.env_value(|e| e.default_url.clone())
            .unwrap_or_else(|| defaults::DEFAULT_URL.to_string())
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(
            self.env_value(|e| e.ready_timeout_secs)
                .unwrap_or(defaults::READY_TIMEOUT_SECS),
        )
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(
            self.env_value(|e| e.poll_interval_secs)
                .unwrap_or(defaults::POLL_INTERVAL_SECS),
        )
    }

    /// Defaults to `true`.
    pub fn remove_orphans(&self) -> bool {
        self.env_value(|e| e.remove_orphans).unwrap_or(true)
    }

    /// Defaults to `true`.
    pub fn open_browser(&self) -> bool {
        self.env_value(|e| e.open_browser).unwrap_or(true)
    }

    // =========================================================================
    // Sync accessors
    // =========================================================================

    /// Remote name. Defaults to "origin".
    pub fn remote(&self) -> String {
        self.sync_value(|s| s.remote.clone())
            .unwrap_or_else(|| defaults::REMOTE.to_string())
    }

    pub fn remote_url(&self) -> String {
        self.sync_value(|s| s.remote_url.clone())
            .unwrap_or_else(|| defaults::REMOTE_URL.to_string())
    }

    pub fn clone_dir(&self) -> String {
        self.sync_value(|s| s.clone_dir.clone())
            .unwrap_or_else(|| defaults::CLONE_DIR.to_string())
    }

    /// The puller's branch menu.
    pub fn branch_menu(&self) -> BranchMenu {
        let branches = self
            .sync_value(|s| s.branches.clone())
            .unwrap_or_else(|| default_branches(defaults::BRANCHES));
        BranchMenu::new(branches)
    }

    /// The pusher's protected set.
    pub fn protected_branches(&self) -> ProtectedBranches {
        let branches = self
            .sync_value(|s| s.protected.clone())
            .unwrap_or_else(|| default_branches(defaults::PROTECTED));
        ProtectedBranches::new(branches.into_iter().map(String::from))
    }
}

fn default_branches(names: &[&str]) -> Vec<BranchName> {
    names
        .iter()
        .filter_map(|name| BranchName::new(*name).ok())
        .collect()
}
