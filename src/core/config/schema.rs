//! core::config::schema
//!
//! Configuration schema types.
//!
//! The same schema is used for the global file and the project file; the
//! [`super::Config`] accessors decide which scope wins.
//!
//! # Validation
//!
//! Unknown keys are rejected at parse time. Branch names are validated while
//! deserializing; the remaining checks run in [`ConfigFile::validate`].

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::BranchName;

/// Upper bound for `ready_timeout_secs` and `poll_interval_secs` (one day).
pub const MAX_WAIT_SECS: u64 = 24 * 60 * 60;

/// A single devkit configuration file.
///
/// # Example
///
/// ```toml
/// [environment]
/// project = "sep"
/// service = "web"
/// container_port = 8000
///
/// [sync]
/// remote_url = "https://example.com/team/project.git"
/// branches = ["main", "alice", "bob"]
/// protected = ["main", "master"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Compose stack settings used by `devenv`
    pub environment: Option<EnvironmentConfig>,

    /// Repository settings used by `repo-pull` and `repo-push`
    pub sync: Option<SyncConfig>,
}

impl ConfigFile {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(env) = &self.environment {
            env.validate()?;
        }
        if let Some(sync) = &self.sync {
            sync.validate()?;
        }
        Ok(())
    }
}

/// `[environment]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EnvironmentConfig {
    /// Compose descriptor candidates, relative to the project root, in lookup order
    pub compose_candidates: Option<Vec<String>>,

    /// Compose project name (`-p`)
    pub project: Option<String>,

    /// Service whose published port is opened in the browser
    pub service: Option<String>,

    /// Container-side port published by `service`
    pub container_port: Option<u16>,

    /// URL used when the published port cannot be queried
    pub default_url: Option<String>,

    /// Upper bound on waiting for the app to answer HTTP
    pub ready_timeout_secs: Option<u64>,

    /// Delay between readiness checks
    pub poll_interval_secs: Option<u64>,

    /// Pass `--remove-orphans` to `down`
    pub remove_orphans: Option<bool>,

    /// Open the app in the default browser after start
    pub open_browser: Option<bool>,
}

impl EnvironmentConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(candidates) = &self.compose_candidates {
            if candidates.is_empty() || candidates.iter().any(|c| c.trim().is_empty()) {
                return Err(ConfigError::InvalidValue(
                    "compose_candidates must list at least one non-empty path".to_string(),
                ));
            }
        }
        non_empty("project", self.project.as_deref())?;
        non_empty("service", self.service.as_deref())?;
        if self.container_port == Some(0) {
            return Err(ConfigError::InvalidValue(
                "container_port cannot be 0".to_string(),
            ));
        }
        if let Some(url) = &self.default_url {
            if !url.starts_with("http://") {
                return Err(ConfigError::InvalidValue(format!(
                    "default_url '{url}' must start with http:// (https is not supported)"
                )));
            }
        }
        if self.poll_interval_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "poll_interval_secs must be at least 1".to_string(),
            ));
        }
        at_most_a_day("ready_timeout_secs", self.ready_timeout_secs)?;
        at_most_a_day("poll_interval_secs", self.poll_interval_secs)?;
        Ok(())
    }
}

/// `[sync]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Remote name (default: "origin")
    pub remote: Option<String>,

    /// URL cloned by `repo-pull` and added as the remote when missing
    pub remote_url: Option<String>,

    /// Subdirectory used when cloning next to existing files
    pub clone_dir: Option<String>,

    /// Branch menu, in the order shown to the user
    pub branches: Option<Vec<BranchName>>,

    /// Branches `repo-push` refuses without `--allow-protected`
    pub protected: Option<Vec<BranchName>>,
}

impl SyncConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_empty("remote", self.remote.as_deref())?;
        non_empty("remote_url", self.remote_url.as_deref())?;
        non_empty("clone_dir", self.clone_dir.as_deref())?;
        if let Some(dir) = &self.clone_dir {
            if dir.contains("..") || dir.starts_with('/') {
                return Err(ConfigError::InvalidValue(format!(
                    "clone_dir '{dir}' must be a plain relative directory name"
                )));
            }
        }
        if matches!(&self.branches, Some(b) if b.is_empty()) {
            return Err(ConfigError::InvalidValue(
                "branches cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn at_most_a_day(key: &str, value: Option<u64>) -> Result<(), ConfigError> {
    match value {
        Some(secs) if secs > MAX_WAIT_SECS => Err(ConfigError::InvalidValue(format!(
            "{key} must be at most {MAX_WAIT_SECS}"
        ))),
        _ => Ok(()),
    }
}

fn non_empty(key: &str, value: Option<&str>) -> Result<(), ConfigError> {
    match value {
        Some(v) if v.trim().is_empty() => Err(ConfigError::InvalidValue(format!(
            "{key} cannot be empty"
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod environment_config {
        use super::*;

        #[test]
        fn defaults_are_valid() {
            assert!(EnvironmentConfig::default().validate().is_ok());
        }

        #[test]
        fn zero_port_rejected() {
            let config = EnvironmentConfig {
                container_port: Some(0),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn zero_poll_interval_rejected() {
            let config = EnvironmentConfig {
                poll_interval_secs: Some(0),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn empty_candidates_rejected() {
            let config = EnvironmentConfig {
                compose_candidates: Some(vec![]),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn non_http_url_rejected() {
            let config = EnvironmentConfig {
                default_url: Some("127.0.0.1:8000".to_string()),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn https_url_rejected() {
            let config = EnvironmentConfig {
                default_url: Some("https://127.0.0.1:8443".to_string()),
                ..Default::default()
            };
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("https is not supported"));

            let config = EnvironmentConfig {
                default_url: Some("http://127.0.0.1:8000".to_string()),
                ..Default::default()
            };
            assert!(config.validate().is_ok());
        }

        #[test]
        fn waits_longer_than_a_day_rejected() {
            for secs in [MAX_WAIT_SECS + 1, i64::MAX as u64, u64::MAX] {
                let timeout = EnvironmentConfig {
                    ready_timeout_secs: Some(secs),
                    ..Default::default()
                };
                assert!(timeout.validate().is_err(), "ready_timeout_secs = {secs}");

                let interval = EnvironmentConfig {
                    poll_interval_secs: Some(secs),
                    ..Default::default()
                };
                assert!(interval.validate().is_err(), "poll_interval_secs = {secs}");
            }

            let config = EnvironmentConfig {
                ready_timeout_secs: Some(MAX_WAIT_SECS),
                poll_interval_secs: Some(MAX_WAIT_SECS),
                ..Default::default()
            };
            assert!(config.validate().is_ok());
        }
    }

    mod sync_config {
        use super::*;

        #[test]
        fn parses_branch_lists() {
            let config: SyncConfig = toml::from_str(
                r#"
                branches = ["main", "alice"]
                protected = ["main"]
                "#,
            )
            .unwrap();
            assert_eq!(config.branches.as_ref().map(Vec::len), Some(2));
            assert!(config.validate().is_ok());
        }

        #[test]
        fn invalid_branch_rejected_at_parse() {
            let result: Result<SyncConfig, _> = toml::from_str(r#"branches = ["a b"]"#);
            assert!(result.is_err());
        }

        #[test]
        fn empty_remote_rejected() {
            let config = SyncConfig {
                remote: Some(" ".to_string()),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn escaping_clone_dir_rejected() {
            let config = SyncConfig {
                clone_dir: Some("../elsewhere".to_string()),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }
    }

    #[test]
    fn reject_unknown_fields() {
        let result: Result<ConfigFile, _> = toml::from_str(
            r#"
            [environment]
            project = "sep"
            colour = "blue"
            "#,
        );
        assert!(result.is_err());
    }
}
