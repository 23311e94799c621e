//! core::types
//!
//! Strong types for the values devkit passes between workflows.
//!
//! # Types
//!
//! - [`BranchName`] - Validated Git branch name
//! - [`BranchMenu`] - Fixed numeric menu of branches offered by the puller
//! - [`ProtectedBranches`] - Branch names the pusher refuses without override
//! - [`HostPort`] - Published address parsed from `docker compose port`
//!
//! # Validation
//!
//! These types enforce validity at construction time. The menu and the
//! protected set are built once from configuration and never mutated.
//!
//! # Examples
//!
//! ```
//! use devkit::core::types::{BranchName, HostPort};
//!
//! let branch = BranchName::new("alice/feature-x").unwrap();
//! assert_eq!(branch.as_str(), "alice/feature-x");
//! assert!(BranchName::new("invalid..name").is_err());
//!
//! let addr = HostPort::parse("0.0.0.0:8000").unwrap();
//! assert_eq!(addr.url(), "http://127.0.0.1:8000");
//! ```

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("invalid menu selection '{0}'")]
    InvalidSelection(String),

    #[error("invalid host:port '{0}'")]
    InvalidHostPort(String),
}

/// A validated Git branch name.
///
/// Follows `git check-ref-format --branch`: no empty names, no leading `.`
/// or `-`, no trailing `/` or `.lock`, no `..`, `@{`, `//`, whitespace,
/// control characters, or any of `~^:\?*[`, and not exactly `@`.
///
/// # Example
///
/// ```
/// use devkit::core::types::BranchName;
///
/// assert!(BranchName::new("feature/login").is_ok());
/// assert!(BranchName::new("").is_err());
/// assert!(BranchName::new(".hidden").is_err());
/// assert!(BranchName::new("has space").is_err());
/// assert!(BranchName::new("@").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Create a new validated branch name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidBranchName` if the name violates Git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if let Some(reason) = Self::violation(&name) {
            return Err(TypeError::InvalidBranchName(format!("'{name}': {reason}")));
        }
        Ok(Self(name))
    }

    fn violation(name: &str) -> Option<&'static str> {
        const FORBIDDEN: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];

        if name.is_empty() {
            return Some("cannot be empty");
        }
        if name == "@" {
            return Some("'@' is reserved");
        }
        if name.starts_with('-') {
            return Some("cannot start with '-'");
        }
        if name.ends_with('/') {
            return Some("cannot end with '/'");
        }
        if name.contains("..") || name.contains("@{") || name.contains("//") {
            return Some("cannot contain '..', '@{' or '//'");
        }
        if name
            .chars()
            .any(|c| c.is_ascii_control() || c.is_whitespace() || FORBIDDEN.contains(&c))
        {
            return Some("contains a character git does not allow");
        }
        if name
            .split('/')
            .any(|part| part.starts_with('.') || part.ends_with(".lock"))
        {
            return Some("path components cannot start with '.' or end with '.lock'");
        }
        None
    }

    /// Get the branch name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Remote-tracking form, e.g. `origin/main`.
    pub fn on_remote(&self, remote: &str) -> String {
        format!("{remote}/{}", self.0)
    }
}

impl TryFrom<String> for BranchName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<BranchName> for String {
    fn from(name: BranchName) -> Self {
        name.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The numbered branch menu shown by `repo-pull`.
///
/// Tokens are the 1-based positions rendered as strings (`"1"`, `"2"`, ...).
///
/// # Example
///
/// ```
/// use devkit::core::types::{BranchMenu, BranchName};
///
/// let menu = BranchMenu::new(vec![
///     BranchName::new("main").unwrap(),
///     BranchName::new("alice").unwrap(),
/// ]);
/// assert_eq!(menu.select("2").unwrap().as_str(), "alice");
/// assert!(menu.select("3").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchMenu {
    entries: Vec<BranchName>,
}

impl BranchMenu {
    pub fn new(entries: Vec<BranchName>) -> Self {
        Self { entries }
    }

    /// Resolve a selector token to its branch.
    ///
    /// The trimmed token must equal a rendered key exactly; `01` and `+1` are not keys.
    pub fn select(&self, token: &str) -> Result<&BranchName, TypeError> {
        let token = token.trim();
        self.entries()
            .find(|(key, _)| key == token)
            .map(|(_, branch)| branch)
            .ok_or_else(|| TypeError::InvalidSelection(token.to_string()))
    }

    /// Resolve either a selector token or a branch name listed in the menu.
    pub fn resolve(&self, token_or_name: &str) -> Result<&BranchName, TypeError> {
        self.select(token_or_name).or_else(|err| {
            self.entries
                .iter()
                .find(|b| b.as_str() == token_or_name.trim())
                .ok_or(err)
        })
    }

    /// `(token, branch)` pairs in display order.
    pub fn entries(&self) -> impl Iterator<Item = (String, &BranchName)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, b)| ((i + 1).to_string(), b))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Branch names that cannot be pushed to without `--allow-protected`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedBranches(BTreeSet<String>);

impl ProtectedBranches {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, branch: &BranchName) -> bool {
        self.0.contains(branch.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// A published `host:port` as printed by `docker compose port`.
///
/// Wildcard bind addresses are not browsable, so [`HostPort::display_host`]
/// maps them to the IPv4 loopback address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPort {
    host: String,
    port: u16,
}

impl HostPort {
    const LOOPBACK: &'static str = "127.0.0.1";

    /// Parse the first non-empty line of `docker compose port` output.
    ///
    /// Accepts `0.0.0.0:8000`, `[::]:8000`, `:::8000` and `localhost:8000`.
    pub fn parse(output: &str) -> Result<Self, TypeError> {
        let line = output
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .ok_or_else(|| TypeError::InvalidHostPort(output.trim().to_string()))?;
        let invalid = || TypeError::InvalidHostPort(line.to_string());

        let (host, port) = line.rsplit_once(':').ok_or_else(invalid)?;
        let port: u16 = port.parse().map_err(|_| invalid())?;
        if port == 0 {
            return Err(invalid());
        }
        let host = host.trim_start_matches('[').trim_end_matches(']');
        Ok(Self {
            host: host.to_string(),
            port,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Whether the host is an any-address bind (`0.0.0.0`, `::`, or empty).
    pub fn is_wildcard(&self) -> bool {
        matches!(self.host.as_str(), "" | "0.0.0.0" | "::" | ":")
    }

    /// Host to show the user and to open in a browser.
    pub fn display_host(&self) -> &str {
        if self.is_wildcard() {
            Self::LOOPBACK
        } else {
            &self.host
        }
    }

    /// `http://` URL for the normalized address.
    pub fn url(&self) -> String {
        let host = self.display_host();
        if host.contains(':') {
            format!("http://[{host}]:{}", self.port)
        } else {
            format!("http://{host}:{}", self.port)
        }
    }
}

impl fmt::Display for HostPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.display_host(), self.port)
    }
}
