//! sync
//!
//! Keeping a working copy in step with the shared remote.
//!
//! # Modules
//!
//! - [`puller`] - Clone or fetch, pick a branch from the menu, force it to the remote tip
//! - [`pusher`] - Guard protected branches, commit everything, optionally rebase, push
//!
//! # Invariants
//!
//! - The protected-branch guard runs before any checkout, stage, commit or push
//! - The puller never leaves local-only commits on the synced branch

pub mod puller;
pub mod pusher;

pub use puller::{PullReport, Puller};
pub use pusher::{BranchRequest, CommitOutcome, PushReport, PushRequest, Pusher, RebaseOutcome};

use std::path::PathBuf;

use thiserror::Error;

use crate::core::config::Config;
use crate::core::types::{BranchMenu, BranchName, ProtectedBranches, TypeError};
use crate::git::GitError;
use crate::ui::prompts::PromptError;

const NETWORK_HINT: &str = "check your network connection and your access to the remote";

/// Errors from the sync workflows.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("invalid choice '{token}'")]
    InvalidSelection { token: String, choices: usize },

    #[error("not inside a git repository: {path}")]
    NotARepository { path: PathBuf },

    #[error("no '{remote}' remote found")]
    MissingRemote { remote: String },

    #[error("branch '{branch}' is protected")]
    ProtectedBranch { branch: BranchName, user: String },

    #[error("failed to clone {url}")]
    CloneFailed {
        url: String,
        #[source]
        source: GitError,
    },

    #[error("failed to fetch from '{remote}'")]
    FetchFailed {
        remote: String,
        #[source]
        source: GitError,
    },

    #[error("failed to sync branch '{branch}'")]
    SyncFailed {
        branch: BranchName,
        #[source]
        source: GitError,
    },

    #[error("failed to switch to branch '{branch}'")]
    CheckoutFailed {
        branch: BranchName,
        #[source]
        source: GitError,
    },

    #[error("commit failed")]
    CommitFailed {
        #[source]
        source: GitError,
    },

    #[error("rebase onto {onto} had conflicts or failed")]
    RebaseFailed {
        onto: String,
        #[source]
        source: GitError,
    },

    #[error("push of '{branch}' failed")]
    PushFailed {
        branch: BranchName,
        #[source]
        source: GitError,
    },

    #[error(transparent)]
    InvalidBranch(#[from] TypeError),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl SyncError {
    /// What the user can do about it.
    pub fn hint(&self) -> Option<String> {
        match self {
            SyncError::InvalidSelection { choices, .. } => {
                Some(format!("enter a number from 1 to {choices}"))
            }
            SyncError::NotARepository { .. } => {
                Some("run inside a clone, or create one with repo-pull".to_string())
            }
            SyncError::MissingRemote { remote } => Some(format!("git remote add {remote} <URL>")),
            SyncError::ProtectedBranch { user, .. } => Some(format!(
                "use --branch <name> (e.g. '{user}/feature-x'), \
                 or pass --allow-protected if you really mean it"
            )),
            SyncError::CloneFailed { .. }
            | SyncError::FetchFailed { .. }
            | SyncError::SyncFailed { .. } => Some(NETWORK_HINT.to_string()),
            SyncError::PushFailed { .. } => {
                Some("check remote permissions and your connection".to_string())
            }
            SyncError::RebaseFailed { .. } => Some(
                "resolve the conflicts and run `git rebase --continue` (or `git rebase --abort`), \
                 then run repo-push again; or push without --pull"
                    .to_string(),
            ),
            SyncError::CommitFailed { .. } => Some(
                "a commit hook may have rejected the commit; see git's output above".to_string(),
            ),
            SyncError::CheckoutFailed { .. } => {
                Some("commit or stash conflicting local changes, then retry".to_string())
            }
            SyncError::InvalidBranch(_)
            | SyncError::Prompt(_)
            | SyncError::Git(_)
            | SyncError::Io { .. } => None,
        }
    }
}

/// Resolved sync settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    pub remote: String,
    pub remote_url: String,
    pub clone_dir: String,
    pub menu: BranchMenu,
    pub protected: ProtectedBranches,
}

impl SyncSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            remote: config.remote(),
            remote_url: config.remote_url(),
            clone_dir: config.clone_dir(),
            menu: config.branch_menu(),
            protected: config.protected_branches(),
        }
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings() {
        let settings = SyncSettings::default();
        assert_eq!(settings.remote, "origin");
        assert_eq!(settings.clone_dir, "repo_clone");
        assert_eq!(settings.menu.len(), 4);
    }

    #[test]
    fn hints_for_fatal_errors() {
        let err = SyncError::MissingRemote {
            remote: "origin".to_string(),
        };
        assert_eq!(err.hint().as_deref(), Some("git remote add origin <URL>"));

        let err = SyncError::InvalidSelection {
            token: "9".to_string(),
            choices: 4,
        };
        assert_eq!(err.to_string(), "invalid choice '9'");
        assert_eq!(err.hint().as_deref(), Some("enter a number from 1 to 4"));

        let err = SyncError::ProtectedBranch {
            branch: BranchName::new("main").unwrap(),
            user: "alice".to_string(),
        };
        assert!(err.hint().unwrap().contains("alice/feature-x"));
    }
}
