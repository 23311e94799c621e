//! sync::pusher
//!
//! Commit everything and push it to a non-protected branch.
//!
//! # Algorithm
//!
//! 1. Require a work tree and the configured remote
//! 2. Resolve the target: `--branch`, `--prompt`, the current branch, or a
//!    generated `<user>/<YYYY-MM-DD-HHMM>` when HEAD is detached
//! 3. Refuse protected targets unless overridden
//! 4. Switch to the target (creating it) if it is not checked out
//! 5. `git add -A`, then commit if anything is staged
//! 6. With `--pull`, fetch and rebase onto the remote branch if it exists
//! 7. Push, setting the upstream the first time
//!
//! Step 3 runs before anything that changes the repository.

use std::io::{BufRead, Write};
use std::path::Path;

use chrono::Local;

use super::{SyncError, SyncSettings};
use crate::core::naming;
use crate::core::types::BranchName;
use crate::git::{Git, GitError};
use crate::process::CommandRunner;
use crate::ui::output::{self, Verbosity};
use crate::ui::prompts;

/// How the target branch is chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchRequest {
    /// `--branch <name>`
    pub branch: Option<String>,
    /// `--prompt`: ask on stdin, defaulting to the current branch
    pub prompt: bool,
}

/// Everything `repo-push` was asked to do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushRequest {
    /// Positional words joined into the commit message.
    pub message: Vec<String>,
    pub target: BranchRequest,
    pub allow_protected: bool,
    /// Fetch and rebase before pushing.
    pub pull: bool,
}

/// The resolved push target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub branch: BranchName,
    /// Generated because HEAD was detached.
    pub generated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed { message: String },
    /// Nothing was staged after `git add -A`.
    NothingToCommit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebaseOutcome {
    NotRequested,
    /// The remote branch does not exist yet.
    Skipped,
    Rebased,
}

/// Result of a successful push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushReport {
    pub branch: BranchName,
    pub commit: CommitOutcome,
    pub rebase: RebaseOutcome,
    /// Whether `-u` was passed.
    pub set_upstream: bool,
}

/// Runs the push workflow.
pub struct Pusher<'a> {
    runner: &'a dyn CommandRunner,
    settings: SyncSettings,
    user: String,
    verbosity: Verbosity,
}

impl<'a> Pusher<'a> {
    pub fn new(runner: &'a dyn CommandRunner, settings: SyncSettings) -> Self {
        Self {
            runner,
            settings,
            user: naming::current_user(),
            verbosity: Verbosity::Normal,
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Full workflow in `workdir`. `reader`/`writer` serve `--prompt`.
    pub fn run<R: BufRead, W: Write>(
        &self,
        workdir: &Path,
        request: &PushRequest,
        reader: &mut R,
        writer: &mut W,
    ) -> Result<PushReport, SyncError> {
        let git = Git::new(self.runner, workdir);
        git.require_work_tree().map_err(|err| match err {
            GitError::NotARepo { path } => SyncError::NotARepository { path },
            other => SyncError::Git(other),
        })?;
        let remote = self.settings.remote.as_str();
        if !git.has_remote(remote)? {
            return Err(SyncError::MissingRemote {
                remote: remote.to_string(),
            });
        }

        let current = git.current_branch()?;
        let target =
            self.resolve_target_branch(&request.target, current.as_ref(), reader, writer)?;
        self.guard(&target.branch, request.allow_protected)?;

        if current.as_ref() != Some(&target.branch) {
            self.switch_to(&git, &target.branch)?;
            if target.generated {
                output::info(
                    format!("Detached HEAD: created and switched to '{}'.", target.branch),
                    self.verbosity,
                );
            }
        }

        let message = naming::message_from_words(&request.message)
            .unwrap_or_else(|| naming::auto_commit_message(&Local::now()));
        let commit = self.commit_all(&git, &message)?;

        let rebase = if request.pull {
            self.maybe_rebase(&git, &target.branch)?
        } else {
            RebaseOutcome::NotRequested
        };

        let set_upstream = self.push(&git, &target.branch)?;

        Ok(PushReport {
            branch: target.branch,
            commit,
            rebase,
            set_upstream,
        })
    }

    /// Decide which branch to push.
    ///
    /// `--branch` wins, then `--prompt`, then the current branch. A
    /// detached HEAD yields a generated personal branch.
    pub fn resolve_target_branch<R: BufRead, W: Write>(
        &self,
        request: &BranchRequest,
        current: Option<&BranchName>,
        reader: &mut R,
        writer: &mut W,
    ) -> Result<Target, SyncError> {
        if let Some(name) = &request.branch {
            return Ok(Target {
                branch: BranchName::new(name.trim())?,
                generated: false,
            });
        }

        if request.prompt {
            let answer = prompts::input(
                reader,
                writer,
                "Branch to push to",
                current.map(BranchName::as_str),
            )?;
            return Ok(Target {
                branch: BranchName::new(answer)?,
                generated: false,
            });
        }

        match current {
            Some(branch) => Ok(Target {
                branch: branch.clone(),
                generated: false,
            }),
            None => Ok(Target {
                branch: naming::personal_branch(&self.user, &Local::now())?,
                generated: true,
            }),
        }
    }

    /// Refuse protected targets unless `allow_protected`.
    pub fn guard(&self, target: &BranchName, allow_protected: bool) -> Result<(), SyncError> {
        if !self.settings.protected.contains(target) {
            return Ok(());
        }
        if allow_protected {
            output::warn(
                format!("Pushing to protected branch '{target}' (--allow-protected)."),
                self.verbosity,
            );
            return Ok(());
        }
        Err(SyncError::ProtectedBranch {
            branch: target.clone(),
            user: naming::slugify(&self.user),
        })
    }

    fn switch_to(&self, git: &Git<'_>, branch: &BranchName) -> Result<(), SyncError> {
        let result = if git.local_branch_exists(branch)? {
            git.checkout(branch)
        } else {
            git.checkout_new(branch)
        };
        result.map_err(|source| SyncError::CheckoutFailed {
            branch: branch.clone(),
            source,
        })
    }

    /// Stage everything and commit if anything is staged.
    pub fn commit_all(&self, git: &Git<'_>, message: &str) -> Result<CommitOutcome, SyncError> {
        let failed = |source| SyncError::CommitFailed { source };

        git.add_all().map_err(failed)?;
        if !git.has_staged_changes().map_err(failed)? {
            output::info("Nothing to commit (working tree clean).", self.verbosity);
            return Ok(CommitOutcome::NothingToCommit);
        }

        git.commit(message).map_err(failed)?;
        output::success(format!("Commit created: {message}"), self.verbosity);
        Ok(CommitOutcome::Committed {
            message: message.to_string(),
        })
    }

    /// Fetch, then rebase onto the remote branch if it exists.
    pub fn maybe_rebase(
        &self,
        git: &Git<'_>,
        target: &BranchName,
    ) -> Result<RebaseOutcome, SyncError> {
        let remote = self.settings.remote.as_str();
        git.fetch(remote, false)
            .map_err(|source| SyncError::FetchFailed {
                remote: remote.to_string(),
                source,
            })?;

        if !git.remote_branch_exists(remote, target)? {
            output::info(
                format!("{remote}/{target} does not exist yet; skipping rebase."),
                self.verbosity,
            );
            return Ok(RebaseOutcome::Skipped);
        }

        let onto = target.on_remote(remote);
        git.rebase(&onto)
            .map_err(|source| SyncError::RebaseFailed {
                onto: onto.clone(),
                source,
            })?;
        output::success(format!("Rebased onto {onto}"), self.verbosity);
        Ok(RebaseOutcome::Rebased)
    }

    /// Push `target`, with `-u` when no upstream is configured.
    ///
    /// Returns whether the upstream was set by this push.
    pub fn push(&self, git: &Git<'_>, target: &BranchName) -> Result<bool, SyncError> {
        let remote = self.settings.remote.as_str();
        let set_upstream = !git.has_upstream()?;
        git.push(remote, target, set_upstream)
            .map_err(|source| SyncError::PushFailed {
                branch: target.clone(),
                source,
            })?;
        output::success(format!("Pushed '{target}' to {remote}."), self.verbosity);
        Ok(set_upstream)
    }
}
