//! git::interface
//!
//! Typed wrapper over the `git` command line.
//!
//! # Error Handling
//!
//! Git failures are categorized into typed variants:
//! - [`GitError::NotARepo`]: Not inside a Git work tree
//! - [`GitError::Spawn`]: `git` itself could not be started
//! - [`GitError::CommandFailed`]: A git command exited unsuccessfully
//!
//! Queries whose "no" answer is a non-zero exit (`remote get-url`,
//! `show-ref --verify`, `diff --cached --quiet`, `@{u}`) return `bool`
//! instead of an error.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::types::{BranchName, TypeError};
use crate::process::{check, CommandRunner, Invocation, Output, ProcessError};

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git work tree.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The directory that was checked
        path: PathBuf,
    },

    /// The `git` executable could not be started.
    #[error("could not run git: {message}")]
    Spawn {
        /// Underlying spawn error
        message: String,
    },

    /// A git command ran and failed.
    #[error("`{command}` failed{}", stderr_suffix(.stderr))]
    CommandFailed {
        /// The rendered command line
        command: String,
        /// Exit code, if the process exited normally
        code: Option<i32>,
        /// Captured stderr (empty when output went to the terminal)
        stderr: String,
    },

    /// Git reported a name that is not a valid branch name.
    #[error(transparent)]
    InvalidName(#[from] TypeError),
}

fn stderr_suffix(stderr: &str) -> String {
    match stderr.lines().find(|l| !l.trim().is_empty()) {
        Some(line) => format!(": {}", line.trim()),
        None => String::new(),
    }
}

impl From<ProcessError> for GitError {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::Spawn { source, .. } => GitError::Spawn {
                message: source.to_string(),
            },
            ProcessError::Failed {
                command,
                code,
                stderr,
            } => GitError::CommandFailed {
                command,
                code,
                stderr,
            },
            ProcessError::EscalationFailed { command, second, .. } => GitError::CommandFailed {
                command,
                code: None,
                stderr: second.to_string(),
            },
        }
    }
}

/// The Git interface.
///
/// Every git argument vector in devkit is built here. Commands run in
/// `workdir` through the borrowed [`CommandRunner`].
///
/// # Example
///
/// ```ignore
/// use devkit::git::Git;
/// use devkit::process::SystemRunner;
///
/// let git = Git::new(&SystemRunner, ".");
/// if let Some(branch) = git.current_branch()? {
///     println!("on {branch}");
/// }
/// ```
pub struct Git<'a> {
    runner: &'a dyn CommandRunner,
    workdir: PathBuf,
}

impl std::fmt::Debug for Git<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("workdir", &self.workdir)
            .finish()
    }
}

impl<'a> Git<'a> {
    pub fn new(runner: &'a dyn CommandRunner, workdir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            workdir: workdir.into(),
        }
    }

    /// A wrapper for another directory sharing the same runner.
    pub fn at(&self, workdir: impl Into<PathBuf>) -> Git<'a> {
        Git::new(self.runner, workdir)
    }

    fn git<I, S>(&self, args: I) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Invocation::new("git")
            .args(args)
            .current_dir(&self.workdir)
    }

    /// Run with captured output; the caller interprets the exit status.
    fn query<I, S>(&self, args: I) -> Result<Output, GitError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(self.runner.run(&self.git(args).capture())?)
    }

    /// Run with captured output and return trimmed stdout.
    fn read<I, S>(&self, args: I) -> Result<String, GitError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let output = check(self.runner, &self.git(args).capture())?;
        Ok(output.stdout.trim().to_string())
    }

    /// Run with the terminal attached so the user sees git's own progress.
    fn run<I, S>(&self, args: I) -> Result<(), GitError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        check(self.runner, &self.git(args))?;
        Ok(())
    }

    // =========================================================================
    // Repository state
    // =========================================================================

    /// Whether `workdir` itself holds a `.git` entry.
    pub fn has_git_dir(&self) -> bool {
        self.workdir.join(".git").exists()
    }

    /// Whether `workdir` is anywhere inside a work tree.
    pub fn is_inside_work_tree(&self) -> Result<bool, GitError> {
        let out = self.query(["rev-parse", "--is-inside-work-tree"])?;
        Ok(out.success && out.stdout.trim() == "true")
    }

    /// Fail with [`GitError::NotARepo`] unless inside a work tree.
    pub fn require_work_tree(&self) -> Result<(), GitError> {
        if self.is_inside_work_tree()? {
            Ok(())
        } else {
            Err(GitError::NotARepo {
                path: self.workdir.clone(),
            })
        }
    }

    /// The checked-out branch, or `None` when HEAD is detached.
    ///
    /// An unborn branch (no commits yet) still reports its name.
    pub fn current_branch(&self) -> Result<Option<BranchName>, GitError> {
        let out = self.query(["rev-parse", "--abbrev-ref", "HEAD"])?;
        let name = if out.success {
            out.stdout.trim().to_string()
        } else {
            let sym = self.query(["symbolic-ref", "--quiet", "--short", "HEAD"])?;
            if !sym.success {
                return Ok(None);
            }
            sym.stdout.trim().to_string()
        };

        if name.is_empty() || name == "HEAD" {
            return Ok(None);
        }
        Ok(Some(BranchName::new(name)?))
    }

    /// Full object id of `rev`.
    pub fn rev_parse(&self, rev: &str) -> Result<String, GitError> {
        self.read(["rev-parse", "--verify", rev])
    }

    pub fn head_oid(&self) -> Result<String, GitError> {
        self.rev_parse("HEAD")
    }

    /// Whether the fully qualified `refname` exists.
    pub fn ref_exists(&self, refname: &str) -> Result<bool, GitError> {
        Ok(self.query(["show-ref", "--verify", "--quiet", refname])?.success)
    }

    pub fn local_branch_exists(&self, branch: &BranchName) -> Result<bool, GitError> {
        self.ref_exists(&format!("refs/heads/{branch}"))
    }

    /// Whether `refs/remotes/<remote>/<branch>` exists locally (after a fetch).
    pub fn remote_branch_exists(
        &self,
        remote: &str,
        branch: &BranchName,
    ) -> Result<bool, GitError> {
        self.ref_exists(&format!("refs/remotes/{remote}/{branch}"))
    }

    // =========================================================================
    // Remotes
    // =========================================================================

    pub fn has_remote(&self, name: &str) -> Result<bool, GitError> {
        Ok(self.query(["remote", "get-url", name])?.success)
    }

    pub fn add_remote(&self, name: &str, url: &str) -> Result<(), GitError> {
        self.read(["remote", "add", name, url]).map(drop)
    }

    /// `git clone <url> <dest>`, with `dest` relative to `workdir`.
    pub fn clone_into(&self, url: &str, dest: &str) -> Result<(), GitError> {
        self.run(["clone", url, dest])
    }

    pub fn fetch(&self, remote: &str, prune: bool) -> Result<(), GitError> {
        let mut args = vec!["fetch"];
        if prune {
            args.push("--prune");
        }
        args.push(remote);
        self.run(args)
    }

    pub fn pull_ff_only(&self, remote: &str, branch: &BranchName) -> Result<(), GitError> {
        self.run(["pull", "--ff-only", remote, branch.as_str()])
    }

    /// Whether the current branch has an upstream configured.
    pub fn has_upstream(&self) -> Result<bool, GitError> {
        Ok(self
            .query(["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{u}"])?
            .success)
    }

    /// `git push [-u] <remote> <branch>`.
    pub fn push(
        &self,
        remote: &str,
        branch: &BranchName,
        set_upstream: bool,
    ) -> Result<(), GitError> {
        let mut args = vec!["push"];
        if set_upstream {
            args.push("-u");
        }
        args.extend([remote, branch.as_str()]);
        self.run(args)
    }

    // =========================================================================
    // Branches
    // =========================================================================

    pub fn checkout(&self, branch: &BranchName) -> Result<(), GitError> {
        self.read(["checkout", branch.as_str()]).map(drop)
    }

    /// `git checkout -b <branch>` from the current HEAD.
    pub fn checkout_new(&self, branch: &BranchName) -> Result<(), GitError> {
        self.read(["checkout", "-b", branch.as_str()]).map(drop)
    }

    /// `git checkout -B <branch> <start>`: create or force-reset `branch` to `start`.
    pub fn checkout_reset(&self, branch: &BranchName, start: &str) -> Result<(), GitError> {
        self.read(["checkout", "-B", branch.as_str(), start]).map(drop)
    }

    pub fn rebase(&self, onto: &str) -> Result<(), GitError> {
        self.run(["rebase", onto])
    }

    // =========================================================================
    // Index and commits
    // =========================================================================

    pub fn add_all(&self) -> Result<(), GitError> {
        self.read(["add", "-A"]).map(drop)
    }

    /// Whether the index differs from HEAD.
    pub fn has_staged_changes(&self) -> Result<bool, GitError> {
        let inv = self.git(["diff", "--cached", "--quiet"]).capture();
        let out = self.runner.run(&inv)?;
        match out.code {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            code => Err(GitError::CommandFailed {
                command: inv.command_line(),
                code,
                stderr: out.stderr.trim().to_string(),
            }),
        }
    }

    pub fn commit(&self, message: &str) -> Result<(), GitError> {
        self.run(["commit", "-m", message])
    }
}
