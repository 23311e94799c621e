//! sync::puller
//!
//! Make sure a working copy exists and put the chosen branch exactly at
//! the remote tip.
//!
//! # Algorithm
//!
//! 1. Resolve the branch from `--branch` or the numbered menu
//! 2. Find or create the repository (clone, add missing remote), then fetch
//! 3. `git checkout -B <b> <remote>/<b>` and `git pull --ff-only <remote> <b>`
//!
//! The branch is chosen before any network access, so a bad choice never
//! clones anything. No process-wide `chdir` happens; the directory the
//! branch was synced in is returned instead.

use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use super::{SyncError, SyncSettings};
use crate::core::types::{BranchMenu, BranchName};
use crate::git::Git;
use crate::process::CommandRunner;
use crate::ui::output::{self, Verbosity};
use crate::ui::prompts;

/// Result of a successful pull.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullReport {
    /// Where the working copy lives.
    pub repo_dir: PathBuf,
    pub branch: BranchName,
    /// Commit the branch now points at.
    pub head: String,
}

/// Runs the pull workflow.
pub struct Puller<'a> {
    runner: &'a dyn CommandRunner,
    settings: SyncSettings,
    verbosity: Verbosity,
}

impl<'a> Puller<'a> {
    pub fn new(runner: &'a dyn CommandRunner, settings: SyncSettings) -> Self {
        Self {
            runner,
            settings,
            verbosity: Verbosity::Normal,
        }
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Full workflow: choose, ensure the repository, sync.
    ///
    /// `choice` is a menu token or branch name; without it the menu is shown
    /// on `writer` and one line is read from `reader`.
    pub fn run<R: BufRead, W: Write>(
        &self,
        workdir: &Path,
        choice: Option<&str>,
        reader: &mut R,
        writer: &mut W,
    ) -> Result<PullReport, SyncError> {
        let branch = match choice {
            Some(choice) => resolve_choice(&self.settings.menu, choice)?,
            None => select_branch(&self.settings.menu, reader, writer)?,
        };

        let repo_dir = self.ensure_repository(workdir)?;
        let head = self.sync_branch(&repo_dir, &branch)?;

        Ok(PullReport {
            repo_dir,
            branch,
            head,
        })
    }

    /// Return the directory holding the working copy, creating it if needed.
    ///
    /// Always finishes with `git fetch --prune <remote>`.
    pub fn ensure_repository(&self, workdir: &Path) -> Result<PathBuf, SyncError> {
        let git = Git::new(self.runner, workdir);
        let url = self.settings.remote_url.as_str();
        let remote = self.settings.remote.as_str();

        let repo_dir = if git.has_git_dir() {
            workdir.to_path_buf()
        } else if is_empty_dir(workdir)? {
            output::info(
                "No .git directory found. Cloning the repository here...",
                self.verbosity,
            );
            git.clone_into(url, ".")
                .map_err(|source| SyncError::CloneFailed {
                    url: url.to_string(),
                    source,
                })?;
            workdir.to_path_buf()
        } else {
            let clone_dir = workdir.join(&self.settings.clone_dir);
            if git.at(&clone_dir).has_git_dir() {
                output::info(
                    format!("Using existing clone in '{}'.", self.settings.clone_dir),
                    self.verbosity,
                );
            } else {
                output::warn(
                    format!(
                        "Current folder is not empty. Cloning into '{}' instead.",
                        self.settings.clone_dir
                    ),
                    self.verbosity,
                );
                git.clone_into(url, &self.settings.clone_dir)
                    .map_err(|source| SyncError::CloneFailed {
                        url: url.to_string(),
                        source,
                    })?;
            }
            clone_dir
        };

        let git = git.at(&repo_dir);
        if !git.has_remote(remote)? {
            output::info(format!("Adding remote '{remote}' -> {url}"), self.verbosity);
            git.add_remote(remote, url)
                .map_err(|source| SyncError::FetchFailed {
                    remote: remote.to_string(),
                    source,
                })?;
        }

        git.fetch(remote, true)
            .map_err(|source| SyncError::FetchFailed {
                remote: remote.to_string(),
                source,
            })?;

        tracing::debug!(repo = %repo_dir.display(), "repository ready");
        Ok(repo_dir)
    }

    /// Force `branch` to the remote tip, then fast-forward pull.
    ///
    /// Returns the commit the branch points at afterwards.
    pub fn sync_branch(&self, repo_dir: &Path, branch: &BranchName) -> Result<String, SyncError> {
        let git = Git::new(self.runner, repo_dir);
        let remote = self.settings.remote.as_str();
        let failed = |source| SyncError::SyncFailed {
            branch: branch.clone(),
            source,
        };

        git.checkout_reset(branch, &branch.on_remote(remote))
            .map_err(failed)?;
        git.pull_ff_only(remote, branch).map_err(failed)?;
        let head = git.head_oid()?;

        output::success(
            format!("Branch '{branch}' is now up to date with {remote}/{branch}."),
            self.verbosity,
        );
        Ok(head)
    }
}

fn is_empty_dir(dir: &Path) -> Result<bool, SyncError> {
    let mut entries = fs::read_dir(dir).map_err(|source| SyncError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    Ok(entries.next().is_none())
}

fn resolve_choice(menu: &BranchMenu, choice: &str) -> Result<BranchName, SyncError> {
    menu.resolve(choice)
        .cloned()
        .map_err(|_| SyncError::InvalidSelection {
            token: choice.trim().to_string(),
            choices: menu.len(),
        })
}

/// Print the numbered menu and read one selector token.
pub fn select_branch<R: BufRead, W: Write>(
    menu: &BranchMenu,
    reader: &mut R,
    writer: &mut W,
) -> Result<BranchName, SyncError> {
    writeln!(writer, "Select a branch to pull from:").map_err(prompts::PromptError::from)?;
    for (token, branch) in menu.entries() {
        writeln!(writer, " {token}. {branch}").map_err(prompts::PromptError::from)?;
    }

    let answer = prompts::input(
        reader,
        writer,
        &format!("Enter number (1-{})", menu.len()),
        None,
    )?;
    menu.select(&answer)
        .cloned()
        .map_err(|_| SyncError::InvalidSelection {
            token: answer,
            choices: menu.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::mock::{MockResponse, MockRunner};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn settings() -> SyncSettings {
        SyncSettings {
            remote_url: "https://example.com/team/app.git".to_string(),
            ..SyncSettings::default()
        }
    }

    fn puller(runner: &MockRunner) -> Puller<'_> {
        Puller::new(runner, settings()).with_verbosity(Verbosity::Quiet)
    }

    mod selection {
        use super::*;

        #[test]
        fn menu_lists_branches_in_order() {
            let menu = settings().menu;
            let mut out = Vec::new();
            let branch = select_branch(&menu, &mut Cursor::new("3\n"), &mut out).unwrap();

            assert_eq!(branch.as_str(), "marvin");
            let shown = String::from_utf8(out).unwrap();
            assert!(shown.starts_with(
                "Select a branch to pull from:\n 1. main\n 2. michael\n 3. marvin\n 4. saksham\n"
            ));
            assert!(shown.ends_with("Enter number (1-4): "));
        }

        #[test]
        fn unknown_token_is_invalid() {
            let menu = settings().menu;
            for input in ["5\n", "0\n", "main\n", "\n"] {
                let err = select_branch(&menu, &mut Cursor::new(input), &mut Vec::new())
                    .unwrap_err();
                assert!(matches!(err, SyncError::InvalidSelection { choices: 4, .. }));
            }
        }

        #[test]
        fn closed_stdin_is_cancelled() {
            let menu = settings().menu;
            let err = select_branch(&menu, &mut Cursor::new(""), &mut Vec::new()).unwrap_err();
            assert!(matches!(err, SyncError::Prompt(_)));
        }

        #[test]
        fn invalid_flag_choice_runs_nothing() {
            let temp = TempDir::new().unwrap();
            let runner = MockRunner::new();
            let err = puller(&runner)
                .run(temp.path(), Some("9"), &mut Cursor::new(""), &mut Vec::new())
                .unwrap_err();

            assert!(matches!(err, SyncError::InvalidSelection { .. }));
            assert!(runner.calls().is_empty());
        }

        #[test]
        fn flag_accepts_token_or_name() {
            let menu = settings().menu;
            assert_eq!(resolve_choice(&menu, "2").unwrap().as_str(), "michael");
            assert_eq!(resolve_choice(&menu, "saksham").unwrap().as_str(), "saksham");
            assert!(resolve_choice(&menu, "feature/x").is_err());
        }
    }

    mod repository {
        use super::*;

        #[test]
        fn empty_dir_clones_in_place() {
            let temp = TempDir::new().unwrap();
            let runner = MockRunner::new();

            let dir = puller(&runner).ensure_repository(temp.path()).unwrap();

            assert_eq!(dir, temp.path());
            assert_eq!(
                runner.command_lines(),
                [
                    "git clone https://example.com/team/app.git .",
                    "git remote get-url origin",
                    "git fetch --prune origin",
                ]
            );
        }

        #[test]
        fn non_empty_dir_clones_into_subdirectory() {
            let temp = TempDir::new().unwrap();
            fs::write(temp.path().join("notes.txt"), "hi").unwrap();
            let runner = MockRunner::new();

            let dir = puller(&runner).ensure_repository(temp.path()).unwrap();

            assert_eq!(dir, temp.path().join("repo_clone"));
            assert_eq!(
                runner.command_lines()[0],
                "git clone https://example.com/team/app.git repo_clone"
            );
            let fetch = runner.calls().pop().unwrap();
            assert_eq!(fetch.cwd(), Some(temp.path().join("repo_clone").as_path()));
        }

        #[test]
        fn existing_clone_subdirectory_is_reused() {
            let temp = TempDir::new().unwrap();
            fs::create_dir_all(temp.path().join("repo_clone/.git")).unwrap();
            let runner = MockRunner::new();

            let dir = puller(&runner).ensure_repository(temp.path()).unwrap();

            assert_eq!(dir, temp.path().join("repo_clone"));
            assert_eq!(runner.count("git clone"), 0);
        }

        #[test]
        fn missing_remote_is_added() {
            let temp = TempDir::new().unwrap();
            fs::create_dir(temp.path().join(".git")).unwrap();
            let runner =
                MockRunner::new().on("remote get-url", MockResponse::fail(2, "No such remote"));

            puller(&runner).ensure_repository(temp.path()).unwrap();

            assert_eq!(
                runner.command_lines(),
                [
                    "git remote get-url origin",
                    "git remote add origin https://example.com/team/app.git",
                    "git fetch --prune origin",
                ]
            );
        }

        #[test]
        fn clone_failure_is_fatal_with_hint() {
            let temp = TempDir::new().unwrap();
            let runner = MockRunner::new()
                .on("git clone", MockResponse::fail(128, "could not resolve host"));

            let err = puller(&runner).ensure_repository(temp.path()).unwrap_err();

            assert!(matches!(err, SyncError::CloneFailed { .. }));
            assert!(err.hint().is_some());
            assert_eq!(runner.count("fetch"), 0);
        }

        #[test]
        fn fetch_failure_is_fatal() {
            let temp = TempDir::new().unwrap();
            fs::create_dir(temp.path().join(".git")).unwrap();
            let runner = MockRunner::new().on("git fetch", MockResponse::fail(128, "offline"));

            let err = puller(&runner).ensure_repository(temp.path()).unwrap_err();
            assert!(matches!(err, SyncError::FetchFailed { .. }));
        }
    }

    mod branch_sync {
        use super::*;

        #[test]
        fn force_reset_then_ff_only_pull() {
            let runner = MockRunner::new()
                .on("rev-parse --verify HEAD", MockResponse::stdout("abc123\n"));
            let branch = BranchName::new("michael").unwrap();

            let head = puller(&runner).sync_branch(Path::new("/repo"), &branch).unwrap();

            assert_eq!(head, "abc123");
            assert_eq!(
                runner.command_lines(),
                [
                    "git checkout -B michael origin/michael",
                    "git pull --ff-only origin michael",
                    "git rev-parse --verify HEAD",
                ]
            );
        }

        #[test]
        fn missing_remote_branch_fails_without_pull() {
            let runner = MockRunner::new().on(
                "checkout -B",
                MockResponse::fail(128, "fatal: 'origin/saksham' is not a commit"),
            );
            let branch = BranchName::new("saksham").unwrap();

            let err = puller(&runner)
                .sync_branch(Path::new("/repo"), &branch)
                .unwrap_err();

            assert!(matches!(err, SyncError::SyncFailed { .. }));
            assert_eq!(runner.count("pull"), 0);
        }
    }
}
