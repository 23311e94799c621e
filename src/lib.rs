//! devkit - Developer environment helpers
//!
//! devkit drives `docker compose` and `git` so a team can bring its local
//! application stack up and down and keep working copies in step with a
//! shared remote. It ships three binaries: `devenv`, `repo-pull` and
//! `repo-push`.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to workflows)
//! - [`environment`] - Start/stop/status of the compose project
//! - [`sync`] - Puller and pusher workflows
//! - [`git`] - Single interface for all Git operations
//! - [`process`] - Single doorway to external commands, with sudo retry
//! - [`core`] - Domain types, naming helpers, configuration
//! - [`ui`] - User-facing output and prompts
//! - [`logging`] - Diagnostic logging setup
//!
//! # Correctness Invariants
//!
//! 1. Every subprocess is described by an `Invocation` and run through a `CommandRunner`
//! 2. Environment steps are retried at most once, under `sudo`
//! 3. Protected branches are refused before the repository is touched
//! 4. Every fatal error can name a command or action that fixes it

pub mod cli;
pub mod core;
pub mod environment;
pub mod git;
pub mod logging;
pub mod process;
pub mod sync;
pub mod ui;
