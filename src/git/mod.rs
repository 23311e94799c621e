//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. Every git argument vector
//! devkit runs is built by [`Git`], which executes it through a
//! [`CommandRunner`](crate::process::CommandRunner). Nothing outside this
//! module reads `.git` internals or spells out git subcommands.
//!
//! # Responsibilities
//!
//! - Work tree and branch detection
//! - Ref existence checks (local and remote-tracking)
//! - Remote configuration, clone, fetch, pull, push
//! - Checkout, staging, commit, rebase
//!
//! # Invariants
//!
//! - Branch arguments are [`BranchName`](crate::core::types::BranchName)s
//! - Queries answer with `bool`/`Option`; failures of mutations are errors
//!
//! # Example
//!
//! ```ignore
//! use devkit::git::Git;
//! use devkit::process::SystemRunner;
//!
//! let git = Git::new(&SystemRunner, ".");
//! git.fetch("origin", true)?;
//! let tip = git.rev_parse("origin/main")?;
//! ```

mod interface;

pub use interface::{Git, GitError};
