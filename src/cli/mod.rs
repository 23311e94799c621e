//! cli
//!
//! Command-line interface layer for the devkit binaries.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Set up logging and load configuration
//! - Delegate to command handlers
//! - Report fatal errors as `error:` plus an optional `hint:`
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to the
//! [`crate::environment`] and [`crate::sync`] workflows, which do the work
//! through a [`crate::process::CommandRunner`].

pub mod args;
pub mod commands;

pub use args::{EnvCli, GlobalArgs, PullCli, PushCli, Shell};

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::Parser;

use crate::core::config::Config;
use crate::environment::EnvError;
use crate::logging;
use crate::sync::SyncError;
use crate::ui::output::{self, Verbosity};

/// Execution context built from the global flags.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Working directory override
    pub cwd: Option<PathBuf>,
    /// Debug mode enabled
    pub debug: bool,
    /// Quiet mode (minimal output)
    pub quiet: bool,
    /// Explicit config file
    pub config: Option<PathBuf>,
}

impl Context {
    pub fn from_global(global: &GlobalArgs) -> Self {
        Self {
            cwd: global.cwd.clone(),
            debug: global.debug,
            quiet: global.quiet,
            config: global.config.clone(),
        }
    }

    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }

    /// The directory commands operate in.
    pub fn workdir(&self) -> Result<PathBuf> {
        match &self.cwd {
            Some(dir) => {
                if !dir.is_dir() {
                    anyhow::bail!("--cwd '{}' is not a directory", dir.display());
                }
                Ok(dir.clone())
            }
            None => std::env::current_dir().context("cannot determine current directory"),
        }
    }

    /// Load configuration for `root`.
    pub fn load_config(&self, root: &Path) -> Result<Config> {
        Ok(Config::load(Some(root), self.config.as_deref())?)
    }
}

/// Entry point for `devenv`.
pub fn run_devenv() -> Result<()> {
    let cli = EnvCli::parse();
    logging::init(cli.global.debug);
    let ctx = Context::from_global(&cli.global);
    commands::dispatch_env(cli.command, &ctx)
}

/// Entry point for `repo-pull`.
pub fn run_pull() -> Result<()> {
    let cli = PullCli::parse();
    logging::init(cli.global.debug);
    let ctx = Context::from_global(&cli.global);
    commands::dispatch_pull(cli, &ctx)
}

/// Entry point for `repo-push`.
pub fn run_push() -> Result<()> {
    let cli = PushCli::parse();
    logging::init(cli.global.debug);
    let ctx = Context::from_global(&cli.global);
    commands::dispatch_push(cli, &ctx)
}

/// Turn a command result into the process exit code.
pub fn finish(result: Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

/// Print a fatal error and its hint to stderr.
pub fn report(err: &anyhow::Error) {
    output::error(err);
    for cause in err.chain().skip(1) {
        eprintln!("  caused by: {cause}");
    }
    if let Some(hint) = hint_for(err) {
        output::hint(hint);
    }
}

/// The remediation hint of the first typed error in the chain.
pub fn hint_for(err: &anyhow::Error) -> Option<String> {
    err.chain().find_map(|cause| {
        if let Some(env) = cause.downcast_ref::<EnvError>() {
            env.hint()
        } else {
            cause.downcast_ref::<SyncError>().and_then(SyncError::hint)
        }
    })
}
