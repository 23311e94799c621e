//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Resolves the working directory and configuration
//! 2. Builds the workflow with the system runner
//! 3. Formats and displays the outcome
//!
//! Handlers do NOT spawn processes directly.

mod completion;
mod env;
mod pull;
mod push;

pub use completion::completion;
pub use env::{start, status, stop};
pub use pull::pull;
pub use push::push;

use anyhow::Result;

use super::args::{EnvCli, EnvCommand, PullCli, PullCommand, PushCli};
use super::Context;

/// Dispatch a `devenv` invocation; no subcommand means `start`.
pub fn dispatch_env(command: Option<EnvCommand>, ctx: &Context) -> Result<()> {
    match command.unwrap_or(EnvCommand::Start { no_browser: false }) {
        EnvCommand::Start { no_browser } => start(ctx, no_browser),
        EnvCommand::Stop => stop(ctx),
        EnvCommand::Status => status(ctx),
        EnvCommand::Completion { shell } => completion::<EnvCli>(shell),
    }
}

/// Dispatch a `repo-pull` invocation.
pub fn dispatch_pull(cli: PullCli, ctx: &Context) -> Result<()> {
    match cli.command {
        Some(PullCommand::Completion { shell }) => completion::<PullCli>(shell),
        None => pull(ctx, cli.branch.as_deref()),
    }
}

/// Dispatch a `repo-push` invocation.
///
/// Completion is a flag here so every positional word stays in the message.
pub fn dispatch_push(cli: PushCli, ctx: &Context) -> Result<()> {
    match cli.completion {
        Some(shell) => completion::<PushCli>(shell),
        None => push(ctx, push::request_from(&cli)),
    }
}
