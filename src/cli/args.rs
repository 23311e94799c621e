//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on every binary and subcommand:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//! - `--config <file>`: Use this config file instead of the global one

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Flags shared by all three binaries.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Run as if started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use this config file instead of the global one
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// devenv - Start and stop the local application stack
#[derive(Parser, Debug)]
#[command(name = "devenv")]
#[command(author, version, about, long_about = None)]
pub struct EnvCli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Defaults to `start` when omitted
    #[command(subcommand)]
    pub command: Option<EnvCommand>,
}

/// `devenv` subcommands.
#[derive(Subcommand, Debug)]
pub enum EnvCommand {
    /// Build and start the stack, then open it in a browser
    #[command(
        name = "start",
        long_about = "Build and start the compose project in the background.\n\n\
            Looks for the compose file at the project root, then in the nested \
            location. Installs the container engine on Linux when it is missing. \
            Each compose step is retried once with sudo.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Start and open the browser
    devenv

    # Start without opening a browser
    devenv start --no-browser"
    )]
    Start {
        /// Do not open the application in a browser
        #[arg(long)]
        no_browser: bool,
    },

    /// Stop and remove the stack's containers
    Stop,

    /// Show the stack's containers
    Status,

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
WORKFLOW EXAMPLES:
    # Bash (add to ~/.bashrc)
    devenv completion bash >> ~/.bashrc

    # Fish
    devenv completion fish > ~/.config/fish/completions/devenv.fish"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// repo-pull - Bring a working copy up to date with a team branch
#[derive(Parser, Debug)]
#[command(name = "repo-pull")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
WORKFLOW EXAMPLES:
    # Pick a branch from the menu
    repo-pull

    # Skip the menu
    repo-pull --branch 2
    repo-pull --branch main")]
pub struct PullCli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Menu number or branch name; skips the menu
    #[arg(short, long, value_name = "CHOICE")]
    pub branch: Option<String>,

    #[command(subcommand)]
    pub command: Option<PullCommand>,
}

/// `repo-pull` subcommands.
#[derive(Subcommand, Debug)]
pub enum PullCommand {
    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// repo-push - Commit everything and push it to the shared remote
#[derive(Parser, Debug)]
#[command(name = "repo-push")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
WORKFLOW EXAMPLES:
    # Commit with a message and push the current branch
    repo-push fix login redirect

    # Rebase onto the remote branch first
    repo-push --pull update docs

    # Push to a named branch
    repo-push -b feature/search wip

    # Shell completions (bash, zsh, fish, power-shell)
    repo-push --completion bash >> ~/.bashrc")]
pub struct PushCli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Commit message words; a timestamped message is used when empty
    #[arg(value_name = "MESSAGE")]
    pub message: Vec<String>,

    /// Branch to push to (defaults to the current branch)
    #[arg(short, long, conflicts_with = "prompt")]
    pub branch: Option<String>,

    /// Allow pushing to a protected branch
    #[arg(long)]
    pub allow_protected: bool,

    /// Fetch and rebase onto the remote branch before pushing
    #[arg(long)]
    pub pull: bool,

    /// Ask for the branch name, defaulting to the current branch
    #[arg(long)]
    pub prompt: bool,

    /// Print a shell completion script and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completion: Option<Shell>,
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
