//! process
//!
//! Single doorway to external commands.
//!
//! # Architecture
//!
//! Every subprocess devkit starts is described by an [`Invocation`] and run
//! through a [`CommandRunner`]. The production runner is [`SystemRunner`];
//! tests use [`mock::MockRunner`], which records every invocation and
//! replays scripted outcomes.
//!
//! # Privilege escalation
//!
//! Environment steps use [`run_escalated`]: the invocation runs once as-is,
//! and if it fails it runs exactly once more prefixed with `sudo`. Only when
//! both attempts fail is the step an error.
//!
//! # Invariants
//!
//! - A non-zero exit is an `Ok(Output)` with `success == false` from the
//!   runner; [`check`] and [`run_escalated`] turn it into an error.
//! - Environment variables on an invocation apply to that subprocess only.
//!
//! # Example
//!
//! ```ignore
//! use devkit::process::{run_escalated, Invocation, SystemRunner};
//!
//! let up = Invocation::new("docker")
//!     .args(["compose", "up", "-d", "--build"])
//!     .env("DOCKER_BUILDKIT", "0");
//! run_escalated(&SystemRunner, &up, |err| eprintln!("{err}; retrying with sudo"))?;
//! ```

pub mod mock;
mod runner;

pub use runner::SystemRunner;

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from running external commands.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The program could not be started at all.
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    /// The program ran and exited unsuccessfully.
    #[error("`{command}` failed ({})", exit_label(.code))]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Both the normal and the `sudo` attempt failed.
    #[error("`{command}` failed, and failed again with sudo: {second}")]
    EscalationFailed {
        command: String,
        first: Box<ProcessError>,
        second: Box<ProcessError>,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {code}"),
        None => "terminated by signal".to_string(),
    }
}

/// Privilege an invocation runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privilege {
    Normal,
    /// Prefixed with `sudo`
    Elevated,
}

/// How the subprocess' stdout/stderr are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Inherit the terminal; the user sees the tool's own output.
    Inherit,
    /// Capture stdout and stderr for parsing.
    Capture,
    /// Discard both streams.
    Silent,
}

/// A fully described external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
    env: Vec<(String, String)>,
    cwd: Option<PathBuf>,
    mode: OutputMode,
    privilege: Privilege,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            cwd: None,
            mode: OutputMode::Inherit,
            privilege: Privilege::Normal,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for this subprocess only.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn capture(mut self) -> Self {
        self.mode = OutputMode::Capture;
        self
    }

    pub fn silent(mut self) -> Self {
        self.mode = OutputMode::Silent;
        self
    }

    /// The same command, run through `sudo`.
    pub fn escalated(&self) -> Self {
        Self {
            privilege: Privilege::Elevated,
            ..self.clone()
        }
    }

    pub fn privilege(&self) -> Privilege {
        self.privilege
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn env_vars(&self) -> &[(String, String)] {
        &self.env
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// The argv actually executed, including the `sudo` prefix.
    ///
    /// `sudo` resets the environment, so variables set on the invocation are
    /// passed through with `--preserve-env`.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.args.len() + 3);
        if self.privilege == Privilege::Elevated {
            argv.push("sudo".to_string());
            if !self.env.is_empty() {
                let keys: Vec<&str> = self.env.iter().map(|(k, _)| k.as_str()).collect();
                argv.push(format!("--preserve-env={}", keys.join(",")));
            }
        }
        argv.push(self.program.clone());
        argv.extend(self.args.iter().cloned());
        argv
    }

    /// Shell-style rendering of [`Invocation::argv`] for messages and hints.
    pub fn command_line(&self) -> String {
        self.argv()
            .iter()
            .map(|a| shell_quote(a))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,@%+".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Result of a finished subprocess.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Output {
    pub success: bool,
    pub code: Option<i32>,
    /// Empty unless the invocation captured output.
    pub stdout: String,
    pub stderr: String,
}

impl Output {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Runs invocations. Implemented by [`SystemRunner`] and [`mock::MockRunner`].
pub trait CommandRunner {
    /// Run to completion.
    ///
    /// # Errors
    ///
    /// Returns `ProcessError::Spawn` only when the program could not be
    /// started; an unsuccessful exit is reported through [`Output::success`].
    fn run(&self, invocation: &Invocation) -> Result<Output, ProcessError>;

    /// Whether `program` resolves on `PATH`.
    fn is_available(&self, program: &str) -> bool;
}

/// Run and require a successful exit.
pub fn check(runner: &dyn CommandRunner, invocation: &Invocation) -> Result<Output, ProcessError> {
    let output = runner.run(invocation)?;
    if output.success {
        Ok(output)
    } else {
        Err(ProcessError::Failed {
            command: invocation.command_line(),
            code: output.code,
            stderr: output.stderr.trim().to_string(),
        })
    }
}

/// Which attempt of [`run_escalated`] succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Escalated {
    pub privilege: Privilege,
    pub output: Output,
}

/// Run `invocation`; if it fails, call `on_retry` and run it once more under `sudo`.
///
/// # Errors
///
/// Returns `ProcessError::EscalationFailed` carrying both failures when the
/// second attempt fails too.
pub fn run_escalated(
    runner: &dyn CommandRunner,
    invocation: &Invocation,
    on_retry: impl FnOnce(&ProcessError),
) -> Result<Escalated, ProcessError> {
    let first = match check(runner, invocation) {
        Ok(output) => {
            return Ok(Escalated {
                privilege: Privilege::Normal,
                output,
            })
        }
        Err(err) => err,
    };

    tracing::info!(command = %invocation, error = %first, "retrying with sudo");
    on_retry(&first);

    let elevated = invocation.escalated();
    match check(runner, &elevated) {
        Ok(output) => Ok(Escalated {
            privilege: Privilege::Elevated,
            output,
        }),
        Err(second) => Err(ProcessError::EscalationFailed {
            command: invocation.command_line(),
            first: Box::new(first),
            second: Box::new(second),
        }),
    }
}
