//! process::runner
//!
//! The production [`CommandRunner`] backed by `std::process::Command`.

use std::process::{Command, Stdio};

use super::{CommandRunner, Invocation, Output, OutputMode, ProcessError};

/// Runs invocations as real subprocesses, blocking until they exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<Output, ProcessError> {
        let argv = invocation.argv();
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| ProcessError::Spawn {
                command: String::new(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
            })?;

        let mut command = Command::new(program);
        command.args(args);
        for (key, value) in invocation.env_vars() {
            command.env(key, value);
        }
        if let Some(dir) = invocation.cwd() {
            command.current_dir(dir);
        }

        tracing::debug!(
            command = %invocation,
            cwd = ?invocation.cwd(),
            privilege = ?invocation.privilege(),
            "spawn"
        );

        let spawn_error = |source: std::io::Error| ProcessError::Spawn {
            command: invocation.command_line(),
            source,
        };

        let output = match invocation.mode() {
            OutputMode::Inherit => {
                let status = command.status().map_err(spawn_error)?;
                Output {
                    success: status.success(),
                    code: status.code(),
                    ..Output::default()
                }
            }
            OutputMode::Silent => {
                let status = command
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .status()
                    .map_err(spawn_error)?;
                Output {
                    success: status.success(),
                    code: status.code(),
                    ..Output::default()
                }
            }
            OutputMode::Capture => {
                let out = command.stdin(Stdio::null()).output().map_err(spawn_error)?;
                Output {
                    success: out.status.success(),
                    code: out.status.code(),
                    stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
                }
            }
        };

        tracing::debug!(command = %invocation, code = ?output.code, "exit");
        Ok(output)
    }

    fn is_available(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}
