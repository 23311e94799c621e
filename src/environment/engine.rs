//! environment::engine
//!
//! Container engine and compose plugin checks.
//!
//! # Install policy
//!
//! When `docker` is missing on a Linux host that has `apt`, the engine is
//! installed with `sudo` (update, install, enable service) and the user is
//! added to the `docker` group. Every other platform only gets printed
//! instructions. None of this ever panics; the caller sees `false`.

use std::fmt;

use crate::process::{check, CommandRunner, Invocation};
use crate::ui::output::{self, Verbosity};

/// Host operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
    Other,
}

impl Platform {
    /// The platform this binary was built for.
    pub fn detect() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &str) -> Self {
        match os {
            "linux" => Platform::Linux,
            "macos" => Platform::MacOs,
            "windows" => Platform::Windows,
            _ => Platform::Other,
        }
    }

    /// Manual installation steps, one command or note per line.
    pub fn install_instructions(&self, user: &str) -> Vec<String> {
        match self {
            Platform::Linux => vec![
                "sudo apt update && sudo apt install -y docker.io docker-compose-plugin"
                    .to_string(),
                "sudo systemctl enable --now docker".to_string(),
                format!("sudo usermod -aG docker {user}   # then log out and back in"),
            ],
            Platform::Windows => vec![
                "winget install -e --id Docker.DockerDesktop".to_string(),
                "(Docker Desktop needs WSL2 enabled; a reboot may be required.)".to_string(),
            ],
            Platform::MacOs => vec![
                "brew install --cask docker".to_string(),
                "(Start Docker.app once to finish setup.)".to_string(),
            ],
            Platform::Other => {
                vec!["Install Docker manually: https://docs.docker.com/engine/install/".to_string()]
            }
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Linux => "Linux",
            Platform::MacOs => "macOS",
            Platform::Windows => "Windows",
            Platform::Other => "this platform",
        };
        f.write_str(name)
    }
}

/// Make sure `docker` resolves on `PATH`, installing it where supported.
///
/// Returns whether the engine is available afterwards. Manual install steps
/// are left to the caller's error report.
pub fn ensure_engine_available(
    runner: &dyn CommandRunner,
    platform: Platform,
    user: &str,
    verbosity: Verbosity,
) -> bool {
    if runner.is_available("docker") {
        return true;
    }
    tracing::debug!(%platform, "docker not found on PATH");

    if platform == Platform::Linux
        && runner.is_available("apt")
        && install_with_apt(runner, user, verbosity)
    {
        return true;
    }
    false
}

fn install_with_apt(runner: &dyn CommandRunner, user: &str, verbosity: Verbosity) -> bool {
    output::print(
        "Docker not found. Attempting Debian/Ubuntu install via apt (sudo required)...",
        verbosity,
    );

    let steps = [
        Invocation::new("apt").arg("update"),
        Invocation::new("apt").args(["install", "-y", "docker.io", "docker-compose-plugin"]),
        Invocation::new("systemctl").args(["enable", "--now", "docker"]),
    ];
    for step in &steps {
        if let Err(err) = check(runner, &step.escalated()) {
            output::warn(
                format!("Failed to install Docker automatically with apt: {err}"),
                verbosity,
            );
            return false;
        }
    }

    let group = Invocation::new("usermod").args(["-aG", "docker", user]).escalated();
    match check(runner, &group) {
        Ok(_) => output::info(
            "Added you to the 'docker' group. \
             Log out and back in (or reboot) for it to take effect.",
            verbosity,
        ),
        Err(err) => {
            tracing::debug!(error = %err, "usermod failed");
            output::warn(
                "Could not add you to the 'docker' group automatically. You can run:",
                verbosity,
            );
            output::print(format!("    {}", group.command_line()), verbosity);
        }
    }

    runner.is_available("docker")
}

/// Whether the compose v2 plugin answers `docker compose version`.
///
/// Any failure, including a missing `docker`, yields `false`.
pub fn ensure_compose_plugin(runner: &dyn CommandRunner) -> bool {
    let version = Invocation::new("docker").args(["compose", "version"]).capture();
    match check(runner, &version) {
        Ok(out) => {
            out.stdout.contains("Docker Compose version")
                || out.stdout.to_lowercase().contains("v2")
        }
        Err(err) => {
            tracing::debug!(error = %err, "compose plugin check failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::mock::{MockResponse, MockRunner};
    use crate::process::Privilege;

    const Q: Verbosity = Verbosity::Quiet;

    mod engine {
        use super::*;

        #[test]
        fn present_engine_runs_nothing() {
            let runner = MockRunner::new().with_programs(&["docker"]);
            assert!(ensure_engine_available(&runner, Platform::Linux, "alice", Q));
            assert!(runner.calls().is_empty());
        }

        #[test]
        fn apt_install_sequence() {
            let runner = MockRunner::new()
                .with_programs(&["apt"])
                .installs("systemctl enable", "docker");

            assert!(ensure_engine_available(&runner, Platform::Linux, "alice", Q));

            assert_eq!(
                runner.command_lines(),
                [
                    "sudo apt update",
                    "sudo apt install -y docker.io docker-compose-plugin",
                    "sudo systemctl enable --now docker",
                    "sudo usermod -aG docker alice",
                ]
            );
            assert!(runner
                .calls()
                .iter()
                .all(|c| c.privilege() == Privilege::Elevated));
        }

        #[test]
        fn usermod_failure_is_not_fatal() {
            let runner = MockRunner::new()
                .with_programs(&["apt"])
                .installs("systemctl enable", "docker")
                .on("usermod", MockResponse::fail(1, "usermod: group missing"));

            assert!(ensure_engine_available(&runner, Platform::Linux, "alice", Q));
        }

        #[test]
        fn failed_install_step_stops_sequence() {
            let runner = MockRunner::new()
                .with_programs(&["apt"])
                .on("apt install", MockResponse::fail(100, "E: Unable to locate package"));

            assert!(!ensure_engine_available(&runner, Platform::Linux, "alice", Q));
            assert_eq!(runner.count("systemctl"), 0);
            assert_eq!(runner.count("usermod"), 0);
        }

        #[test]
        fn linux_without_apt_only_instructs() {
            let runner = MockRunner::new();
            assert!(!ensure_engine_available(&runner, Platform::Linux, "alice", Q));
            assert!(runner.calls().is_empty());
        }

        #[test]
        fn other_platforms_only_instruct() {
            for platform in [Platform::MacOs, Platform::Windows, Platform::Other] {
                let runner = MockRunner::new().with_programs(&["apt"]);
                assert!(!ensure_engine_available(&runner, platform, "alice", Q));
                assert!(runner.calls().is_empty());
            }
        }
    }

    mod plugin {
        use super::*;

        #[test]
        fn detects_compose_v2_banner() {
            let runner = MockRunner::new().on(
                "compose version",
                MockResponse::stdout("Docker Compose version v2.27.0\n"),
            );
            assert!(ensure_compose_plugin(&runner));
        }

        #[test]
        fn detects_lowercase_v2() {
            let runner = MockRunner::new().on("compose version", MockResponse::stdout("V2.3.3\n"));
            assert!(ensure_compose_plugin(&runner));
        }

        #[test]
        fn unknown_output_is_missing() {
            let runner = MockRunner::new().on("compose version", MockResponse::stdout("1.29.2\n"));
            assert!(!ensure_compose_plugin(&runner));
        }

        #[test]
        fn failure_is_missing() {
            let runner =
                MockRunner::new().on("compose version", MockResponse::fail(1, "not a command"));
            assert!(!ensure_compose_plugin(&runner));
            let runner = MockRunner::new().on("docker", MockResponse::SpawnError);
            assert!(!ensure_compose_plugin(&runner));
        }
    }

    #[test]
    fn platform_from_os() {
        assert_eq!(Platform::from_os("linux"), Platform::Linux);
        assert_eq!(Platform::from_os("macos"), Platform::MacOs);
        assert_eq!(Platform::from_os("windows"), Platform::Windows);
        assert_eq!(Platform::from_os("freebsd"), Platform::Other);
    }

    #[test]
    fn linux_instructions_name_user() {
        let lines = Platform::Linux.install_instructions("bob");
        assert!(lines.iter().any(|l| l.contains("usermod -aG docker bob")));
    }
}
