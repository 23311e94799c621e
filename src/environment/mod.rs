//! environment
//!
//! Bring the containerized application up and down.
//!
//! # Modules
//!
//! - [`descriptor`] - Locate the compose file among ordered candidates
//! - [`engine`] - Engine presence, apt install, compose plugin check
//! - [`compose`] - `docker compose` argument vectors
//! - [`address`] - Published address lookup and HTTP readiness polling
//! - [`browser`] - Best-effort browser launch
//!
//! # Failure policy
//!
//! Every compose step runs once as-is and, if it fails, once more under
//! `sudo`. Only when both fail is the step fatal, and the error carries the
//! command the user can run by hand. Diagnostics, readiness and the browser
//! never abort a start.
//!
//! # Example
//!
//! ```ignore
//! use devkit::environment::{Controller, EnvSettings, HttpReadyCheck, SystemOpener};
//! use devkit::process::SystemRunner;
//!
//! let settings = EnvSettings::from_config(&config, &root);
//! let controller = Controller::new(&SystemRunner, &SystemOpener, settings);
//! let report = controller.start(&HttpReadyCheck::new()?, true)?;
//! println!("{}", report.url);
//! ```

pub mod address;
pub mod browser;
pub mod compose;
pub mod descriptor;
pub mod engine;

pub use address::{resolve_url, wait_until_reachable, HttpReadyCheck, ReadyCheck, Readiness};
pub use browser::{open_best_effort, Opener, SystemOpener};
pub use compose::Compose;
pub use descriptor::locate_descriptor;
pub use engine::{ensure_compose_plugin, ensure_engine_available, Platform};

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::core::config::Config;
use crate::core::naming;
use crate::process::{check, run_escalated, CommandRunner, Escalated, Invocation, ProcessError};
use crate::ui::output::{self, Verbosity};

/// Errors from environment operations.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("docker-compose.yml not found (looked in {})", display_paths(.searched))]
    DescriptorNotFound { searched: Vec<PathBuf> },

    #[error("Docker is not installed or not ready")]
    EngineUnavailable { platform: Platform, user: String },

    #[error("Docker Compose v2 plugin is missing")]
    ComposePluginMissing,

    #[error("docker compose {step} failed, with and without sudo")]
    ComposeFailed {
        step: &'static str,
        /// The command to run by hand.
        manual: String,
        #[source]
        source: ProcessError,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl EnvError {
    /// What the user can do about it.
    pub fn hint(&self) -> Option<String> {
        match self {
            EnvError::DescriptorNotFound { .. } => {
                Some("run from the project root, or pass --cwd <project-dir>".to_string())
            }
            EnvError::EngineUnavailable { platform, user } => {
                let steps = platform.install_instructions(user).join("\n");
                Some(format!("Manual Docker install ({platform}):\n{steps}"))
            }
            EnvError::ComposePluginMissing => {
                Some("sudo apt install -y docker-compose-plugin".to_string())
            }
            EnvError::ComposeFailed { manual, .. } => Some(manual.clone()),
        }
    }
}

/// Resolved environment settings for one project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvSettings {
    pub root: PathBuf,
    pub candidates: Vec<PathBuf>,
    pub project: String,
    pub service: String,
    pub container_port: u16,
    pub default_url: String,
    pub ready_timeout: Duration,
    pub poll_interval: Duration,
    pub remove_orphans: bool,
}

impl EnvSettings {
    pub fn from_config(config: &Config, root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            candidates: config.compose_candidates(),
            project: config.project(),
            service: config.service(),
            container_port: config.container_port(),
            default_url: config.default_url(),
            ready_timeout: config.ready_timeout(),
            poll_interval: config.poll_interval(),
            remove_orphans: config.remove_orphans(),
        }
    }
}

/// What a successful start produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartReport {
    pub descriptor: PathBuf,
    pub url: String,
    pub readiness: Readiness,
    /// Whether `up` needed `sudo`.
    pub escalated: bool,
}

/// Drives the start/stop/status workflows.
pub struct Controller<'a> {
    runner: &'a dyn CommandRunner,
    opener: &'a dyn Opener,
    settings: EnvSettings,
    platform: Platform,
    user: String,
    verbosity: Verbosity,
}

impl<'a> Controller<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        opener: &'a dyn Opener,
        settings: EnvSettings,
    ) -> Self {
        Self {
            runner,
            opener,
            settings,
            platform: Platform::detect(),
            user: naming::current_user(),
            verbosity: Verbosity::Normal,
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    fn compose(&self) -> Result<Compose, EnvError> {
        let descriptor = locate_descriptor(&self.settings.root, &self.settings.candidates)?;
        Ok(Compose::new(
            descriptor,
            self.settings.project.clone(),
            self.settings.root.clone(),
        ))
    }

    /// Run one compose step with the sudo retry.
    fn step(&self, step: &'static str, invocation: &Invocation) -> Result<Escalated, EnvError> {
        run_escalated(self.runner, invocation, |err| {
            output::warn(
                format!("docker compose {step} failed ({err}). Trying with sudo..."),
                self.verbosity,
            );
        })
        .map_err(|source| {
            let env: String = invocation
                .env_vars()
                .iter()
                .map(|(key, value)| format!("{key}={value} "))
                .collect();
            EnvError::ComposeFailed {
                step,
                manual: format!("{env}{}", invocation.escalated().command_line()),
                source,
            }
        })
    }

    /// Build, start and open the application, polling `ready` until it answers.
    ///
    /// # Errors
    ///
    /// Missing descriptor, engine or plugin, or `up` failing twice.
    pub fn start(
        &self,
        ready: &dyn ReadyCheck,
        open_browser: bool,
    ) -> Result<StartReport, EnvError> {
        let compose = self.compose()?;

        if !ensure_engine_available(self.runner, self.platform, &self.user, self.verbosity) {
            return Err(EnvError::EngineUnavailable {
                platform: self.platform,
                user: self.user.clone(),
            });
        }
        if !ensure_compose_plugin(self.runner) {
            return Err(EnvError::ComposePluginMissing);
        }

        output::print(
            format!(
                "Starting '{}' from {}...",
                compose.project(),
                compose.file().display()
            ),
            self.verbosity,
        );
        let up = self.step("up", &compose.up())?;

        let url = resolve_url(
            self.runner,
            &compose,
            &self.settings.service,
            self.settings.container_port,
            &self.settings.default_url,
        );

        output::print(
            format!(
                "Waiting for {url} (up to {}s)...",
                self.settings.ready_timeout.as_secs()
            ),
            self.verbosity,
        );
        let readiness = wait_until_reachable(
            ready,
            &url,
            self.settings.ready_timeout,
            self.settings.poll_interval,
        );
        if !readiness.is_ready() {
            output::warn(
                format!(
                    "{url} did not answer within {}s; containers may still be starting",
                    self.settings.ready_timeout.as_secs()
                ),
                self.verbosity,
            );
        }

        if let Err(err) = check(self.runner, &compose.ps()) {
            tracing::debug!(error = %err, "compose ps diagnostics failed");
        }

        output::success(format!("App is starting... {url}"), self.verbosity);
        output::info(
            format!(
                "To stop: devenv stop   (or)   {}",
                compose.down(self.settings.remove_orphans).command_line()
            ),
            self.verbosity,
        );

        if open_browser {
            open_best_effort(self.opener, &url);
        }

        Ok(StartReport {
            descriptor: compose.file().to_path_buf(),
            url,
            readiness,
            escalated: up.privilege == crate::process::Privilege::Elevated,
        })
    }

    /// Stop and remove the project's containers.
    ///
    /// # Errors
    ///
    /// Missing descriptor, or `down` failing twice.
    pub fn stop(&self) -> Result<(), EnvError> {
        let compose = self.compose()?;
        self.step("down", &compose.down(self.settings.remove_orphans))?;
        output::success("Docker environment stopped.", self.verbosity);
        Ok(())
    }

    /// Show the project's containers.
    ///
    /// # Errors
    ///
    /// Missing descriptor, or `ps` failing twice.
    pub fn status(&self) -> Result<(), EnvError> {
        let compose = self.compose()?;
        self.step("ps", &compose.ps())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::defaults;
    use crate::process::mock::{MockResponse, MockRunner};
    use crate::process::Privilege;
    use std::cell::RefCell;
    use std::fs;
    use std::io;
    use tempfile::TempDir;

    struct AlwaysReady;

    impl ReadyCheck for AlwaysReady {
        fn is_ready(&self, _url: &str) -> bool {
            true
        }
    }

    struct NeverReady;

    impl ReadyCheck for NeverReady {
        fn is_ready(&self, _url: &str) -> bool {
            false
        }
    }

    #[derive(Default)]
    struct RecordingOpener {
        opened: RefCell<Vec<String>>,
        fail: bool,
    }

    impl Opener for RecordingOpener {
        fn open(&self, url: &str) -> io::Result<()> {
            self.opened.borrow_mut().push(url.to_string());
            if self.fail {
                Err(io::Error::new(io::ErrorKind::Other, "no display"))
            } else {
                Ok(())
            }
        }
    }

    fn project() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("docker-compose.yml"), "services: {}\n").unwrap();
        temp
    }

    fn settings(root: &Path) -> EnvSettings {
        EnvSettings {
            ready_timeout: Duration::from_millis(20),
            poll_interval: Duration::from_millis(5),
            ..EnvSettings::from_config(&Config::default(), root)
        }
    }

    fn docker_ready() -> MockRunner {
        MockRunner::new()
            .with_programs(&["docker"])
            .on("compose version", MockResponse::stdout("Docker Compose version v2.27.0"))
    }

    fn controller<'a>(
        runner: &'a MockRunner,
        opener: &'a RecordingOpener,
        root: &Path,
    ) -> Controller<'a> {
        Controller::new(runner, opener, settings(root))
            .with_platform(Platform::Linux)
            .with_user("alice")
            .with_verbosity(Verbosity::Quiet)
    }

    mod start {
        use super::*;

        #[test]
        fn happy_path() {
            let temp = project();
            let runner = docker_ready().on("port web 8000", MockResponse::stdout("0.0.0.0:8000\n"));
            let opener = RecordingOpener::default();

            let report = controller(&runner, &opener, temp.path())
                .start(&AlwaysReady, true)
                .unwrap();

            assert_eq!(report.url, "http://127.0.0.1:8000");
            assert!(report.readiness.is_ready());
            assert!(!report.escalated);
            assert_eq!(report.descriptor, temp.path().join("docker-compose.yml"));
            assert_eq!(*opener.opened.borrow(), ["http://127.0.0.1:8000"]);

            let up = runner.position("up -d --build").unwrap();
            let port = runner.position("port web 8000").unwrap();
            let ps = runner.position(" ps").unwrap();
            assert!(up < port && port < ps);
        }

        #[test]
        fn up_retried_with_sudo_keeps_buildkit_env() {
            let temp = project();
            let runner =
                docker_ready().on_normal("up -d", MockResponse::fail(1, "permission denied"));
            let opener = RecordingOpener::default();

            let report = controller(&runner, &opener, temp.path())
                .start(&AlwaysReady, false)
                .unwrap();

            assert!(report.escalated);
            let ups: Vec<_> = runner
                .calls()
                .into_iter()
                .filter(|c| c.command_line().contains("up -d --build"))
                .collect();
            assert_eq!(ups.len(), 2);
            assert_eq!(ups[1].privilege(), Privilege::Elevated);
            for call in &ups {
                assert_eq!(
                    call.env_vars(),
                    [("DOCKER_BUILDKIT".to_string(), "0".to_string())]
                );
            }
            assert!(ups[1]
                .command_line()
                .starts_with("sudo --preserve-env=DOCKER_BUILDKIT docker compose"));
        }

        #[test]
        fn up_failing_twice_is_fatal_with_manual_command() {
            let temp = project();
            let runner = docker_ready().on("up -d", MockResponse::fail(1, "build failed"));
            let opener = RecordingOpener::default();

            let err = controller(&runner, &opener, temp.path())
                .start(&AlwaysReady, true)
                .unwrap_err();

            assert!(matches!(err, EnvError::ComposeFailed { step: "up", .. }));
            assert!(err
                .hint()
                .unwrap()
                .starts_with("DOCKER_BUILDKIT=0 sudo --preserve-env=DOCKER_BUILDKIT docker"));
            assert_eq!(runner.count("up -d --build"), 2);
            assert_eq!(runner.count("port web"), 0);
            assert!(opener.opened.borrow().is_empty());
        }

        #[test]
        fn missing_descriptor_runs_nothing() {
            let temp = TempDir::new().unwrap();
            let runner = docker_ready();
            let opener = RecordingOpener::default();

            let err = controller(&runner, &opener, temp.path())
                .start(&AlwaysReady, true)
                .unwrap_err();

            assert!(matches!(err, EnvError::DescriptorNotFound { .. }));
            assert!(runner.calls().is_empty());
        }

        #[test]
        fn missing_engine_is_fatal_with_instructions() {
            let temp = project();
            let runner = MockRunner::new();
            let opener = RecordingOpener::default();

            let err = controller(&runner, &opener, temp.path())
                .start(&AlwaysReady, true)
                .unwrap_err();

            assert!(matches!(err, EnvError::EngineUnavailable { .. }));
            let hint = err.hint().unwrap();
            assert!(hint.starts_with("Manual Docker install (Linux):\n"));
            for step in Platform::Linux.install_instructions("alice") {
                assert_eq!(hint.matches(step.as_str()).count(), 1, "{step}");
            }
            assert_eq!(runner.count("compose"), 0);
        }

        #[test]
        fn missing_plugin_is_fatal() {
            let temp = project();
            let runner = MockRunner::new()
                .with_programs(&["docker"])
                .on("compose version", MockResponse::fail(1, "unknown command"));
            let opener = RecordingOpener::default();

            let err = controller(&runner, &opener, temp.path())
                .start(&AlwaysReady, true)
                .unwrap_err();

            assert!(matches!(err, EnvError::ComposePluginMissing));
            assert_eq!(
                err.hint().as_deref(),
                Some("sudo apt install -y docker-compose-plugin")
            );
            assert_eq!(runner.count("up -d"), 0);
        }

        #[test]
        fn readiness_timeout_browser_failure_and_ps_failure_are_not_fatal() {
            let temp = project();
            let runner = docker_ready()
                .on("port web", MockResponse::fail(1, "no container"))
                .on(" ps", MockResponse::fail(1, "ps broke"));
            let opener = RecordingOpener {
                fail: true,
                ..Default::default()
            };

            let report = controller(&runner, &opener, temp.path())
                .start(&NeverReady, true)
                .unwrap();

            assert_eq!(report.url, defaults::DEFAULT_URL);
            assert!(!report.readiness.is_ready());
            assert_eq!(opener.opened.borrow().len(), 1);
        }
    }

    mod stop {
        use super::*;

        #[test]
        fn down_removes_orphans() {
            let temp = project();
            let runner = MockRunner::new();
            let opener = RecordingOpener::default();

            controller(&runner, &opener, temp.path()).stop().unwrap();

            let lines = runner.command_lines();
            assert_eq!(lines.len(), 1);
            assert!(lines[0].ends_with("-p sep down --remove-orphans"));
        }

        #[test]
        fn down_retried_once_with_sudo() {
            let temp = project();
            let runner = MockRunner::new().on_normal("down", MockResponse::fail(1, "denied"));
            let opener = RecordingOpener::default();

            controller(&runner, &opener, temp.path()).stop().unwrap();

            let calls = runner.calls();
            assert_eq!(calls.len(), 2);
            assert_eq!(calls[1].argv()[0], "sudo");
        }

        #[test]
        fn down_failing_twice_is_fatal() {
            let temp = project();
            let runner = MockRunner::new().on("down", MockResponse::fail(1, "denied"));
            let opener = RecordingOpener::default();

            let err = controller(&runner, &opener, temp.path())
                .stop()
                .unwrap_err();

            assert!(matches!(err, EnvError::ComposeFailed { step: "down", .. }));
            assert!(err.hint().unwrap().contains("down --remove-orphans"));
            assert_eq!(runner.calls().len(), 2);
        }

        #[test]
        fn runs_without_a_readiness_check() {
            let temp = project();
            let runner = MockRunner::new();
            let opener = RecordingOpener::default();
            let controller = Controller::new(&runner, &opener, settings(temp.path()))
                .with_verbosity(Verbosity::Quiet);

            controller.stop().unwrap();
            controller.status().unwrap();

            let lines = runner.command_lines();
            assert_eq!(lines.len(), 2);
            assert!(lines[0].ends_with("down --remove-orphans"));
            assert!(lines[1].ends_with("-p sep ps"));
            assert!(opener.opened.borrow().is_empty());
        }

        #[test]
        fn stop_without_descriptor_fails() {
            let temp = TempDir::new().unwrap();
            let runner = MockRunner::new();
            let opener = RecordingOpener::default();

            let err = controller(&runner, &opener, temp.path())
                .stop()
                .unwrap_err();
            assert!(err.to_string().contains("not found"));
        }
    }

    #[test]
    fn status_runs_ps() {
        let temp = project();
        let runner = MockRunner::new();
        let opener = RecordingOpener::default();

        controller(&runner, &opener, temp.path()).status().unwrap();

        assert!(runner.command_lines()[0].ends_with("-p sep ps"));
    }
}
