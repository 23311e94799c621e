//! environment::compose
//!
//! Argument vectors for `docker compose`.

use std::path::{Path, PathBuf};

use crate::process::Invocation;

/// A compose project: one descriptor file under one project name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compose {
    file: PathBuf,
    project: String,
    root: PathBuf,
}

impl Compose {
    /// `root` is the working directory compose runs in.
    pub fn new(
        file: impl Into<PathBuf>,
        project: impl Into<String>,
        root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            file: file.into(),
            project: project.into(),
            root: root.into(),
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    /// `docker compose -f <file> -p <project>`
    fn base(&self) -> Invocation {
        Invocation::new("docker")
            .args(["compose", "-f"])
            .arg(self.file.to_string_lossy())
            .args(["-p", self.project.as_str()])
            .current_dir(&self.root)
    }

    /// Build and start detached, with the classic builder.
    pub fn up(&self) -> Invocation {
        self.base()
            .args(["up", "-d", "--build"])
            .env("DOCKER_BUILDKIT", "0")
    }

    pub fn down(&self, remove_orphans: bool) -> Invocation {
        let inv = self.base().arg("down");
        if remove_orphans {
            inv.arg("--remove-orphans")
        } else {
            inv
        }
    }

    pub fn ps(&self) -> Invocation {
        self.base().arg("ps")
    }

    /// Published address of `service`'s `container_port`, captured for parsing.
    pub fn port(&self, service: &str, container_port: u16) -> Invocation {
        self.base()
            .args(["port", service])
            .arg(container_port.to_string())
            .capture()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compose() -> Compose {
        Compose::new("/srv/app/Docker_Files/docker-compose.yml", "sep", "/srv/app")
    }

    #[test]
    fn up_sets_buildkit_and_detaches() {
        let up = compose().up();
        assert_eq!(
            up.command_line(),
            "docker compose -f /srv/app/Docker_Files/docker-compose.yml -p sep up -d --build"
        );
        assert_eq!(
            up.env_vars(),
            [("DOCKER_BUILDKIT".to_string(), "0".to_string())]
        );
        assert_eq!(up.cwd(), Some(Path::new("/srv/app")));
    }

    #[test]
    fn down_removes_orphans_when_asked() {
        assert!(compose().down(true).argv().ends_with(&[
            "down".to_string(),
            "--remove-orphans".to_string()
        ]));
        assert_eq!(compose().down(false).argv().last().map(String::as_str), Some("down"));
    }

    #[test]
    fn only_up_carries_env() {
        assert!(compose().down(true).env_vars().is_empty());
        assert!(compose().ps().env_vars().is_empty());
    }

    #[test]
    fn port_query() {
        let port = compose().port("web", 8000);
        assert!(port.command_line().ends_with("-p sep port web 8000"));
        assert_eq!(port.mode(), crate::process::OutputMode::Capture);
    }

    #[test]
    fn paths_with_spaces_are_quoted_in_messages() {
        let c = Compose::new("/home/a b/docker-compose.yml", "sep", "/home/a b");
        assert!(c
            .ps()
            .command_line()
            .contains("'/home/a b/docker-compose.yml'"));
    }
}
