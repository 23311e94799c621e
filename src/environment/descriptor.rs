//! environment::descriptor
//!
//! Locating the compose descriptor.

use std::path::{Path, PathBuf};

use super::EnvError;

/// Return the first candidate that exists.
///
/// Relative candidates are resolved against `root`; order is precedence.
///
/// # Errors
///
/// [`EnvError::DescriptorNotFound`] listing every searched path.
pub fn locate_descriptor(root: &Path, candidates: &[PathBuf]) -> Result<PathBuf, EnvError> {
    let searched: Vec<PathBuf> = candidates.iter().map(|c| root.join(c)).collect();

    match searched.iter().find(|path| path.is_file()) {
        Some(found) => {
            tracing::debug!(descriptor = %found.display(), "compose descriptor located");
            Ok(found.clone())
        }
        None => Err(EnvError::DescriptorNotFound { searched }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::defaults;
    use std::fs;
    use tempfile::TempDir;

    fn candidates() -> Vec<PathBuf> {
        defaults::COMPOSE_CANDIDATES
            .iter()
            .map(PathBuf::from)
            .collect()
    }

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "services: {}\n").unwrap();
    }

    #[test]
    fn only_root_level_exists() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "docker-compose.yml");

        let found = locate_descriptor(temp.path(), &candidates()).unwrap();
        assert_eq!(found, temp.path().join("docker-compose.yml"));
    }

    #[test]
    fn nested_wins_when_both_exist() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "docker-compose.yml");
        touch(temp.path(), "Docker_Files/docker-compose.yml");

        let found = locate_descriptor(temp.path(), &candidates()).unwrap();
        assert_eq!(found, temp.path().join("Docker_Files/docker-compose.yml"));
    }

    #[test]
    fn neither_exists() {
        let temp = TempDir::new().unwrap();

        let err = locate_descriptor(temp.path(), &candidates()).unwrap_err();
        match &err {
            EnvError::DescriptorNotFound { searched } => assert_eq!(searched.len(), 2),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn directory_named_like_descriptor_is_skipped() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("Docker_Files/docker-compose.yml")).unwrap();
        touch(temp.path(), "docker-compose.yml");

        let found = locate_descriptor(temp.path(), &candidates()).unwrap();
        assert_eq!(found, temp.path().join("docker-compose.yml"));
    }
}
