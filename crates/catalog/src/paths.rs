use std::path::{Path, PathBuf};

use crate::{CatalogError, Result};

const DATA_DIR_NAME: &str = ".vulnlab";
const DATA_DIR_ENV: &str = "VULNLAB_HOME";
const CONFIG_FILE_NAME: &str = "config.toml";
const ENVIRONMENTS_FILE_NAME: &str = "environments.toml";
const ENVIRONMENTS_DIR_NAME: &str = "environments";
const COMPOSE_FILE_NAME: &str = "docker-compose.yml";

/// On-disk layout of the vulnlab data directory.
#[derive(Debug, Clone)]
pub struct LabPaths {
    data_dir: PathBuf,
}

impl LabPaths {
    /// Resolve the data directory: `$VULNLAB_HOME` when set, otherwise
    /// `~/.vulnlab`.
    pub fn discover() -> Result<Self> {
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
            return Ok(Self {
                data_dir: PathBuf::from(dir),
            });
        }
        let home = dirs::home_dir().ok_or(CatalogError::NoHomeDir)?;
        Ok(Self {
            data_dir: home.join(DATA_DIR_NAME),
        })
    }

    #[must_use]
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE_NAME)
    }

    #[must_use]
    pub fn environments_file(&self) -> PathBuf {
        self.data_dir.join(ENVIRONMENTS_FILE_NAME)
    }

    #[must_use]
    pub fn environments_dir(&self) -> PathBuf {
        self.data_dir.join(ENVIRONMENTS_DIR_NAME)
    }

    /// Work directory of a specific environment, keyed by its catalog path.
    #[must_use]
    pub fn environment_dir(&self, env_path: &str) -> PathBuf {
        self.environments_dir().join(env_path)
    }

    /// Compose file inside an environment's work directory.
    #[must_use]
    pub fn compose_file(&self, env_path: &str) -> PathBuf {
        self.environment_dir(env_path).join(COMPOSE_FILE_NAME)
    }

    /// An environment counts as present once its compose file is on disk.
    #[must_use]
    pub fn environment_present(&self, env_path: &str) -> bool {
        self.compose_file(env_path).is_file()
    }

    pub fn ensure_data_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }

    pub fn ensure_environment_dir(&self, env_path: &str) -> Result<PathBuf> {
        let dir = self.environment_dir(env_path);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_rooted_at_data_dir() {
        let paths = LabPaths::with_data_dir("/tmp/vulnlab-test");
        assert_eq!(
            paths.environments_file(),
            PathBuf::from("/tmp/vulnlab-test/environments.toml")
        );
        assert_eq!(
            paths.environment_dir("log4j/CVE-2021-44228"),
            PathBuf::from("/tmp/vulnlab-test/environments/log4j/CVE-2021-44228")
        );
        assert_eq!(
            paths.compose_file("a/b"),
            PathBuf::from("/tmp/vulnlab-test/environments/a/b/docker-compose.yml")
        );
    }

    #[test]
    fn environment_present_requires_compose_file() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = LabPaths::with_data_dir(tmp.path());
        assert!(!paths.environment_present("demo/app"));

        let dir = paths.ensure_environment_dir("demo/app").unwrap();
        assert!(!paths.environment_present("demo/app"));

        std::fs::write(dir.join("docker-compose.yml"), "services: {}\n").unwrap();
        assert!(paths.environment_present("demo/app"));
    }
}
