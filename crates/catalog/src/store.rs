use std::fs;

use log::debug;

use crate::{CatalogError, EnvironmentList, LabPaths, Result, UserConfig};

/// Reads and writes the catalog and user configuration under the data
/// directory.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    paths: LabPaths,
}

impl CatalogStore {
    #[must_use]
    pub fn new(paths: LabPaths) -> Self {
        Self { paths }
    }

    #[must_use]
    pub fn paths(&self) -> &LabPaths {
        &self.paths
    }

    /// Load the environment catalog. Fails with [`CatalogError::NotFound`]
    /// when no catalog has been written yet.
    pub fn load_environments(&self) -> Result<EnvironmentList> {
        let path = self.paths.environments_file();
        if !path.is_file() {
            return Err(CatalogError::NotFound { path });
        }

        let data = fs::read_to_string(&path)?;
        let list = toml::from_str::<EnvironmentList>(&data)
            .map_err(|source| CatalogError::Parse { path, source })?;
        debug!("loaded catalog with {} environments", list.environments.len());
        Ok(list)
    }

    pub fn save_environments(&self, list: &EnvironmentList) -> Result<()> {
        self.paths.ensure_data_dir()?;
        let path = self.paths.environments_file();
        let data = toml::to_string_pretty(list).map_err(|source| CatalogError::Encode {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, data)?;
        Ok(())
    }

    /// Load the user configuration, falling back to defaults when the file
    /// does not exist yet.
    pub fn load_config(&self) -> Result<UserConfig> {
        let path = self.paths.config_file();
        if !path.is_file() {
            return Ok(UserConfig::default());
        }

        let data = fs::read_to_string(&path)?;
        toml::from_str(&data).map_err(|source| CatalogError::Parse { path, source })
    }

    pub fn save_config(&self, config: &UserConfig) -> Result<()> {
        self.paths.ensure_data_dir()?;
        let path = self.paths.config_file();
        let data = toml::to_string_pretty(config).map_err(|source| CatalogError::Encode {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Environment;
    use pretty_assertions::assert_eq;

    fn store_in(dir: &std::path::Path) -> CatalogStore {
        CatalogStore::new(LabPaths::with_data_dir(dir))
    }

    #[test]
    fn missing_catalog_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path());
        assert!(matches!(
            store.load_environments(),
            Err(CatalogError::NotFound { .. })
        ));
    }

    #[test]
    fn round_trips_environments() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path());

        let list = EnvironmentList {
            tags: vec!["rce".into()],
            environments: vec![Environment {
                path: "log4j/CVE-2021-44228".into(),
                name: "Log4Shell".into(),
                cve: vec!["CVE-2021-44228".into()],
                app: "log4j".into(),
                tags: vec!["rce".into()],
            }],
        };
        store.save_environments(&list).unwrap();

        let loaded = store.load_environments().unwrap();
        assert_eq!(loaded.environments, list.environments);
    }

    #[test]
    fn config_defaults_when_absent() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path());
        let cfg = store.load_config().unwrap();
        assert_eq!(cfg.compose.command, "docker compose");

        store.save_config(&cfg).unwrap();
        assert!(store.paths().config_file().is_file());
    }
}
