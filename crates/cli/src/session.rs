use std::path::PathBuf;

use anyhow::{bail, Context};
use log::{debug, warn};
use vulnlab_catalog::{
    CatalogStore, ContainerStatus, Environment, EnvironmentList, EnvironmentStatus, LabPaths,
};
use vulnlab_compose::{
    resolve_port_conflicts, snapshot_bound_ports, ComposeRunner, DownOptions, UpOptions,
};
use vulnlab_resolver::{KeywordResolver, Outcome, Resolution};

use crate::ui;

/// Ties the catalog, the keyword resolver, and the compose runner together
/// for one CLI invocation.
pub struct LabSession {
    store: CatalogStore,
    resolver: KeywordResolver<CatalogStore>,
    runner: ComposeRunner,
}

impl LabSession {
    pub fn discover() -> anyhow::Result<Self> {
        let paths = LabPaths::discover()?;
        let store = CatalogStore::new(paths);
        let config = store.load_config().context("failed to load configuration")?;
        let runner = ComposeRunner::new(&config.compose.command);
        let resolver = KeywordResolver::new(store.clone());
        Ok(Self {
            store,
            resolver,
            runner,
        })
    }

    pub fn paths(&self) -> &LabPaths {
        self.store.paths()
    }

    pub fn catalog(&self) -> anyhow::Result<EnvironmentList> {
        Ok(self.store.load_environments()?)
    }

    pub fn resolve(&self, keyword: &str) -> anyhow::Result<Resolution> {
        Ok(self.resolver.resolve(keyword)?)
    }

    /// Resolve a keyword down to exactly one environment, prompting the
    /// user to pick one when the keyword is ambiguous. With `assume_yes`
    /// an ambiguous keyword is an error instead of a prompt.
    pub fn resolve_single(&self, keyword: &str, assume_yes: bool) -> anyhow::Result<Environment> {
        let resolution = self.resolve(keyword)?;
        match resolution.outcome {
            Outcome::NoMatches => bail!(
                "no environment matches '{keyword}'; try `vulnlab search {keyword}`"
            ),
            Outcome::Resolved { environment, .. } => Ok(environment),
            Outcome::Ambiguous { candidates } => {
                if assume_yes {
                    bail!(
                        "'{keyword}' matches {} environments; use a more specific keyword",
                        candidates.len()
                    );
                }
                ui::select_environment(
                    &candidates,
                    &format!("Several environments match '{keyword}'; pick one"),
                )
            }
        }
    }

    pub fn work_dir(&self, env: &Environment) -> PathBuf {
        self.paths().environment_dir(&env.path)
    }

    fn require_present(&self, env: &Environment) -> anyhow::Result<PathBuf> {
        if !self.paths().environment_present(&env.path) {
            bail!(
                "environment '{}' has no compose file under {}; place the lab files there first",
                env.path,
                self.work_dir(env).display()
            );
        }
        Ok(self.work_dir(env))
    }

    pub async fn start(&self, env: &Environment, options: UpOptions) -> anyhow::Result<()> {
        self.runner
            .check_available()
            .await
            .context("docker is not available")?;
        let work_dir = self.require_present(env)?;

        // Remap any host ports that are already taken before bringing the
        // stack up; a failure here is advisory and never blocks startup.
        let mut inventory = snapshot_bound_ports().await;
        match resolve_port_conflicts(&self.paths().compose_file(&env.path), &mut inventory) {
            Ok(true) => debug!("compose file rewritten for '{}'", env.path),
            Ok(false) => {}
            Err(err) => warn!("port conflict resolution skipped: {err}"),
        }

        self.runner.up(&work_dir, options).await?;
        Ok(())
    }

    pub async fn stop(&self, env: &Environment, timeout_secs: Option<u32>) -> anyhow::Result<()> {
        let work_dir = self.require_present(env)?;
        self.runner.stop(&work_dir, timeout_secs).await?;
        Ok(())
    }

    pub async fn restart(
        &self,
        env: &Environment,
        timeout_secs: Option<u32>,
    ) -> anyhow::Result<()> {
        let work_dir = self.require_present(env)?;
        self.runner.restart(&work_dir, timeout_secs).await?;
        Ok(())
    }

    pub async fn down(&self, env: &Environment, remove_volumes: bool) -> anyhow::Result<()> {
        let work_dir = self.require_present(env)?;
        self.runner
            .down(
                &work_dir,
                DownOptions {
                    remove_volumes,
                    timeout_secs: None,
                },
            )
            .await?;
        Ok(())
    }

    /// Live status for one environment. Environments without local files
    /// or without containers simply report as not running.
    pub async fn status_of(&self, env: &Environment) -> EnvironmentStatus {
        let local_path = self.work_dir(env);
        let mut status = EnvironmentStatus {
            environment: env.clone(),
            local_path,
            ..Default::default()
        };

        if !self.paths().environment_present(&env.path) {
            return status;
        }

        match self.runner.ps(&status.local_path).await {
            Ok(containers) => {
                status.running = containers.iter().any(ContainerStatus::is_running);
                status.containers = containers;
            }
            Err(err) => debug!("no container status for '{}': {err}", env.path),
        }

        status
    }

    /// Status of every environment present on disk.
    pub async fn status_of_present(&self) -> anyhow::Result<Vec<EnvironmentStatus>> {
        let catalog = self.catalog()?;
        let mut statuses = Vec::new();
        for env in &catalog.environments {
            if !self.paths().environment_present(&env.path) {
                continue;
            }
            statuses.push(self.status_of(env).await);
        }
        Ok(statuses)
    }
}
