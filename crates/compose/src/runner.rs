use std::path::Path;
use std::process::Output;

use log::{debug, warn};
use serde::Deserialize;
use vulnlab_catalog::{ContainerStatus, PortBinding};

use crate::{ComposeError, Result};

const DEFAULT_COMPOSE_COMMAND: &str = "docker compose";

/// Runs the configured compose command inside an environment's work
/// directory.
#[derive(Debug, Clone)]
pub struct ComposeRunner {
    command: Vec<String>,
}

/// Options for `up`. Environments always start detached.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpOptions {
    pub pull: bool,
    pub build: bool,
    pub force_recreate: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DownOptions {
    pub remove_volumes: bool,
    pub timeout_secs: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ComposeRunner {
    /// `command` is split on whitespace before spawning, so both
    /// `docker compose` and `docker-compose` work.
    #[must_use]
    pub fn new(command: &str) -> Self {
        let command = if command.trim().is_empty() {
            DEFAULT_COMPOSE_COMMAND
        } else {
            command
        };
        Self {
            command: command.split_whitespace().map(str::to_string).collect(),
        }
    }

    pub async fn execute(&self, work_dir: &Path, args: &[&str]) -> Result<ExecOutput> {
        // `new` guarantees at least one token.
        let program = &self.command[0];
        let base_args = &self.command[1..];

        debug!(
            "running {} {} {} in {}",
            program,
            base_args.join(" "),
            args.join(" "),
            work_dir.display()
        );

        let output = tokio::process::Command::new(program)
            .args(base_args)
            .args(args)
            .current_dir(work_dir)
            .output()
            .await
            .map_err(|source| ComposeError::Spawn {
                command: self.command.join(" "),
                source,
            })?;

        Ok(to_exec_output(output))
    }

    async fn execute_checked(&self, work_dir: &Path, args: &[&str]) -> Result<ExecOutput> {
        let output = self.execute(work_dir, args).await?;
        if output.exit_code != 0 {
            return Err(ComposeError::CommandFailed {
                code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output)
    }

    pub async fn up(&self, work_dir: &Path, options: UpOptions) -> Result<()> {
        let mut args = vec!["up", "-d"];
        if options.build {
            args.push("--build");
        }
        if options.force_recreate {
            args.push("--force-recreate");
        }
        if options.pull {
            args.extend(["--pull", "always"]);
        }
        self.execute_checked(work_dir, &args).await?;
        Ok(())
    }

    pub async fn stop(&self, work_dir: &Path, timeout_secs: Option<u32>) -> Result<()> {
        let timeout_arg;
        let mut args = vec!["stop"];
        if let Some(secs) = timeout_secs {
            timeout_arg = secs.to_string();
            args.extend(["-t", &timeout_arg]);
        }
        self.execute_checked(work_dir, &args).await?;
        Ok(())
    }

    pub async fn restart(&self, work_dir: &Path, timeout_secs: Option<u32>) -> Result<()> {
        let timeout_arg;
        let mut args = vec!["restart"];
        if let Some(secs) = timeout_secs {
            timeout_arg = secs.to_string();
            args.extend(["-t", &timeout_arg]);
        }
        self.execute_checked(work_dir, &args).await?;
        Ok(())
    }

    pub async fn down(&self, work_dir: &Path, options: DownOptions) -> Result<()> {
        let timeout_arg;
        let mut args = vec!["down"];
        if options.remove_volumes {
            args.push("-v");
        }
        if let Some(secs) = options.timeout_secs {
            timeout_arg = secs.to_string();
            args.extend(["-t", &timeout_arg]);
        }
        self.execute_checked(work_dir, &args).await?;
        Ok(())
    }

    pub async fn pull(&self, work_dir: &Path) -> Result<()> {
        self.execute_checked(work_dir, &["pull"]).await?;
        Ok(())
    }

    /// Container status, one JSON object per output line.
    pub async fn ps(&self, work_dir: &Path) -> Result<Vec<ContainerStatus>> {
        let output = self
            .execute_checked(work_dir, &["ps", "--format", "json"])
            .await?;
        Ok(parse_ps_output(&output.stdout))
    }

    /// Checks that both the container daemon and the compose plugin
    /// respond.
    pub async fn check_available(&self) -> Result<()> {
        let daemon = tokio::process::Command::new("docker")
            .arg("info")
            .output()
            .await
            .map_err(|source| ComposeError::Spawn {
                command: "docker info".to_string(),
                source,
            })?;
        if !daemon.status.success() {
            return Err(ComposeError::CommandFailed {
                code: daemon.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&daemon.stderr).trim().to_string(),
            });
        }

        self.execute_checked(Path::new("."), &["version"]).await?;
        Ok(())
    }
}

impl Default for ComposeRunner {
    fn default() -> Self {
        Self::new(DEFAULT_COMPOSE_COMMAND)
    }
}

fn to_exec_output(output: Output) -> ExecOutput {
    ExecOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code: output.status.code().unwrap_or(-1),
    }
}

/// One line of `docker compose ps --format json`.
#[derive(Debug, Deserialize)]
struct PsContainer {
    #[serde(rename = "ID", default)]
    id: String,
    #[serde(rename = "Name", default)]
    name: String,
    #[serde(rename = "Image", default)]
    image: String,
    #[serde(rename = "Service", default)]
    service: String,
    #[serde(rename = "Status", default)]
    status: String,
    #[serde(rename = "State", default)]
    state: String,
    #[serde(rename = "Publishers", default)]
    publishers: Vec<PsPublisher>,
}

#[derive(Debug, Deserialize)]
struct PsPublisher {
    #[serde(rename = "URL", default)]
    url: String,
    #[serde(rename = "TargetPort", default)]
    target_port: u32,
    #[serde(rename = "PublishedPort", default)]
    published_port: u32,
    #[serde(rename = "Protocol", default)]
    protocol: String,
}

fn parse_ps_output(stdout: &str) -> Vec<ContainerStatus> {
    let mut containers = Vec::new();

    for line in stdout.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let ps = match serde_json::from_str::<PsContainer>(line) {
            Ok(ps) => ps,
            Err(err) => {
                warn!("skipping unparseable container status line: {err}");
                continue;
            }
        };

        containers.push(ContainerStatus {
            id: ps.id,
            name: ps.name,
            image: ps.image,
            service: ps.service,
            status: ps.status,
            state: ps.state,
            ports: ps
                .publishers
                .into_iter()
                .map(|p| PortBinding {
                    host_ip: p.url,
                    host_port: p.published_port.to_string(),
                    container_port: p.target_port.to_string(),
                    protocol: p.protocol,
                })
                .collect(),
        });
    }

    containers
}
