use serde::{Deserialize, Serialize};

/// User configuration persisted at `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub compose: ComposeSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposeSettings {
    /// Command used to drive compose, split on whitespace before spawning.
    #[serde(default = "default_compose_command")]
    pub command: String,
}

impl Default for ComposeSettings {
    fn default() -> Self {
        Self {
            command: default_compose_command(),
        }
    }
}

fn default_compose_command() -> String {
    "docker compose".to_string()
}
