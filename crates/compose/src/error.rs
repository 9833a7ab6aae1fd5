use thiserror::Error;

pub type Result<T> = std::result::Result<T, ComposeError>;

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("no available host port in [{start}, {end}]")]
    PortExhausted { start: u16, end: u16 },

    #[error("compose command exited with status {code}: {stderr}")]
    CommandFailed { code: i32, stderr: String },

    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize compose document: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
