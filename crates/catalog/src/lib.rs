mod config;
mod error;
mod paths;
mod store;
mod types;

pub use config::{ComposeSettings, UserConfig};
pub use error::{CatalogError, Result};
pub use paths::LabPaths;
pub use store::CatalogStore;
pub use types::{
    ContainerStatus, Environment, EnvironmentList, EnvironmentStatus, PortBinding,
};
