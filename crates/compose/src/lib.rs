mod docker;
mod error;
mod inventory;
mod rewrite;
mod runner;

pub use docker::snapshot_bound_ports;
pub use error::{ComposeError, Result};
pub use inventory::PortInventory;
pub use rewrite::resolve_port_conflicts;
pub use runner::{ComposeRunner, DownOptions, ExecOutput, UpOptions};
