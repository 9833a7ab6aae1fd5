use log::debug;
use serde::Deserialize;
use tokio::time::{timeout, Duration};

use crate::PortInventory;

// `docker ps` can hang when the daemon is wedged; startup must not block
// behind it.
const PORT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// One line of `docker ps --format "{{json .}}"`.
#[derive(Debug, Deserialize)]
struct PsLine {
    #[serde(rename = "Ports", default)]
    ports: String,
}

/// Snapshot the host ports currently bound by running containers.
///
/// Fail-open: when the daemon is unreachable, slow, or its output is
/// unparseable, the snapshot is empty and the rewrite pass assumes no
/// conflicts rather than delaying startup.
pub async fn snapshot_bound_ports() -> PortInventory {
    match probe_container_ports().await {
        Some(descriptors) => {
            let inventory = PortInventory::from_descriptors(&descriptors);
            debug!("port snapshot: {} host ports bound", inventory.len());
            inventory
        }
        None => {
            debug!("container port probe failed; assuming no conflicts");
            PortInventory::new()
        }
    }
}

async fn probe_container_ports() -> Option<Vec<String>> {
    let output = timeout(
        PORT_PROBE_TIMEOUT,
        tokio::process::Command::new("docker")
            .arg("ps")
            .arg("--format")
            .arg("{{json .}}")
            .output(),
    )
    .await
    .ok()?
    .ok()?;
    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let descriptors = stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str::<PsLine>(line) {
            Ok(ps) => Some(ps.ports),
            Err(err) => {
                debug!("skipping unparseable container line: {err}");
                None
            }
        })
        .collect();

    Some(descriptors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ps_line_parses_ports_field() {
        let line: PsLine = serde_json::from_str(
            r#"{"ID":"abc","Names":"web","Ports":"0.0.0.0:8080->80/tcp"}"#,
        )
        .unwrap();
        assert_eq!(line.ports, "0.0.0.0:8080->80/tcp");
    }

    #[test]
    fn ps_line_tolerates_missing_ports() {
        let line: PsLine = serde_json::from_str(r#"{"ID":"abc"}"#).unwrap();
        assert!(line.ports.is_empty());
    }
}
