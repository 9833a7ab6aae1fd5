use std::collections::HashSet;

use crate::{ComposeError, Result};

// Bounded probe: a conflicting port may move at most this far from its
// requested value.
const PROBE_WINDOW: u16 = 100;
const MAX_PORT: u16 = 65535;

/// Snapshot of the host ports currently bound. Built fresh per rewrite
/// pass; ports allocated during the pass are recorded here so that two
/// conflicting declarations never receive the same replacement.
#[derive(Debug, Clone, Default)]
pub struct PortInventory {
    used: HashSet<u16>,
}

impl PortInventory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an inventory from raw `host:container/proto`-style descriptor
    /// strings as reported by the container runtime, e.g.
    /// `0.0.0.0:8080->80/tcp, :::8080->80/tcp`. Segments that do not parse
    /// are skipped: missing a bound port only costs a retry later,
    /// inventing one would break a working setup.
    #[must_use]
    pub fn from_descriptors<I, S>(descriptors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut inventory = Self::new();
        for descriptor in descriptors {
            for port in parse_bound_ports(descriptor.as_ref()) {
                inventory.mark_used(port);
            }
        }
        inventory
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.used.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    #[must_use]
    pub fn is_available(&self, port: u16) -> bool {
        !self.used.contains(&port)
    }

    pub fn mark_used(&mut self, port: u16) {
        self.used.insert(port);
    }

    /// First free port in `[start, start + 99]`, capped at 65535. The scan
    /// is a plain linear probe, so identical inputs always yield the same
    /// answer.
    pub fn find_available(&self, start: u16) -> Result<u16> {
        let end = start.saturating_add(PROBE_WINDOW - 1).min(MAX_PORT);
        (start..=end)
            .find(|port| self.is_available(*port))
            .ok_or(ComposeError::PortExhausted { start, end })
    }
}

fn parse_bound_ports(descriptor: &str) -> Vec<u16> {
    let mut ports = Vec::new();

    for segment in descriptor.split(',') {
        let segment = segment.trim();
        let Some((host_part, _)) = segment.split_once("->") else {
            // Exposed-only entries like "80/tcp" bind nothing on the host.
            continue;
        };
        let Some((_, port_str)) = host_part.rsplit_once(':') else {
            continue;
        };
        if let Ok(port) = port_str.parse::<u16>() {
            ports.push(port);
        }
    }

    ports
}
