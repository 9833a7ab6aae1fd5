use std::fs;
use std::path::Path;

use log::{debug, info, warn};
use serde_yaml::Value;

use crate::{PortInventory, Result};

/// Rewrite conflicting host ports in the compose file at `path`.
///
/// Walks every `services.*.ports` entry, keeps free host ports (recording
/// them in the inventory) and reallocates occupied ones to the next free
/// port. The file is re-serialized and atomically replaced only when at
/// least one entry changed; otherwise its bytes are left untouched.
///
/// A missing or unparseable file is a no-op: this pass is advisory and
/// must never stop an environment from starting. Returns whether the file
/// was rewritten.
pub fn resolve_port_conflicts(path: &Path, inventory: &mut PortInventory) -> Result<bool> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) => {
            debug!("not rewriting {}: {err}", path.display());
            return Ok(false);
        }
    };

    let mut root: Value = match serde_yaml::from_str(&data) {
        Ok(root) => root,
        Err(err) => {
            debug!("not rewriting {}: {err}", path.display());
            return Ok(false);
        }
    };

    if !rewrite_services(&mut root, inventory) {
        return Ok(false);
    }

    let output = serde_yaml::to_string(&root)?;
    write_atomically(path, output.as_bytes())?;
    info!("rewrote {} with conflict-free host ports", path.display());
    Ok(true)
}

fn rewrite_services(root: &mut Value, inventory: &mut PortInventory) -> bool {
    let Some(services) = root.get_mut("services").and_then(Value::as_mapping_mut) else {
        return false;
    };

    let mut changed = false;
    for (name, service) in services.iter_mut() {
        let service_name = name.as_str().unwrap_or_default();
        if rewrite_service_ports(service_name, service, inventory) {
            changed = true;
        }
    }
    changed
}

fn rewrite_service_ports(service: &str, node: &mut Value, inventory: &mut PortInventory) -> bool {
    let Some(ports) = node.get_mut("ports").and_then(Value::as_sequence_mut) else {
        return false;
    };

    let mut changed = false;
    for entry in ports.iter_mut() {
        if rewrite_port_entry(service, entry, inventory) {
            changed = true;
        }
    }
    changed
}

fn rewrite_port_entry(service: &str, entry: &mut Value, inventory: &mut PortInventory) -> bool {
    match entry {
        Value::String(spec) => rewrite_short_syntax(service, spec, inventory),
        Value::Mapping(_) => rewrite_long_syntax(service, entry, inventory),
        _ => false,
    }
}

/// Short syntax: `[host_ip:]host_port:container_port[/protocol]`.
fn rewrite_short_syntax(service: &str, spec: &mut String, inventory: &mut PortInventory) -> bool {
    let (mapping, protocol) = match spec.rfind('/') {
        Some(idx) => (&spec[..idx], &spec[idx..]),
        None => (spec.as_str(), ""),
    };

    let parts: Vec<&str> = mapping.split(':').collect();
    let (host_ip, host_port_str, container_port) = match parts.as_slice() {
        [host, container] => (None, *host, *container),
        [ip, host, container] => (Some(*ip), *host, *container),
        _ => return false,
    };

    // Port ranges are never rewritten.
    if host_port_str.contains('-') {
        return false;
    }
    let Ok(host_port) = host_port_str.parse::<u16>() else {
        return false;
    };

    if inventory.is_available(host_port) {
        inventory.mark_used(host_port);
        return false;
    }

    let new_port = match inventory.find_available(host_port.saturating_add(1)) {
        Ok(port) => port,
        Err(err) => {
            warn!("service {service}: host port {host_port} stays as declared: {err}");
            return false;
        }
    };

    let mut replacement = match host_ip {
        Some(ip) => format!("{ip}:{new_port}:{container_port}"),
        None => format!("{new_port}:{container_port}"),
    };
    replacement.push_str(protocol);
    *spec = replacement;
    inventory.mark_used(new_port);

    info!("service {service}: host port {host_port} is taken, publishing on {new_port}");
    true
}

/// Long syntax: a mapping with a `published` key. Only that scalar is ever
/// touched.
fn rewrite_long_syntax(service: &str, entry: &mut Value, inventory: &mut PortInventory) -> bool {
    let Some(published) = entry.get_mut("published") else {
        return false;
    };

    let host_port = match published {
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(s) => {
            // Empty values, ranges, and unexpanded `${...}` interpolations
            // are externally parameterized; never rewrite them.
            if s.is_empty() || s.contains('-') || (s.starts_with("${") && s.ends_with('}')) {
                return false;
            }
            s.parse::<u16>().ok()
        }
        _ => None,
    };
    let Some(host_port) = host_port else {
        return false;
    };

    if inventory.is_available(host_port) {
        inventory.mark_used(host_port);
        return false;
    }

    let new_port = match inventory.find_available(host_port.saturating_add(1)) {
        Ok(port) => port,
        Err(err) => {
            warn!("service {service}: host port {host_port} stays as declared: {err}");
            return false;
        }
    };

    // Keep the scalar's original kind so a quoted port stays quoted.
    let keep_string = matches!(published, Value::String(_));
    *published = if keep_string {
        Value::String(new_port.to_string())
    } else {
        Value::Number(new_port.into())
    };
    inventory.mark_used(new_port);

    info!("service {service}: host port {host_port} is taken, publishing on {new_port}");
    true
}

// Killing the process mid-write must not leave a truncated compose file
// behind: write a sibling temp file, then rename over the original.
fn write_atomically(path: &Path, data: &[u8]) -> Result<()> {
    let tmp = path.with_extension("yml.tmp");
    fs::write(&tmp, data)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn port_entry(root: &Value, service: &str, index: usize) -> Value {
        root["services"][service]["ports"][index].clone()
    }

    #[test]
    fn free_short_syntax_port_is_kept_and_reserved() {
        let mut inventory = PortInventory::new();
        let mut root = parse("services:\n  web:\n    ports:\n      - \"8080:80\"\n");

        assert!(!rewrite_services(&mut root, &mut inventory));
        assert_eq!(port_entry(&root, "web", 0), Value::String("8080:80".into()));
        assert!(!inventory.is_available(8080));
    }

    #[test]
    fn conflicting_short_syntax_port_moves_to_next_free() {
        let mut inventory = PortInventory::new();
        inventory.mark_used(8080);
        let mut root = parse("services:\n  web:\n    ports:\n      - \"8080:80\"\n");

        assert!(rewrite_services(&mut root, &mut inventory));
        assert_eq!(port_entry(&root, "web", 0), Value::String("8081:80".into()));
        assert!(!inventory.is_available(8081));
    }

    #[test]
    fn host_ip_and_protocol_survive_a_rewrite() {
        let mut inventory = PortInventory::new();
        inventory.mark_used(53);
        let mut root = parse("services:\n  dns:\n    ports:\n      - \"127.0.0.1:53:53/udp\"\n");

        assert!(rewrite_services(&mut root, &mut inventory));
        assert_eq!(
            port_entry(&root, "dns", 0),
            Value::String("127.0.0.1:54:53/udp".into())
        );
    }

    #[test]
    fn port_ranges_are_never_touched() {
        let mut inventory = PortInventory::new();
        inventory.mark_used(8000);
        let mut root = parse("services:\n  web:\n    ports:\n      - \"8000-8010:80\"\n");

        assert!(!rewrite_services(&mut root, &mut inventory));
        assert_eq!(
            port_entry(&root, "web", 0),
            Value::String("8000-8010:80".into())
        );
    }

    #[test]
    fn container_only_entries_are_ignored() {
        let mut inventory = PortInventory::new();
        let mut root = parse("services:\n  web:\n    ports:\n      - 8080\n");
        assert!(!rewrite_services(&mut root, &mut inventory));
        // Nothing was bound on the host, so nothing is reserved either.
        assert!(inventory.is_available(8080));
    }

    #[test]
    fn two_conflicting_entries_get_distinct_replacements() {
        let mut inventory = PortInventory::new();
        inventory.mark_used(8080);
        let mut root = parse(
            "services:\n  a:\n    ports:\n      - \"8080:80\"\n  b:\n    ports:\n      - \"8080:81\"\n",
        );

        assert!(rewrite_services(&mut root, &mut inventory));
        assert_eq!(port_entry(&root, "a", 0), Value::String("8081:80".into()));
        assert_eq!(port_entry(&root, "b", 0), Value::String("8082:81".into()));
    }

    #[test]
    fn long_syntax_rewrites_only_the_published_scalar() {
        let mut inventory = PortInventory::new();
        inventory.mark_used(8080);
        let mut root = parse(
            "services:\n  web:\n    ports:\n      - published: 8080\n        target: 80\n        protocol: tcp\n",
        );

        assert!(rewrite_services(&mut root, &mut inventory));
        let entry = port_entry(&root, "web", 0);
        assert_eq!(entry["published"], Value::Number(8081.into()));
        assert_eq!(entry["target"], Value::Number(80.into()));
        assert_eq!(entry["protocol"], Value::String("tcp".into()));
    }

    #[test]
    fn quoted_published_port_stays_a_string() {
        let mut inventory = PortInventory::new();
        inventory.mark_used(9000);
        let mut root = parse(
            "services:\n  web:\n    ports:\n      - published: \"9000\"\n        target: 80\n",
        );

        assert!(rewrite_services(&mut root, &mut inventory));
        assert_eq!(
            port_entry(&root, "web", 0)["published"],
            Value::String("9001".into())
        );
    }

    #[test]
    fn interpolation_placeholders_are_never_rewritten() {
        let mut inventory = PortInventory::new();
        for port in 1..=100u16 {
            inventory.mark_used(port);
        }
        let mut root = parse(
            "services:\n  web:\n    ports:\n      - published: \"${PORT}\"\n        target: 80\n",
        );

        assert!(!rewrite_services(&mut root, &mut inventory));
        assert_eq!(
            port_entry(&root, "web", 0)["published"],
            Value::String("${PORT}".into())
        );
    }

    #[test]
    fn empty_and_ranged_published_values_are_skipped() {
        let mut inventory = PortInventory::new();
        let mut root = parse(
            "services:\n  a:\n    ports:\n      - published: \"\"\n        target: 80\n  b:\n    ports:\n      - published: \"8000-8010\"\n        target: 80\n",
        );
        assert!(!rewrite_services(&mut root, &mut inventory));
    }

    #[test]
    fn exhaustion_skips_one_entry_but_processes_the_rest() {
        let mut inventory = PortInventory::new();
        // 8000 and its whole probe window are taken.
        for port in 8000..8101 {
            inventory.mark_used(port);
        }
        inventory.mark_used(9000);
        let mut root = parse(
            "services:\n  a:\n    ports:\n      - \"8000:80\"\n  b:\n    ports:\n      - \"9000:90\"\n",
        );

        assert!(rewrite_services(&mut root, &mut inventory));
        // The exhausted entry keeps its declared port.
        assert_eq!(port_entry(&root, "a", 0), Value::String("8000:80".into()));
        assert_eq!(port_entry(&root, "b", 0), Value::String("9001:90".into()));
    }

    #[test]
    fn documents_without_services_are_untouched() {
        let mut inventory = PortInventory::new();
        let mut root = parse("version: \"3\"\n");
        assert!(!rewrite_services(&mut root, &mut inventory));
    }
}
