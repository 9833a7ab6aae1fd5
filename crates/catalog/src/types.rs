use serde::{Deserialize, Deserializer, Serialize};

/// One vulnerability-lab definition from the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Relative path inside the lab repository, e.g. `log4j/CVE-2021-44228`.
    /// Unique across the catalog.
    pub path: String,

    /// Human-readable name.
    #[serde(default)]
    pub name: String,

    /// CVE identifiers covered by this lab, possibly empty.
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub cve: Vec<String>,

    /// Application name, e.g. `log4j`, `struts2`.
    #[serde(default)]
    pub app: String,

    /// Searchable tags, possibly empty.
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub tags: Vec<String>,
}

impl Environment {
    /// First CVE identifier, if any.
    #[must_use]
    pub fn primary_cve(&self) -> Option<&str> {
        self.cve.first().map(String::as_str)
    }

    #[must_use]
    pub fn has_cve(&self, cve: &str) -> bool {
        self.cve.iter().any(|c| c.eq_ignore_ascii_case(cve))
    }
}

/// The on-disk catalog: a list of `[[environment]]` tables plus the global
/// tag vocabulary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentList {
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub tags: Vec<String>,

    #[serde(default, rename = "environment")]
    pub environments: Vec<Environment>,
}

// Catalog files are fetched from an external source; a single mistyped tag
// must not make the whole catalog unreadable. Non-string entries are dropped,
// not surfaced as parse errors.
fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<toml::Value>::deserialize(deserializer)?;
    Ok(values
        .into_iter()
        .filter_map(|value| match value {
            toml::Value::String(s) => Some(s),
            _ => None,
        })
        .collect())
}

/// A published port of a running container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortBinding {
    pub host_ip: String,
    pub host_port: String,
    pub container_port: String,
    pub protocol: String,
}

/// Status of one container belonging to an environment.
#[derive(Debug, Clone, Default)]
pub struct ContainerStatus {
    pub id: String,
    pub name: String,
    pub image: String,
    pub service: String,
    pub status: String,
    pub state: String,
    pub ports: Vec<PortBinding>,
}

impl ContainerStatus {
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == "running"
    }
}

/// An environment together with its live container state.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentStatus {
    pub environment: Environment,
    pub containers: Vec<ContainerStatus>,
    pub running: bool,
    pub local_path: std::path::PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_environment_tables() {
        let list: EnvironmentList = toml::from_str(
            r#"
            tags = ["rce", "deserialization"]

            [[environment]]
            path = "log4j/CVE-2021-44228"
            name = "Log4Shell"
            cve = ["CVE-2021-44228"]
            app = "log4j"
            tags = ["rce"]

            [[environment]]
            path = "struts2/s2-001"
            name = "Struts2 s2-001"
            app = "struts2"
            "#,
        )
        .unwrap();

        assert_eq!(list.environments.len(), 2);
        assert_eq!(list.environments[0].primary_cve(), Some("CVE-2021-44228"));
        assert!(list.environments[1].cve.is_empty());
        assert!(list.environments[1].tags.is_empty());
    }

    #[test]
    fn drops_non_string_entries_instead_of_failing() {
        let list: EnvironmentList = toml::from_str(
            r#"
            [[environment]]
            path = "demo/app"
            cve = ["CVE-2020-0001", 2020]
            tags = [1, "web"]
            "#,
        )
        .unwrap();

        assert_eq!(list.environments[0].cve, vec!["CVE-2020-0001"]);
        assert_eq!(list.environments[0].tags, vec!["web"]);
    }

    #[test]
    fn has_cve_is_case_insensitive() {
        let env = Environment {
            path: "log4j/CVE-2021-44228".into(),
            name: String::new(),
            cve: vec!["CVE-2021-44228".into()],
            app: "log4j".into(),
            tags: Vec::new(),
        };
        assert!(env.has_cve("cve-2021-44228"));
        assert!(!env.has_cve("CVE-2021-44229"));
    }
}
