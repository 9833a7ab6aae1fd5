use assert_cmd::Command;
use predicates::prelude::*;

fn seeded_home() -> tempfile::TempDir {
    let home = tempfile::tempdir().unwrap();
    std::fs::write(
        home.path().join("environments.toml"),
        r#"
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

[[environment]]
path = "struts2/s2-045"
name = "Struts2 s2-045"
app = "struts2"
"#,
    )
    .unwrap();
    home
}

fn vulnlab(home: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("vulnlab").unwrap();
    cmd.env("VULNLAB_HOME", home.path());
    cmd
}

#[test]
fn search_ranks_an_exact_cve_first() {
    let home = seeded_home();
    vulnlab(&home)
        .args(["search", "CVE-2021-44228"])
        .assert()
        .success()
        .stdout(predicate::str::contains("log4j/CVE-2021-44228"));
}

#[test]
fn search_reports_when_nothing_matches() {
    let home = seeded_home();
    vulnlab(&home)
        .args(["search", "drupal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no environments match"));
}

#[test]
fn list_filters_by_app() {
    let home = seeded_home();
    vulnlab(&home)
        .args(["list", "--app", "struts2"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("struts2/s2-001")
                .and(predicate::str::contains("struts2/s2-045"))
                .and(predicate::str::contains("log4j").not()),
        );
}

#[test]
fn info_resolves_an_exact_path_without_prompting() {
    let home = seeded_home();
    vulnlab(&home)
        .args(["info", "struts2/s2-001"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("struts2/s2-001")
                .and(predicate::str::contains("not fetched")),
        );
}

#[test]
fn missing_catalog_is_a_readable_error() {
    let home = tempfile::tempdir().unwrap();
    vulnlab(&home)
        .args(["search", "anything"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("catalog file not found"));
}

#[test]
fn start_with_yes_rejects_ambiguous_keywords() {
    let home = seeded_home();
    vulnlab(&home)
        .args(["start", "--yes", "struts2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("more specific keyword"));
}
