use anyhow::Context;
use console::style;
use dialoguer::{theme::ColorfulTheme, Select};
use vulnlab_catalog::{Environment, EnvironmentStatus};
use vulnlab_resolver::Match;

/// Interactive picker for an ambiguous keyword.
pub fn select_environment(candidates: &[Match], prompt: &str) -> anyhow::Result<Environment> {
    let items: Vec<String> = candidates.iter().map(|m| describe_match(m)).collect();

    let index = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(&items)
        .default(0)
        .interact()
        .context("selection cancelled")?;

    Ok(candidates[index].environment.clone())
}

fn describe_match(m: &Match) -> String {
    let env = &m.environment;
    let mut line = env.path.clone();
    if !env.name.is_empty() {
        line.push_str(&format!("  {}", env.name));
    }
    line.push_str(&format!("  [{}]", m.kind));
    line
}

pub fn print_matches(matches: &[Match]) {
    for m in matches {
        let env = &m.environment;
        println!(
            "{:<40} {:<30} {:<18} {}",
            style(&env.path).cyan(),
            env.name,
            env.cve.first().map(String::as_str).unwrap_or("-"),
            style(format!("[{}]", m.kind)).dim(),
        );
    }
}

pub fn print_environments(environments: &[&Environment]) {
    for env in environments {
        println!(
            "{:<40} {:<30} {:<18} {}",
            style(&env.path).cyan(),
            env.name,
            env.cve.first().map(String::as_str).unwrap_or("-"),
            env.app,
        );
    }
}

pub fn print_environment_details(env: &Environment, present: bool, local_path: &std::path::Path) {
    println!("{}   {}", style("Path:").bold(), env.path);
    if !env.name.is_empty() {
        println!("{}   {}", style("Name:").bold(), env.name);
    }
    if !env.app.is_empty() {
        println!("{}    {}", style("App:").bold(), env.app);
    }
    if !env.cve.is_empty() {
        println!("{}    {}", style("CVE:").bold(), env.cve.join(", "));
    }
    if !env.tags.is_empty() {
        println!("{}   {}", style("Tags:").bold(), env.tags.join(", "));
    }
    println!(
        "{}  {}",
        style("Local:").bold(),
        if present {
            format!("{} (present)", local_path.display())
        } else {
            format!("{} (not fetched)", local_path.display())
        }
    );
}

pub fn print_statuses(statuses: &[EnvironmentStatus]) {
    for status in statuses {
        let state = if status.running {
            style("running").green()
        } else {
            style("stopped").dim()
        };
        println!("{:<40} {}", style(&status.environment.path).cyan(), state);

        for container in &status.containers {
            let ports: Vec<String> = container
                .ports
                .iter()
                .map(|p| format!("{}->{}/{}", p.host_port, p.container_port, p.protocol))
                .collect();
            println!(
                "  {:<30} {:<10} {}",
                container.name,
                container.state,
                ports.join(", ")
            );
        }
    }
}

pub fn print_success(message: &str) {
    println!("{} {message}", style("✓").green().bold());
}

pub fn print_info(message: &str) {
    println!("{} {message}", style("•").cyan());
}
