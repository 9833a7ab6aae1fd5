use vulnlab_compose::UpOptions;

use crate::{ui, LabSession};

pub async fn run(
    session: &LabSession,
    keyword: &str,
    assume_yes: bool,
    options: UpOptions,
) -> anyhow::Result<()> {
    let env = session.resolve_single(keyword, assume_yes)?;

    ui::print_info(&format!("starting environment {}", env.path));
    session.start(&env, options).await?;

    let status = session.status_of(&env).await;
    if !status.containers.is_empty() {
        println!();
        ui::print_statuses(std::slice::from_ref(&status));
    }

    ui::print_success(&format!("environment '{}' started", env.path));
    Ok(())
}
