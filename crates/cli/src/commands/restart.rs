use crate::{ui, LabSession};

pub async fn run(
    session: &LabSession,
    keyword: &str,
    timeout_secs: Option<u32>,
) -> anyhow::Result<()> {
    let env = session.resolve_single(keyword, false)?;
    session.restart(&env, timeout_secs).await?;
    ui::print_success(&format!("environment '{}' restarted", env.path));
    Ok(())
}
