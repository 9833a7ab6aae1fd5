use crate::{ui, LabSession};

pub async fn run(session: &LabSession, keyword: &str, remove_volumes: bool) -> anyhow::Result<()> {
    let env = session.resolve_single(keyword, false)?;
    session.down(&env, remove_volumes).await?;
    ui::print_success(&format!("environment '{}' removed", env.path));
    Ok(())
}
