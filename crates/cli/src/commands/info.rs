use crate::{ui, LabSession};

pub fn run(session: &LabSession, keyword: &str) -> anyhow::Result<()> {
    let env = session.resolve_single(keyword, false)?;
    let present = session.paths().environment_present(&env.path);
    ui::print_environment_details(&env, present, &session.work_dir(&env));
    Ok(())
}
