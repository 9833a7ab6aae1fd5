use crate::{ui, LabSession};

pub async fn run(session: &LabSession, keyword: Option<&str>) -> anyhow::Result<()> {
    let statuses = match keyword {
        Some(keyword) => {
            let env = session.resolve_single(keyword, false)?;
            vec![session.status_of(&env).await]
        }
        None => session.status_of_present().await?,
    };

    if statuses.is_empty() {
        ui::print_info("no environments are present on disk");
        return Ok(());
    }

    ui::print_statuses(&statuses);
    Ok(())
}
