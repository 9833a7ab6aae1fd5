use vulnlab_catalog::Environment;

use crate::{ui, LabSession};

pub fn run(
    session: &LabSession,
    app: Option<&str>,
    tag: Option<&str>,
    downloaded_only: bool,
) -> anyhow::Result<()> {
    let catalog = session.catalog()?;

    let filtered: Vec<&Environment> = catalog
        .environments
        .iter()
        .filter(|env| app.map_or(true, |a| env.app.eq_ignore_ascii_case(a)))
        .filter(|env| tag.map_or(true, |t| env.tags.iter().any(|et| et.eq_ignore_ascii_case(t))))
        .filter(|env| !downloaded_only || session.paths().environment_present(&env.path))
        .collect();

    if filtered.is_empty() {
        ui::print_info("no environments match the given filters");
        return Ok(());
    }

    ui::print_environments(&filtered);
    Ok(())
}
