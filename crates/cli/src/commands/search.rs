use vulnlab_resolver::KeywordMatcher;

use crate::{ui, LabSession};

pub fn run(session: &LabSession, keyword: &str) -> anyhow::Result<()> {
    let catalog = session.catalog()?;
    let matches = KeywordMatcher::find_matches(keyword, &catalog.environments);

    if matches.is_empty() {
        ui::print_info(&format!("no environments match '{keyword}'"));
        return Ok(());
    }

    ui::print_matches(&matches);
    Ok(())
}
