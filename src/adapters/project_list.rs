use crate::domain::model::ProjectId;
use crate::utils::error::Result;
use std::path::Path;

/// Reads project identifiers from a `.txt` (one per line) or `.csv` (first
/// column) file. Blank entries are skipped, order and duplicates are kept.
pub fn load_project_ids(path: &Path) -> Result<Vec<ProjectId>> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    let projects = if is_csv {
        read_csv(path)?
    } else {
        read_lines(&std::fs::read_to_string(path)?)
    };

    tracing::info!(
        "📋 Loaded {} project number(s) from {}",
        projects.len(),
        path.display()
    );
    Ok(projects)
}

fn read_lines(content: &str) -> Vec<ProjectId> {
    content
        .trim_start_matches('\u{feff}')
        .lines()
        .filter_map(ProjectId::parse)
        .collect()
}

fn read_csv(path: &Path) -> Result<Vec<ProjectId>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut projects = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(project) = record.get(0).and_then(ProjectId::parse) {
            projects.push(project);
        }
    }
    Ok(projects)
}
