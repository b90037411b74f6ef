//! Merging decoded extracts into one frame.

use std::collections::HashMap;
use std::path::Path;

use polars::prelude::*;
use tracing::warn;

use crate::error::Result;
use crate::reader::SourceTable;

pub const FILENAME_COLUMN: &str = "Filename";
pub const PROJECT_COLUMN: &str = "ProjectName";

/// Project name for an extract: the filename text before the first `_`, or
/// the whole stem when there is none.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use datim_ingest::project_name;
///
/// assert_eq!(project_name(Path::new("ACE1_RADET_Q4.csv")), "ACE1");
/// assert_eq!(project_name(Path::new("/data/radet.csv")), "radet");
/// ```
pub fn project_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match stem.split_once('_') {
        Some((project, _)) => project.to_string(),
        None => stem,
    }
}

/// Stacks extracts into one all-text frame.
///
/// Columns are the union of every header in first-seen order; a file without a
/// column contributes nulls. `Filename` and `ProjectName` are appended from
/// each file's path, replacing any source column of the same name.
pub fn combine_sources(sources: &[SourceTable]) -> Result<DataFrame> {
    let mut order: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for source in sources {
        for header in &source.headers {
            if header == FILENAME_COLUMN || header == PROJECT_COLUMN {
                warn!(
                    path = %source.path.display(),
                    column = header.as_str(),
                    "source column replaced by the derived value"
                );
                continue;
            }
            if !positions.contains_key(header) {
                positions.insert(header.clone(), order.len());
                order.push(header.clone());
            }
        }
    }

    let total_rows: usize = sources.iter().map(|s| s.rows.len()).sum();
    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::with_capacity(total_rows); order.len()];
    let mut filenames: Vec<String> = Vec::with_capacity(total_rows);
    let mut projects: Vec<String> = Vec::with_capacity(total_rows);

    for source in sources {
        let targets: Vec<Option<usize>> = source
            .headers
            .iter()
            .map(|h| positions.get(h).copied())
            .collect();
        let filename = source.file_name();
        let project = project_name(&source.path);

        for row in &source.rows {
            let mut filled = vec![false; order.len()];
            for (value, target) in row.iter().zip(&targets) {
                if let Some(target) = target {
                    cells[*target].push(value.clone());
                    filled[*target] = true;
                }
            }
            for (target, was_filled) in filled.iter().enumerate() {
                if !was_filled {
                    cells[target].push(None);
                }
            }
            filenames.push(filename.clone());
            projects.push(project.clone());
        }
    }

    let mut columns: Vec<Column> = order
        .iter()
        .zip(cells)
        .map(|(name, values)| Series::new(name.as_str().into(), values).into_column())
        .collect();
    columns.push(Series::new(FILENAME_COLUMN.into(), filenames).into_column());
    columns.push(Series::new(PROJECT_COLUMN.into(), projects).into_column());

    Ok(DataFrame::new(columns)?)
}
