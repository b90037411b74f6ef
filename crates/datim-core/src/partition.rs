//! Splitting the facility table into named report groups.

use std::collections::{BTreeSet, HashSet};

use datim_model::{OutputLayout, SINGLE_SHEET_NAME};
use polars::prelude::*;

use crate::aggregate::FacilityTable;
use crate::error::{CoreError, Result};

/// Longest group name spreadsheet tools accept.
pub const MAX_GROUP_NAME: usize = 31;

const ILLEGAL: &[char] = &['\\', '/', '*', '?', '[', ']', ':'];

/// One output sheet or file.
#[derive(Debug, Clone)]
pub struct ReportGroup {
    pub name: String,
    pub frame: DataFrame,
}

/// Truncates to [`MAX_GROUP_NAME`] characters, then drops illegal characters.
pub fn sanitize_group_name(project: &str) -> String {
    project
        .chars()
        .take(MAX_GROUP_NAME)
        .filter(|c| !ILLEGAL.contains(c))
        .collect()
}

/// Splits `table` according to `layout`.
///
/// Per-project groups drop the project column and are ordered by project
/// name. Two projects that sanitize to the same name get `_2`, `_3` suffixes.
pub fn partition(table: &FacilityTable, layout: OutputLayout) -> Result<Vec<ReportGroup>> {
    match layout {
        OutputLayout::Single => Ok(vec![ReportGroup {
            name: SINGLE_SHEET_NAME.to_string(),
            frame: table.frame.clone(),
        }]),
        OutputLayout::PerProject => by_project(table),
    }
}

fn by_project(table: &FacilityTable) -> Result<Vec<ReportGroup>> {
    let project_column = table.project_column().ok_or_else(|| CoreError::UnknownColumn {
        column: "ProjectName".to_string(),
    })?;
    let projects = table.frame.column(project_column)?.str()?;

    let names: BTreeSet<&str> = projects.into_iter().flatten().collect();
    let mut used = HashSet::new();
    let mut groups = Vec::with_capacity(names.len());

    for project in names {
        let mask = projects.equal(project);
        let frame = table.frame.filter(&mask)?.drop(project_column)?;
        groups.push(ReportGroup {
            name: unique_name(&sanitize_group_name(project), &mut used),
            frame,
        });
    }

    Ok(groups)
}

/// Sheet names collide case-insensitively, so `used` holds lowercased names.
fn unique_name(base: &str, used: &mut HashSet<String>) -> String {
    let base = if base.is_empty() { "Project" } else { base };
    if used.insert(base.to_lowercase()) {
        return base.to_string();
    }
    (2..)
        .map(|n| {
            let suffix = format!("_{n}");
            let keep = MAX_GROUP_NAME.saturating_sub(suffix.len());
            let stem: String = base.chars().take(keep).collect();
            format!("{stem}{suffix}")
        })
        .find(|candidate| used.insert(candidate.to_lowercase()))
        .unwrap_or_else(|| base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> FacilityTable {
        let frame = df!(
            "ProjectName" => ["ACE-1", "ACE-1", "KP/Care", "KP?Care"],
            "Facility" => ["F1", "F2", "F3", "F4"],
            "TX_CURR" => [3u32, 0, 5, 1],
        )
        .unwrap();
        FacilityTable {
            keys: vec!["ProjectName".into(), "Facility".into()],
            indicators: vec!["TX_CURR".into()],
            frame,
        }
    }

    #[test]
    fn sanitizes_after_truncating() {
        assert_eq!(sanitize_group_name("A/B:C"), "ABC");
        let long = "x".repeat(40);
        assert_eq!(sanitize_group_name(&long).len(), 31);
        // Truncation happens first, so illegal characters shorten the result.
        let name = format!("{}[]", "y".repeat(29));
        assert_eq!(sanitize_group_name(&name), "y".repeat(29));
    }

    #[test]
    fn one_group_per_project_without_project_column() {
        let groups = partition(&table(), OutputLayout::PerProject).unwrap();
        let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["ACE-1", "KPCare", "KPCare_2"]);
        assert_eq!(groups[0].frame.height(), 2);
        assert!(groups[0].frame.column("ProjectName").is_err());
    }

    #[test]
    fn single_layout_keeps_everything() {
        let groups = partition(&table(), OutputLayout::Single).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, SINGLE_SHEET_NAME);
        assert_eq!(groups[0].frame.width(), 3);
    }

    #[test]
    fn long_duplicate_names_stay_within_limit() {
        let mut used = HashSet::new();
        let base = "z".repeat(31);
        assert_eq!(unique_name(&base, &mut used), base);
        let second = unique_name(&base, &mut used);
        assert_eq!(second.chars().count(), 31);
        assert!(second.ends_with("_2"));
    }

    #[test]
    fn names_differing_only_in_case_get_a_suffix() {
        let frame = df!(
            "ProjectName" => ["ACE1", "ace1", "Ace1"],
            "Facility" => ["F1", "F2", "F3"],
            "TX_CURR" => [1u32, 2, 3],
        )
        .unwrap();
        let table = FacilityTable {
            keys: vec!["ProjectName".into(), "Facility".into()],
            indicators: vec!["TX_CURR".into()],
            frame,
        };

        let groups = partition(&table, OutputLayout::PerProject).unwrap();

        let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["ACE1", "Ace1_2", "ace1_3"]);
        assert!(groups.iter().all(|g| g.frame.height() == 1));
    }
}
