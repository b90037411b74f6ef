//! Builds a [`CanonicalTable`] from the merged extract.

use std::collections::BTreeMap;

use datim_common::string_cells;
use datim_model::{Cd4Count, DateValue, ViralLoad};
use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cd4::parse_cd4;
use crate::date::parse_date;
use crate::error::{NormalizeError, Result};
use crate::numeric::{parse_age, parse_count};
use crate::plan::NormalizationPlan;
use crate::table::CanonicalTable;
use crate::viral_load::parse_viral_load;

const SAMPLE_LIMIT: usize = 5;

/// What kind of cell-level problem a [`ColumnIssue`] counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    InvalidDate,
    NullViralLoad,
    NullCd4,
    UnparsedNumber,
}

/// Cells in one column that normalized to a sentinel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnIssue {
    pub column: String,
    pub kind: IssueKind,
    pub count: usize,
    /// First few distinct raw values, for the log.
    pub samples: Vec<String>,
}

/// Summary of a normalization pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NormalizationReport {
    pub rows: usize,
    pub columns: usize,
    /// Plan columns the extract did not carry.
    pub missing_columns: Vec<String>,
    pub issues: Vec<ColumnIssue>,
    /// Cells rewritten by label rules, per column.
    pub relabelled: BTreeMap<String, usize>,
}

impl NormalizationReport {
    pub fn issue_count(&self, kind: IssueKind) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.kind == kind)
            .map(|issue| issue.count)
            .sum()
    }
}

struct IssueTally {
    count: usize,
    samples: Vec<String>,
}

impl IssueTally {
    fn new() -> Self {
        Self {
            count: 0,
            samples: Vec::new(),
        }
    }

    fn record(&mut self, raw: &str) {
        self.count += 1;
        if self.samples.len() < SAMPLE_LIMIT && !self.samples.iter().any(|s| s == raw) {
            self.samples.push(raw.to_string());
        }
    }

    fn finish(self, column: &str, kind: IssueKind) -> Option<ColumnIssue> {
        (self.count > 0).then(|| ColumnIssue {
            column: column.to_string(),
            kind,
            count: self.count,
            samples: self.samples,
        })
    }
}

/// Normalizes every column of `df` according to `plan`.
///
/// All source columns become trimmed text with blanks as `None`. Label rules
/// run on that text, then the typed columns are parsed from it.
pub fn normalize(
    df: &DataFrame,
    plan: &NormalizationPlan,
) -> Result<(CanonicalTable, NormalizationReport)> {
    let mut table = CanonicalTable {
        len: df.height(),
        ..CanonicalTable::default()
    };
    let mut report = NormalizationReport {
        rows: df.height(),
        columns: df.width(),
        ..NormalizationReport::default()
    };

    for name in df.get_column_names() {
        let cells = string_cells(df, name.as_str()).map_err(|source| NormalizeError::ColumnRead {
            column: name.to_string(),
            source,
        })?;
        let trimmed = cells
            .into_iter()
            .map(|cell| {
                cell.map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
            })
            .collect();
        table.text.insert(name.to_string(), trimmed);
    }

    apply_labels(&mut table, plan, &mut report);

    let require = |column: &str, report: &mut NormalizationReport| -> bool {
        let present = table.text.contains_key(column);
        if !present && !report.missing_columns.iter().any(|c| c == column) {
            report.missing_columns.push(column.to_string());
        }
        present
    };

    let mut dates = BTreeMap::new();
    for &column in &plan.dates {
        if !require(column, &mut report) {
            continue;
        }
        let mut tally = IssueTally::new();
        let values: Vec<DateValue> = text_of(&table, column)
            .iter()
            .map(|cell| {
                let parsed = parse_date(cell.as_deref());
                if let DateValue::Invalid(raw) = &parsed {
                    tally.record(raw);
                }
                parsed
            })
            .collect();
        if let Some(issue) = tally.finish(column, IssueKind::InvalidDate) {
            warn!(
                column,
                count = issue.count,
                "invalid dates excluded from date comparisons"
            );
            report.issues.push(issue);
        }
        dates.insert(column.to_string(), values);
    }

    let mut numbers = BTreeMap::new();
    let numeric = plan
        .ages
        .iter()
        .map(|c| (*c, parse_age as fn(Option<&str>) -> Option<f64>))
        .chain(plan.counts.iter().map(|c| (*c, parse_count as fn(Option<&str>) -> Option<f64>)));
    for (column, parse) in numeric {
        if !require(column, &mut report) {
            continue;
        }
        let mut tally = IssueTally::new();
        let values: Vec<Option<f64>> = text_of(&table, column)
            .iter()
            .map(|cell| {
                let parsed = parse(cell.as_deref());
                if let (None, Some(raw)) = (parsed, cell) {
                    tally.record(raw);
                }
                parsed
            })
            .collect();
        if let Some(issue) = tally.finish(column, IssueKind::UnparsedNumber) {
            debug!(column, count = issue.count, "non-numeric values treated as missing");
            report.issues.push(issue);
        }
        numbers.insert(column.to_string(), values);
    }

    let mut viral_loads = BTreeMap::new();
    for &column in &plan.viral_loads {
        if !require(column, &mut report) {
            continue;
        }
        let mut tally = IssueTally::new();
        let values: Vec<ViralLoad> = text_of(&table, column)
            .iter()
            .map(|cell| {
                let parsed = parse_viral_load(cell.as_deref());
                if let (ViralLoad::Null, Some(raw)) = (parsed, cell) {
                    tally.record(raw);
                }
                parsed
            })
            .collect();
        if let Some(issue) = tally.finish(column, IssueKind::NullViralLoad) {
            debug!(column, count = issue.count, "unparseable viral load results set to NULL");
            report.issues.push(issue);
        }
        viral_loads.insert(column.to_string(), values);
    }

    let mut cd4_counts = BTreeMap::new();
    for &column in &plan.cd4_counts {
        if !require(column, &mut report) {
            continue;
        }
        let mut tally = IssueTally::new();
        let values: Vec<Cd4Count> = text_of(&table, column)
            .iter()
            .map(|cell| {
                let parsed = parse_cd4(cell.as_deref());
                if let (Cd4Count::Null, Some(raw)) = (parsed, cell) {
                    tally.record(raw);
                }
                parsed
            })
            .collect();
        if let Some(issue) = tally.finish(column, IssueKind::NullCd4) {
            debug!(column, count = issue.count, "unusable CD4 values set to NULL");
            report.issues.push(issue);
        }
        cd4_counts.insert(column.to_string(), values);
    }

    table.dates = dates;
    table.numbers = numbers;
    table.viral_loads = viral_loads;
    table.cd4_counts = cd4_counts;

    if !report.missing_columns.is_empty() {
        warn!(
            columns = ?report.missing_columns,
            "normalization plan names columns absent from the extract"
        );
    }

    Ok((table, report))
}

fn text_of<'a>(table: &'a CanonicalTable, column: &str) -> &'a [Option<String>] {
    table.text.get(column).map_or(&[], Vec::as_slice)
}

fn apply_labels(table: &mut CanonicalTable, plan: &NormalizationPlan, report: &mut NormalizationReport) {
    for rule in &plan.labels {
        let Some(values) = table.text.get_mut(rule.column()) else {
            continue;
        };
        let mut changed = 0usize;
        for cell in values.iter_mut() {
            let replacement = cell.as_deref().and_then(|value| rule.apply(value));
            if let Some(replacement) = replacement {
                *cell = Some(replacement);
                changed += 1;
            }
        }
        if changed > 0 {
            *report.relabelled.entry(rule.column().to_string()).or_default() += changed;
        }
    }
}
