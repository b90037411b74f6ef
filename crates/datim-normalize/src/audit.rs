//! Distinct-value audit tables written next to the indicator report.
//!
//! They let a data manager see how free text was interpreted (viral load, CD4)
//! and which setting/modality combinations appear in the quarter.

use std::collections::BTreeSet;

use datim_common::format_numeric;
use datim_model::{Cd4Count, ReportingPeriod, ViralLoad};
use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};
use serde::Serialize;
use tracing::warn;

use crate::error::{NormalizeError, Result};
use crate::table::CanonicalTable;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "audit", rename_all = "snake_case")]
pub enum AuditSpec {
    /// Raw viral load text beside its canonical value.
    ViralLoadPairs { column: &'static str },
    /// Raw CD4 text beside its canonical value.
    Cd4Pairs { column: &'static str },
    /// Distinct combinations of setting columns for records dated on or after
    /// the quarter start.
    SettingTuples {
        columns: Vec<&'static str>,
        date_column: &'static str,
    },
}

impl AuditSpec {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ViralLoadPairs { .. } => "viral_load_values",
            Self::Cd4Pairs { .. } => "cd4_values",
            Self::SettingTuples { .. } => "testing_settings",
        }
    }
}

/// A finished audit frame.
#[derive(Debug, Clone)]
pub struct AuditTable {
    pub name: &'static str,
    pub frame: DataFrame,
}

/// Builds every audit whose source columns exist.
pub fn build_audits(
    table: &CanonicalTable,
    specs: &[AuditSpec],
    period: &ReportingPeriod,
) -> Result<Vec<AuditTable>> {
    let mut audits = Vec::new();
    for spec in specs {
        let built = match spec {
            AuditSpec::ViralLoadPairs { column } => table
                .viral_load_column(column)
                .map(|cleaned| pair_rows(table, column, cleaned.iter().map(|v| viral_load_label(*v))))
                .map(|rows| (vec![(*column).to_string(), format!("Cleaned {column}")], rows)),
            AuditSpec::Cd4Pairs { column } => table
                .cd4_column(column)
                .map(|cleaned| pair_rows(table, column, cleaned.iter().map(|v| cd4_label(*v))))
                .map(|rows| (vec![(*column).to_string(), format!("Cleaned {column}")], rows)),
            AuditSpec::SettingTuples {
                columns,
                date_column,
            } => setting_rows(table, columns, date_column, period)
                .map(|rows| (columns.iter().map(|c| (*c).to_string()).collect(), rows)),
        };

        let Some((headers, rows)) = built else {
            warn!(audit = spec.name(), "audit skipped: source columns not present");
            continue;
        };
        let frame = to_frame(&headers, &rows).map_err(|source| NormalizeError::Audit {
            name: spec.name().to_string(),
            source,
        })?;
        audits.push(AuditTable {
            name: spec.name(),
            frame,
        });
    }
    Ok(audits)
}

fn viral_load_label(value: ViralLoad) -> String {
    match value {
        ViralLoad::Value(v) => format_numeric(v),
        ViralLoad::Null => "NULL".to_string(),
    }
}

fn cd4_label(value: Cd4Count) -> String {
    match value {
        Cd4Count::Value(v) => format_numeric(v),
        Cd4Count::Null => "NULL".to_string(),
        Cd4Count::Missing => String::new(),
    }
}

fn pair_rows(
    table: &CanonicalTable,
    column: &str,
    cleaned: impl Iterator<Item = String>,
) -> BTreeSet<Vec<String>> {
    let raw = table.text_column(column).unwrap_or_default();
    raw.iter()
        .zip(cleaned)
        .map(|(raw, cleaned)| vec![raw.clone().unwrap_or_default(), cleaned])
        .collect()
}

fn setting_rows(
    table: &CanonicalTable,
    columns: &[&'static str],
    date_column: &str,
    period: &ReportingPeriod,
) -> Option<BTreeSet<Vec<String>>> {
    if !columns.iter().all(|c| table.has_column(c)) || table.date_column(date_column).is_none() {
        return None;
    }
    let rows = table
        .rows()
        .filter(|row| row.date(date_column).is_some_and(|d| d >= period.start()))
        .map(|row| {
            columns
                .iter()
                .map(|column| {
                    if *column == date_column {
                        row.date(column)
                            .map(|d| d.format("%Y-%m-%d").to_string())
                            .unwrap_or_default()
                    } else {
                        row.text(column).unwrap_or_default().to_string()
                    }
                })
                .collect()
        })
        .collect();
    Some(rows)
}

fn to_frame(headers: &[String], rows: &BTreeSet<Vec<String>>) -> polars::prelude::PolarsResult<DataFrame> {
    let columns: Vec<Column> = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            let values: Vec<&str> = rows.iter().map(|row| row[idx].as_str()).collect();
            Series::new(header.as_str().into(), values).into_column()
        })
        .collect();
    DataFrame::new(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use crate::plan::NormalizationPlan;
    use chrono::NaiveDate;
    use polars::prelude::*;

    fn period() -> ReportingPeriod {
        ReportingPeriod::new(
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 9, 30).unwrap(),
        )
        .unwrap()
    }

    fn frame(columns: &[(&str, Vec<&str>)]) -> DataFrame {
        let cols = columns
            .iter()
            .map(|(name, values)| Series::new((*name).into(), values.clone()).into_column())
            .collect();
        DataFrame::new(cols).unwrap()
    }

    #[test]
    fn viral_load_pairs_are_distinct_and_sorted() {
        let df = frame(&[("VL", vec!["TND", "<40", "TND", "abnormal"])]);
        let plan = NormalizationPlan::new().viral_load("VL");
        let (table, _) = normalize(&df, &plan).unwrap();
        let audits = build_audits(&table, &[AuditSpec::ViralLoadPairs { column: "VL" }], &period()).unwrap();

        assert_eq!(audits.len(), 1);
        let frame = &audits[0].frame;
        assert_eq!(audits[0].name, "viral_load_values");
        assert_eq!(frame.height(), 3);
        let raw: Vec<_> = frame.column("VL").unwrap().str().unwrap().into_no_null_iter().collect();
        assert_eq!(raw, vec!["<40", "TND", "abnormal"]);
        let cleaned: Vec<_> = frame
            .column("Cleaned VL")
            .unwrap()
            .str()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(cleaned, vec!["40", "0", "NULL"]);
    }

    #[test]
    fn setting_tuples_keep_quarter_records() {
        let df = frame(&[
            ("Testing Setting", vec!["CT", "CT", "Index", "CT"]),
            ("Modality", vec!["VCT", "VCT", "Index", "VCT"]),
            ("Date", vec!["2025-07-02", "2025-07-02", "2025-06-30", "bad"]),
        ]);
        let plan = NormalizationPlan::new().dates(&["Date"]);
        let (table, _) = normalize(&df, &plan).unwrap();
        let spec = AuditSpec::SettingTuples {
            columns: vec!["Testing Setting", "Modality", "Date"],
            date_column: "Date",
        };
        let audits = build_audits(&table, &[spec], &period()).unwrap();
        assert_eq!(audits[0].frame.height(), 1);
    }

    #[test]
    fn missing_columns_skip_audit() {
        let df = frame(&[("Sex", vec!["Male"])]);
        let (table, _) = normalize(&df, &NormalizationPlan::new()).unwrap();
        let audits = build_audits(&table, &[AuditSpec::Cd4Pairs { column: "CD4" }], &period()).unwrap();
        assert!(audits.is_empty());
    }
}
