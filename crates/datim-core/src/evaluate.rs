//! Cohort evaluation: every indicator against every row.

use std::time::Instant;

use datim_indicators::{IndicatorCatalog, IndicatorDef};
use datim_model::{PipelineKind, ReportingPeriod};
use datim_normalize::CanonicalTable;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CohortStatus {
    Evaluated,
    /// The table lacks columns the indicator reads; its cohort is empty.
    Skipped { missing: Vec<String> },
}

/// Rows satisfying one indicator.
#[derive(Debug, Clone)]
pub struct Cohort {
    pub indicator: String,
    pub status: CohortStatus,
    pub mask: Vec<bool>,
}

impl Cohort {
    pub fn count(&self) -> usize {
        self.mask.iter().filter(|hit| **hit).count()
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.status, CohortStatus::Skipped { .. })
    }
}

/// All cohorts of one pipeline, in catalog order.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub pipeline: PipelineKind,
    pub rows: usize,
    cohorts: Vec<Cohort>,
}

impl Evaluation {
    pub fn cohorts(&self) -> &[Cohort] {
        &self.cohorts
    }

    pub fn get(&self, indicator: &str) -> Option<&Cohort> {
        self.cohorts.iter().find(|c| c.indicator == indicator)
    }

    /// Matched record count per indicator.
    pub fn counts(&self) -> Vec<(&str, usize)> {
        self.cohorts
            .iter()
            .map(|c| (c.indicator.as_str(), c.count()))
            .collect()
    }

    pub fn skipped(&self) -> impl Iterator<Item = &Cohort> {
        self.cohorts.iter().filter(|c| c.is_skipped())
    }
}

/// Evaluates each indicator independently and in parallel.
///
/// An indicator whose columns are absent yields an all-false cohort and a
/// warning; the remaining indicators are unaffected.
pub fn evaluate(
    table: &CanonicalTable,
    catalog: &IndicatorCatalog,
    period: &ReportingPeriod,
) -> Evaluation {
    let started = Instant::now();

    let cohorts: Vec<Cohort> = catalog
        .definitions()
        .par_iter()
        .map(|def| evaluate_one(table, def, period))
        .collect();

    debug!(
        pipeline = %catalog.pipeline,
        indicators = cohorts.len(),
        rows = table.len(),
        duration_ms = started.elapsed().as_millis(),
        "cohorts evaluated"
    );

    Evaluation {
        pipeline: catalog.pipeline,
        rows: table.len(),
        cohorts,
    }
}

fn evaluate_one(table: &CanonicalTable, def: &IndicatorDef, period: &ReportingPeriod) -> Cohort {
    let missing: Vec<String> = def
        .requires()
        .iter()
        .filter(|column| !table.has_column(column))
        .map(|column| (*column).to_string())
        .collect();

    if !missing.is_empty() {
        warn!(
            indicator = %def.name,
            missing = ?missing,
            "indicator skipped, required columns absent"
        );
        return Cohort {
            indicator: def.name.clone(),
            status: CohortStatus::Skipped { missing },
            mask: vec![false; table.len()],
        };
    }

    let mask = table
        .rows()
        .map(|row| def.criterion.matches(&row, period))
        .collect();

    Cohort {
        indicator: def.name.clone(),
        status: CohortStatus::Evaluated,
        mask,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use datim_indicators::Criterion;
    use datim_normalize::{NormalizationPlan, normalize};
    use polars::prelude::*;

    fn period() -> ReportingPeriod {
        ReportingPeriod::new(
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 9, 30).unwrap(),
        )
        .unwrap()
    }

    fn table() -> CanonicalTable {
        let df = df!(
            "Sex" => ["Female", "Male", "Female"],
            "Facility" => ["A", "A", "B"],
        )
        .unwrap();
        normalize(&df, &NormalizationPlan::new()).unwrap().0
    }

    fn catalog() -> IndicatorCatalog {
        let mut catalog = IndicatorCatalog::new(PipelineKind::Hts);
        catalog
            .push(
                "Female",
                Criterion::new(&["Sex"], |row, _| row.text("Sex") == Some("Female")),
            )
            .push(
                "NeedsAge",
                Criterion::new(&["Age", "Sex"], |row, _| row.number("Age").is_some()),
            )
            .push("Everyone", Criterion::always());
        catalog
    }

    #[test]
    fn keeps_catalog_order_and_counts() {
        let evaluation = evaluate(&table(), &catalog(), &period());
        assert_eq!(
            evaluation.counts(),
            vec![("Female", 2), ("NeedsAge", 0), ("Everyone", 3)]
        );
        assert_eq!(evaluation.get("Female").unwrap().mask, vec![true, false, true]);
    }

    #[test]
    fn missing_column_skips_only_that_indicator() {
        let evaluation = evaluate(&table(), &catalog(), &period());
        let skipped: Vec<_> = evaluation.skipped().map(|c| c.indicator.as_str()).collect();
        assert_eq!(skipped, vec!["NeedsAge"]);
        assert_eq!(
            evaluation.get("NeedsAge").unwrap().status,
            CohortStatus::Skipped {
                missing: vec!["Age".to_string()]
            }
        );
        assert_eq!(evaluation.get("NeedsAge").unwrap().mask, vec![false; 3]);
        assert!(!evaluation.get("Everyone").unwrap().is_skipped());
    }
}
