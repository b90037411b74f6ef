//! Per-facility counts: one row per distinct key tuple, one column per
//! indicator.

use datim_normalize::CanonicalTable;
use polars::prelude::*;

use crate::error::{CoreError, Result};
use crate::evaluate::Evaluation;

/// Wide facility table, sorted by the key columns.
#[derive(Debug, Clone)]
pub struct FacilityTable {
    pub keys: Vec<String>,
    pub indicators: Vec<String>,
    pub frame: DataFrame,
}

impl FacilityTable {
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Project column; always the first key.
    pub fn project_column(&self) -> Option<&str> {
        self.keys.first().map(String::as_str)
    }

    /// Count for one facility row and indicator.
    pub fn count(&self, row: usize, indicator: &str) -> Result<u32> {
        let column = self.indicator_column(indicator)?;
        Ok(column.get(row).unwrap_or(0))
    }

    /// Facilities with at least one matching record for `indicator`.
    pub fn facilities_reporting(&self, indicator: &str) -> Result<usize> {
        let column = self.indicator_column(indicator)?;
        Ok(column.into_iter().filter(|v| v.is_some_and(|n| n > 0)).count())
    }

    fn indicator_column(&self, indicator: &str) -> Result<&UInt32Chunked> {
        if !self.indicators.iter().any(|name| name == indicator) {
            return Err(CoreError::UnknownColumn {
                column: indicator.to_string(),
            });
        }
        Ok(self.frame.column(indicator)?.u32()?)
    }
}

/// Groups every cohort by `keys` and merges the counts into one table.
///
/// Facilities come from the whole table, not from the cohorts, so a facility
/// with no matches still gets a row of zeros.
pub fn aggregate(
    table: &CanonicalTable,
    keys: &[&str],
    evaluation: &Evaluation,
) -> Result<FacilityTable> {
    let mut columns = Vec::with_capacity(keys.len() + evaluation.cohorts().len());

    for key in keys {
        let values = table
            .text_column(key)
            .ok_or_else(|| CoreError::MissingKeyColumn {
                column: (*key).to_string(),
            })?;
        columns.push(Series::new((*key).into(), values.to_vec()).into_column());
    }

    for cohort in evaluation.cohorts() {
        let hits: Vec<u32> = cohort.mask.iter().map(|hit| u32::from(*hit)).collect();
        columns.push(Series::new(cohort.indicator.as_str().into(), hits).into_column());
    }

    let key_exprs: Vec<Expr> = keys.iter().map(|key| col(*key)).collect();
    let sums: Vec<Expr> = evaluation
        .cohorts()
        .iter()
        .map(|cohort| {
            col(cohort.indicator.as_str())
                .sum()
                .cast(DataType::UInt32)
                .alias(cohort.indicator.as_str())
        })
        .collect();

    let frame = DataFrame::new(columns)?
        .lazy()
        .group_by(key_exprs.clone())
        .agg(sums)
        .sort_by_exprs(key_exprs, SortMultipleOptions::default().with_nulls_last(true))
        .collect()?;

    Ok(FacilityTable {
        keys: keys.iter().map(|key| (*key).to_string()).collect(),
        indicators: evaluation
            .cohorts()
            .iter()
            .map(|cohort| cohort.indicator.clone())
            .collect(),
        frame,
    })
}
