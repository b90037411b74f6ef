//! Indicator catalog: an ordered list of named row criteria.

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};
use std::sync::Arc;

use datim_model::{PipelineKind, ReportingPeriod};
use datim_normalize::Row;
use serde::Serialize;

type Test = Arc<dyn Fn(&Row<'_>, &ReportingPeriod) -> bool + Send + Sync>;

/// A pure boolean condition over one record and the reporting period.
///
/// Criteria remember which source columns they read so the evaluator can skip
/// an indicator whose columns are absent instead of silently counting zero.
/// They compose with `&`, `|` and `!`.
#[derive(Clone)]
pub struct Criterion {
    columns: Vec<&'static str>,
    test: Test,
}

impl Criterion {
    pub fn new<F>(columns: &[&'static str], test: F) -> Self
    where
        F: Fn(&Row<'_>, &ReportingPeriod) -> bool + Send + Sync + 'static,
    {
        let mut criterion = Self {
            columns: Vec::with_capacity(columns.len()),
            test: Arc::new(test),
        };
        criterion.absorb(columns);
        criterion
    }

    /// A criterion that every record satisfies.
    pub fn always() -> Self {
        Self::new(&[], |_, _| true)
    }

    pub fn columns(&self) -> &[&'static str] {
        &self.columns
    }

    pub fn matches(&self, row: &Row<'_>, period: &ReportingPeriod) -> bool {
        (self.test)(row, period)
    }

    pub fn and(self, other: Criterion) -> Self {
        let (left, right) = (self.test, other.test);
        let mut combined = Self {
            columns: self.columns,
            test: Arc::new(move |row: &Row<'_>, period: &ReportingPeriod| {
                left(row, period) && right(row, period)
            }),
        };
        combined.absorb(&other.columns);
        combined
    }

    pub fn or(self, other: Criterion) -> Self {
        let (left, right) = (self.test, other.test);
        let mut combined = Self {
            columns: self.columns,
            test: Arc::new(move |row: &Row<'_>, period: &ReportingPeriod| {
                left(row, period) || right(row, period)
            }),
        };
        combined.absorb(&other.columns);
        combined
    }

    fn absorb(&mut self, columns: &[&'static str]) {
        for column in columns {
            if !self.columns.contains(column) {
                self.columns.push(column);
            }
        }
    }
}

impl fmt::Debug for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Criterion")
            .field("columns", &self.columns)
            .finish_non_exhaustive()
    }
}

impl BitAnd for Criterion {
    type Output = Criterion;

    fn bitand(self, rhs: Criterion) -> Criterion {
        self.and(rhs)
    }
}

impl BitOr for Criterion {
    type Output = Criterion;

    fn bitor(self, rhs: Criterion) -> Criterion {
        self.or(rhs)
    }
}

impl Not for Criterion {
    type Output = Criterion;

    fn not(self) -> Criterion {
        let inner = self.test;
        Criterion {
            columns: self.columns,
            test: Arc::new(move |row: &Row<'_>, period: &ReportingPeriod| !inner(row, period)),
        }
    }
}

/// Conjunction of every criterion; true when empty.
pub fn all(criteria: impl IntoIterator<Item = Criterion>) -> Criterion {
    criteria
        .into_iter()
        .reduce(Criterion::and)
        .unwrap_or_else(Criterion::always)
}

/// Disjunction of every criterion; false when empty.
pub fn any(criteria: impl IntoIterator<Item = Criterion>) -> Criterion {
    criteria
        .into_iter()
        .reduce(Criterion::or)
        .unwrap_or_else(|| !Criterion::always())
}

/// One named indicator and the criterion defining its cohort.
#[derive(Debug, Clone)]
pub struct IndicatorDef {
    pub name: String,
    pub criterion: Criterion,
}

impl IndicatorDef {
    /// Source columns the criterion reads.
    pub fn requires(&self) -> &[&'static str] {
        self.criterion.columns()
    }
}

/// Serializable view of a catalog entry, for `indicators` listings.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorListing {
    pub name: String,
    pub requires: Vec<&'static str>,
}

/// The ordered indicator set of one pipeline. Output columns follow this order.
#[derive(Debug, Clone)]
pub struct IndicatorCatalog {
    pub pipeline: PipelineKind,
    indicators: Vec<IndicatorDef>,
}

impl IndicatorCatalog {
    pub fn new(pipeline: PipelineKind) -> Self {
        Self {
            pipeline,
            indicators: Vec::new(),
        }
    }

    /// Appends an indicator. Later definitions with a repeated name are a
    /// programming error and are rejected in tests, not at runtime.
    pub fn push(&mut self, name: impl Into<String>, criterion: Criterion) -> &mut Self {
        self.indicators.push(IndicatorDef {
            name: name.into(),
            criterion,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }

    pub fn definitions(&self) -> &[IndicatorDef] {
        &self.indicators
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IndicatorDef> {
        self.indicators.iter()
    }

    pub fn get(&self, name: &str) -> Option<&IndicatorDef> {
        self.indicators.iter().find(|def| def.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.indicators.iter().map(|def| def.name.as_str())
    }

    pub fn listing(&self) -> Vec<IndicatorListing> {
        self.indicators
            .iter()
            .map(|def| IndicatorListing {
                name: def.name.clone(),
                requires: def.requires().to_vec(),
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a IndicatorCatalog {
    type Item = &'a IndicatorDef;
    type IntoIter = std::slice::Iter<'a, IndicatorDef>;

    fn into_iter(self) -> Self::IntoIter {
        self.indicators.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::{all, any};
    use chrono::NaiveDate;
    use datim_normalize::{CanonicalTable, NormalizationPlan, normalize};
    use polars::prelude::*;

    fn period() -> ReportingPeriod {
        ReportingPeriod::new(
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 9, 30).unwrap(),
        )
        .unwrap()
    }

    fn table() -> CanonicalTable {
        let df = DataFrame::new(vec![
            Series::new("Sex".into(), &["Female", "Male"]).into_column(),
        ])
        .unwrap();
        normalize(&df, &NormalizationPlan::new()).unwrap().0
    }

    fn female() -> Criterion {
        Criterion::new(&["Sex"], |row, _| row.text("Sex") == Some("Female"))
    }

    #[test]
    fn combinators_merge_columns_once() {
        let age = Criterion::new(&["Age", "Sex"], |_, _| true);
        let combined = female() & age;
        assert_eq!(combined.columns(), &["Sex", "Age"]);
    }

    #[test]
    fn boolean_algebra() {
        let table = table();
        let period = period();
        let (f, m) = (table.row(0), table.row(1));

        assert!(female().matches(&f, &period));
        assert!(!(!female()).matches(&f, &period));
        assert!((female() | !female()).matches(&m, &period));
        assert!(!(female() & !female()).matches(&f, &period));
        assert!(all([]).matches(&m, &period));
        assert!(!any([]).matches(&m, &period));
    }

    #[test]
    fn catalog_keeps_order() {
        let mut catalog = IndicatorCatalog::new(PipelineKind::Hts);
        catalog.push("B", female()).push("A", Criterion::always());
        let names: Vec<_> = catalog.names().collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(catalog.get("B").unwrap().requires(), &["Sex"]);
    }
}
