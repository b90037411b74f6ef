//! Reusable criterion builders.
//!
//! Text comparisons run on trimmed cells (normalization trims every value).
//! `one_of` is exact membership; `contains_any` is case-sensitive substring
//! search, matching how the extracts spell their categories.

use std::ops::RangeBounds;

use chrono::NaiveDate;
use datim_model::{Cd4Class, DateWindow, ReportingPeriod};

use crate::catalog::Criterion;

pub const SEX: &str = "Sex";
pub const AGE: &str = "Age";
pub const VERIFICATION: &str = "Client Verification Outcome";

/// Verification outcomes accepted as valid. A blank outcome also passes.
const VALID_OUTCOMES: &[&str] = &["valid", "Valid"];

// === Dates ===

/// The date in `column` falls inside the window chosen from the period.
pub fn date_in(column: &'static str, window: fn(&ReportingPeriod) -> DateWindow) -> Criterion {
    Criterion::new(&[column], move |row, period| {
        row.date(column).is_some_and(|d| window(period).contains(d))
    })
}

/// The date in `column` is strictly before the bound chosen from the period.
pub fn date_before(column: &'static str, bound: fn(&ReportingPeriod) -> NaiveDate) -> Criterion {
    Criterion::new(&[column], move |row, period| {
        row.date(column).is_some_and(|d| d < bound(period))
    })
}

/// Days from `from` to `to` fall in `range`. Both dates must be valid.
pub fn elapsed_days<R>(from: &'static str, to: &'static str, range: R) -> Criterion
where
    R: RangeBounds<i64> + Send + Sync + 'static,
{
    Criterion::new(&[from, to], move |row, _| {
        match (row.date(from), row.date(to)) {
            (Some(start), Some(end)) => range.contains(&(end - start).num_days()),
            _ => false,
        }
    })
}

// === Text ===

pub fn one_of(column: &'static str, values: &'static [&'static str]) -> Criterion {
    Criterion::new(&[column], move |row, _| {
        row.text(column).is_some_and(|v| values.contains(&v))
    })
}

pub fn equals(column: &'static str, value: &'static str) -> Criterion {
    Criterion::new(&[column], move |row, _| row.text(column) == Some(value))
}

pub fn contains_any(column: &'static str, needles: &'static [&'static str]) -> Criterion {
    Criterion::new(&[column], move |row, _| {
        row.text(column)
            .is_some_and(|v| needles.iter().any(|needle| v.contains(needle)))
    })
}

pub fn present(column: &'static str) -> Criterion {
    Criterion::new(&[column], move |row, _| row.text(column).is_some())
}

pub fn blank(column: &'static str) -> Criterion {
    Criterion::new(&[column], move |row, _| row.text(column).is_none())
}

// === Demographics ===

/// Blank or explicitly valid verification outcome.
pub fn verified() -> Criterion {
    Criterion::new(&[VERIFICATION], |row, _| {
        row.text(VERIFICATION)
            .is_none_or(|v| VALID_OUTCOMES.contains(&v))
    })
}

/// Sex recorded and Age parsed.
pub fn demographics() -> Criterion {
    present(SEX) & age_present()
}

pub fn age_present() -> Criterion {
    Criterion::new(&[AGE], |row, _| row.number(AGE).is_some())
}

pub fn age_at_least(years: f64) -> Criterion {
    Criterion::new(&[AGE], move |row, _| row.number(AGE).is_some_and(|a| a >= years))
}

pub fn age_below(years: f64) -> Criterion {
    Criterion::new(&[AGE], move |row, _| row.number(AGE).is_some_and(|a| a < years))
}

pub fn female() -> Criterion {
    equals(SEX, "Female")
}

// === Clinical values ===

/// Canonical viral load within `[low, high]`. `NULL` never matches.
pub fn viral_load_between(column: &'static str, low: f64, high: f64) -> Criterion {
    Criterion::new(&[column], move |row, _| {
        row.viral_load(column)
            .and_then(|vl| vl.value())
            .is_some_and(|v| (low..=high).contains(&v))
    })
}

pub fn cd4_class_in(column: &'static str, classes: &'static [Cd4Class]) -> Criterion {
    Criterion::new(&[column], move |row, _| {
        row.cd4(column)
            .is_some_and(|count| classes.contains(&count.classify()))
    })
}

/// Parsed number present and not zero.
pub fn nonzero(column: &'static str) -> Criterion {
    Criterion::new(&[column], move |row, _| row.number(column).is_some_and(|v| v != 0.0))
}
