//! The canonical table handed to the evaluator.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use datim_model::{Cd4Count, DateValue, ViralLoad};

/// Normalized, read-only view of the merged extract.
///
/// Built once by [`crate::normalize`]; nothing mutates it afterwards. Typed
/// columns exist only for source columns the plan asked for.
#[derive(Debug, Clone, Default)]
pub struct CanonicalTable {
    pub(crate) len: usize,
    pub(crate) text: BTreeMap<String, Vec<Option<String>>>,
    pub(crate) dates: BTreeMap<String, Vec<DateValue>>,
    pub(crate) numbers: BTreeMap<String, Vec<Option<f64>>>,
    pub(crate) viral_loads: BTreeMap<String, Vec<ViralLoad>>,
    pub(crate) cd4_counts: BTreeMap<String, Vec<Cd4Count>>,
}

impl CanonicalTable {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True when the source extract carried this column.
    pub fn has_column(&self, name: &str) -> bool {
        self.text.contains_key(name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.text.keys().map(String::as_str)
    }

    pub fn text_column(&self, name: &str) -> Option<&[Option<String>]> {
        self.text.get(name).map(Vec::as_slice)
    }

    pub fn date_column(&self, name: &str) -> Option<&[DateValue]> {
        self.dates.get(name).map(Vec::as_slice)
    }

    pub fn viral_load_column(&self, name: &str) -> Option<&[ViralLoad]> {
        self.viral_loads.get(name).map(Vec::as_slice)
    }

    pub fn cd4_column(&self, name: &str) -> Option<&[Cd4Count]> {
        self.cd4_counts.get(name).map(Vec::as_slice)
    }

    pub fn row(&self, index: usize) -> Row<'_> {
        Row { table: self, index }
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.len).map(|index| self.row(index))
    }
}

/// One record of a [`CanonicalTable`].
///
/// Accessors return `None` both for blank cells and for columns the table does
/// not have; the evaluator checks column presence before predicates run.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a CanonicalTable,
    index: usize,
}

impl<'a> Row<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Trimmed text, `None` when blank.
    pub fn text(&self, column: &str) -> Option<&'a str> {
        self.table
            .text
            .get(column)
            .and_then(|values| values.get(self.index))
            .and_then(Option::as_deref)
    }

    /// Parsed date, `None` when missing or invalid.
    pub fn date(&self, column: &str) -> Option<NaiveDate> {
        self.table
            .dates
            .get(column)
            .and_then(|values| values.get(self.index))
            .and_then(DateValue::valid)
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        self.table
            .numbers
            .get(column)
            .and_then(|values| values.get(self.index))
            .copied()
            .flatten()
    }

    pub fn viral_load(&self, column: &str) -> Option<ViralLoad> {
        self.table
            .viral_loads
            .get(column)
            .and_then(|values| values.get(self.index))
            .copied()
    }

    pub fn cd4(&self, column: &str) -> Option<Cd4Count> {
        self.table
            .cd4_counts
            .get(column)
            .and_then(|values| values.get(self.index))
            .copied()
    }
}

#[cfg(test)]
impl CanonicalTable {
    /// Builds a text-only table for predicate tests.
    pub fn from_text(columns: &[(&str, Vec<Option<&str>>)]) -> Self {
        let len = columns.first().map_or(0, |(_, values)| values.len());
        let text = columns
            .iter()
            .map(|(name, values)| {
                let owned = values.iter().map(|v| v.map(str::to_string)).collect();
                ((*name).to_string(), owned)
            })
            .collect();
        Self {
            len,
            text,
            ..Self::default()
        }
    }
}
