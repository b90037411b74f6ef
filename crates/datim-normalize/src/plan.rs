//! Per-pipeline normalization instructions.

use serde::Serialize;

use crate::labels::LabelRule;

/// Which source columns get which typed reading.
///
/// Every source column is always kept as trimmed text; the plan only adds typed
/// views on top. Columns named here but absent from the source are skipped and
/// reported.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NormalizationPlan {
    pub dates: Vec<&'static str>,
    pub ages: Vec<&'static str>,
    pub counts: Vec<&'static str>,
    pub viral_loads: Vec<&'static str>,
    pub cd4_counts: Vec<&'static str>,
    pub labels: Vec<LabelRule>,
}

impl NormalizationPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dates(mut self, columns: &[&'static str]) -> Self {
        self.dates.extend_from_slice(columns);
        self
    }

    pub fn ages(mut self, columns: &[&'static str]) -> Self {
        self.ages.extend_from_slice(columns);
        self
    }

    pub fn counts(mut self, columns: &[&'static str]) -> Self {
        self.counts.extend_from_slice(columns);
        self
    }

    pub fn viral_load(mut self, column: &'static str) -> Self {
        self.viral_loads.push(column);
        self
    }

    pub fn cd4(mut self, column: &'static str) -> Self {
        self.cd4_counts.push(column);
        self
    }

    pub fn label(mut self, rule: LabelRule) -> Self {
        self.labels.push(rule);
        self
    }
}
