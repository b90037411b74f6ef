use std::path::PathBuf;

use datim_core::CohortStatus;
use datim_ingest::{LoadedFile, SkippedFile};
use datim_model::{OutputLayout, PipelineKind, ReportingPeriod};
use datim_normalize::NormalizationReport;
use serde::{Deserialize, Serialize};

/// Everything one run produced, printed as a table and optionally saved as
/// JSON.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub pipeline: PipelineKind,
    pub period: ReportingPeriod,
    pub layout: OutputLayout,
    pub format: ReportFormat,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub files: Vec<LoadedFile>,
    pub skipped_files: Vec<SkippedFile>,
    pub records: usize,
    pub facilities: usize,
    pub indicators: Vec<IndicatorCount>,
    pub normalization: NormalizationReport,
    pub outputs: Vec<OutputFile>,
}

impl RunSummary {
    pub fn skipped_indicators(&self) -> impl Iterator<Item = &IndicatorCount> {
        self.indicators
            .iter()
            .filter(|count| matches!(count.status, CohortStatus::Skipped { .. }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndicatorCount {
    pub name: String,
    /// Records in the cohort.
    pub records: usize,
    /// Facilities with a non-zero count.
    pub facilities: usize,
    pub status: CohortStatus,
}

/// File format for report and audit tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    /// One workbook per pipeline, one sheet per report group.
    #[default]
    Xlsx,
    /// One file per report group.
    Csv,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Xlsx => "xlsx",
            ReportFormat::Csv => "csv",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    Report,
    Audit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputFile {
    pub kind: OutputKind,
    pub name: String,
    pub path: PathBuf,
    pub rows: usize,
}
