//! Reporting pipeline identifiers.

use std::fmt;

use serde::Serialize;

/// Sheet name used when a pipeline writes all facilities into one group.
pub const SINGLE_SHEET_NAME: &str = "Facility_Aggregates";

/// One of the five line-list extracts the engine knows how to aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineKind {
    /// ART treatment line list.
    Radet,
    /// HIV testing services register.
    Hts,
    /// Index testing register.
    HtsIndex,
    /// Antenatal HIV testing register.
    PmtctHts,
    /// Pre-exposure prophylaxis register.
    Prep,
}

/// How the final table is split into output groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputLayout {
    /// One group per distinct `ProjectName`.
    PerProject,
    /// Everything in [`SINGLE_SHEET_NAME`].
    Single,
}

impl PipelineKind {
    pub const ALL: [PipelineKind; 5] = [
        PipelineKind::Radet,
        PipelineKind::Hts,
        PipelineKind::HtsIndex,
        PipelineKind::PmtctHts,
        PipelineKind::Prep,
    ];

    /// Facility key columns in output order. `ProjectName` always comes first.
    pub fn key_columns(self) -> &'static [&'static str] {
        match self {
            Self::Radet => &["ProjectName", "Facility Name", "DatimId"],
            Self::Hts => &["ProjectName", "Facility", "Facility Id (Datim)"],
            Self::HtsIndex | Self::Prep => &["ProjectName", "Facility Name", "Facility Id (Datim)"],
            Self::PmtctHts => &["ProjectName", "Facility"],
        }
    }

    pub fn default_layout(self) -> OutputLayout {
        match self {
            Self::Hts | Self::PmtctHts => OutputLayout::Single,
            Self::Radet | Self::HtsIndex | Self::Prep => OutputLayout::PerProject,
        }
    }

    /// Lowercase file-name stem for reports.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Radet => "radet",
            Self::Hts => "hts",
            Self::HtsIndex => "hts_index",
            Self::PmtctHts => "pmtct_hts",
            Self::Prep => "prep",
        }
    }

    /// True for pipelines whose indicators assume a calendar-quarter period.
    pub fn expects_calendar_quarter(self) -> bool {
        matches!(self, Self::Radet)
    }
}

impl fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Radet => "RADET",
            Self::Hts => "HTS",
            Self::HtsIndex => "HTS-Index",
            Self::PmtctHts => "PMTCT-HTS",
            Self::Prep => "PrEP",
        };
        f.write_str(label)
    }
}
