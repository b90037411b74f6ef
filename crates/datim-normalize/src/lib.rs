//! Value normalization for line-level extracts.
//!
//! Raw cells are free text. This crate turns them into the typed values the
//! indicator predicates read ([`DateValue`], [`ViralLoad`], [`Cd4Count`], ages)
//! and builds an immutable [`CanonicalTable`] for the evaluator. Parse failures
//! never abort: they become sentinels and are tallied in a
//! [`NormalizationReport`].
//!
//! [`DateValue`]: datim_model::DateValue
//! [`ViralLoad`]: datim_model::ViralLoad
//! [`Cd4Count`]: datim_model::Cd4Count

pub mod audit;
pub mod cd4;
pub mod date;
pub mod error;
pub mod labels;
pub mod normalize;
pub mod numeric;
pub mod plan;
pub mod table;
pub mod viral_load;

pub use audit::{AuditSpec, AuditTable, build_audits};
pub use cd4::parse_cd4;
pub use date::parse_date;
pub use error::{NormalizeError, Result};
pub use labels::LabelRule;
pub use normalize::{ColumnIssue, NormalizationReport, normalize};
pub use numeric::{parse_age, parse_count};
pub use plan::NormalizationPlan;
pub use table::{CanonicalTable, Row};
pub use viral_load::parse_viral_load;
