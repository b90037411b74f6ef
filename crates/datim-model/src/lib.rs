//! Domain types shared by every stage of the indicator engine.

pub mod error;
pub mod period;
pub mod pipeline;
pub mod values;

pub use error::{ModelError, Result};
pub use period::{DateWindow, ReportingPeriod};
pub use pipeline::{OutputLayout, PipelineKind, SINGLE_SHEET_NAME};
pub use values::{Cd4Class, Cd4Count, CD4_CEILING, DateValue, ViralLoad};
