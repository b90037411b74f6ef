//! Indicator catalogs for the DATIM aggregation pipelines.
//!
//! Each pipeline is an ordered list of named [`Criterion`]s evaluated row by
//! row over a normalized table. Output columns follow catalog order.

pub mod catalog;
pub mod lab;
pub mod pipelines;
pub mod predicates;

pub use catalog::{Criterion, IndicatorCatalog, IndicatorDef, IndicatorListing, all, any};
pub use lab::{LabFamily, LabOutcome};
pub use pipelines::{PipelineSpec, spec};
