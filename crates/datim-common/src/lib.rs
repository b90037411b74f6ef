//! Shared utilities for the DATIM indicator crates.
//!
//! This crate provides the small set of Polars helpers every stage needs:
//! reading a column as optional text and turning cells into strings or numbers.

pub mod polars;

pub use polars::{any_to_string, format_numeric, is_blank, parse_f64, string_cells};
