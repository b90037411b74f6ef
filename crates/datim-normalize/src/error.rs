//! Error types for normalization.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Structural failures while building the canonical table.
///
/// Cell-level problems are never errors; they become sentinel values.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// A source column could not be read as text.
    #[error("failed to read column '{column}': {source}")]
    ColumnRead {
        column: String,
        #[source]
        source: PolarsError,
    },

    /// Failed to assemble an audit frame.
    #[error("failed to build audit table '{name}': {source}")]
    Audit {
        name: String,
        #[source]
        source: PolarsError,
    },
}

pub type Result<T> = std::result::Result<T, NormalizeError>;
