//! Error types for line-list ingestion.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors that can occur while loading source extracts.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Directory not found or not a directory.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === CSV Parsing Errors ===
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// A workbook could not be opened or its first sheet read.
    #[error("failed to read workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    /// File has no header row.
    #[error("extract is empty: {path}")]
    EmptyFile { path: PathBuf },

    /// Nothing in the directory could be loaded.
    #[error("no readable extracts in {path}")]
    NoInputFiles { path: PathBuf },

    // === Structural Errors ===
    /// A facility key column is absent from the merged data.
    #[error("required key column '{column}' not found in merged data")]
    MissingKeyColumn { column: String },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<PolarsError> for IngestError {
    fn from(err: PolarsError) -> Self {
        IngestError::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
