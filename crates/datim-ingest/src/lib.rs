//! Line-list ingestion.
//!
//! Discovers CSV and Excel extracts in a directory, decodes them tolerantly, and merges
//! them into one all-text Polars frame carrying `Filename` and `ProjectName`.
//! Facility key columns are validated here, before any indicator work starts.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use datim_ingest::ingest_directory;
//!
//! let data = ingest_directory(Path::new("extracts/radet"), &["ProjectName", "Facility Name", "DatimId"])?;
//! println!("{} records from {} files", data.frame.height(), data.files.len());
//! ```

mod discovery;
mod error;
mod keys;
mod merge;
mod reader;
mod workbook;

use std::path::{Path, PathBuf};

use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::{info, warn};

pub use discovery::list_source_files;
pub use error::{IngestError, Result};
pub use keys::{UNKNOWN_KEY, require_key_columns};
pub use merge::{FILENAME_COLUMN, PROJECT_COLUMN, combine_sources, project_name};
pub use reader::{SourceEncoding, SourceTable, is_workbook, read_source_file};

/// Per-file load outcome.
#[derive(Debug, Clone, Serialize)]
pub struct LoadedFile {
    pub path: PathBuf,
    pub rows: usize,
    pub skipped_rows: usize,
    pub encoding: SourceEncoding,
}

/// A file that could not be read at all.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// The merged extract plus what went into it.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub frame: DataFrame,
    pub files: Vec<LoadedFile>,
    pub skipped: Vec<SkippedFile>,
}

/// Loads and merges every extract in `dir`, then validates `keys`.
///
/// A file that cannot be read is logged and left out; the run fails only when
/// no file could be read or a key column is missing.
pub fn ingest_directory(dir: &Path, keys: &[&str]) -> Result<IngestedData> {
    let paths = list_source_files(dir)?;

    let mut sources = Vec::with_capacity(paths.len());
    let mut skipped = Vec::new();
    for path in paths {
        match read_source_file(&path) {
            Ok(table) => sources.push(table),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "source file skipped");
                skipped.push(SkippedFile {
                    path,
                    reason: err.to_string(),
                });
            }
        }
    }

    if sources.is_empty() {
        return Err(IngestError::NoInputFiles {
            path: dir.to_path_buf(),
        });
    }

    let files: Vec<LoadedFile> = sources
        .iter()
        .map(|s| LoadedFile {
            path: s.path.clone(),
            rows: s.rows.len(),
            skipped_rows: s.skipped_rows,
            encoding: s.encoding,
        })
        .collect();

    let mut frame = combine_sources(&sources)?;
    require_key_columns(&mut frame, keys)?;

    info!(
        files = files.len(),
        rows = frame.height(),
        columns = frame.width(),
        "extracts merged"
    );

    Ok(IngestedData {
        frame,
        files,
        skipped,
    })
}
