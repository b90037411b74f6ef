//! Tolerant extract reading.
//!
//! Extracts come from several EMR exports: CSVs in UTF-8 (with or without a
//! BOM) or Windows-1252, and Excel workbooks. Malformed CSV rows are skipped
//! and counted instead of failing the file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use encoding_rs::WINDOWS_1252;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{IngestError, Result};
use crate::workbook::read_workbook;

/// How a file's cells were decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceEncoding {
    Utf8,
    Windows1252,
    /// Typed cells from the first worksheet of an `.xlsx`/`.xls` file.
    Workbook,
}

/// One decoded extract, before merging.
#[derive(Debug, Clone)]
pub struct SourceTable {
    pub path: PathBuf,
    pub headers: Vec<String>,
    /// Row-major cells; blanks are `None`.
    pub rows: Vec<Vec<Option<String>>>,
    pub skipped_rows: usize,
    pub encoding: SourceEncoding,
}

impl SourceTable {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

fn decode(bytes: &[u8]) -> (String, SourceEncoding) {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => (text.to_string(), SourceEncoding::Utf8),
        Err(_) => {
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
            (text.into_owned(), SourceEncoding::Windows1252)
        }
    }
}

/// Trims headers, names blanks `Unnamed: N`, and suffixes repeats `.1`, `.2`.
pub(crate) fn normalize_headers<'a>(raw: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    raw.into_iter()
        .enumerate()
        .map(|(idx, header)| {
            let trimmed = header.trim();
            let base = if trimmed.is_empty() {
                format!("Unnamed: {idx}")
            } else {
                trimmed.to_string()
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{base}.{count}")
            };
            *count += 1;
            name
        })
        .collect()
}

/// True for the workbook extensions [`read_source_file`] hands to calamine.
pub fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx") || ext.eq_ignore_ascii_case("xls"))
}

/// Reads one extract, CSV or workbook.
pub fn read_source_file(path: &Path) -> Result<SourceTable> {
    if is_workbook(path) {
        read_workbook(path)
    } else {
        read_csv(path)
    }
}

/// Short rows are padded with blanks. Rows with more fields than the header,
/// or that the CSV parser rejects, are skipped.
fn read_csv(path: &Path) -> Result<SourceTable> {
    let bytes = std::fs::read(path).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let (text, encoding) = decode(&bytes);

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let raw_headers = reader.headers().map_err(|e| IngestError::CsvParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    if raw_headers.is_empty() || raw_headers.iter().all(|h| h.trim().is_empty()) {
        return Err(IngestError::EmptyFile {
            path: path.to_path_buf(),
        });
    }
    let headers = normalize_headers(raw_headers.iter());
    let width = headers.len();

    let mut rows = Vec::new();
    let mut skipped_rows = 0usize;
    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "skipping unreadable row");
                skipped_rows += 1;
                continue;
            }
        };
        if record.len() > width {
            skipped_rows += 1;
            continue;
        }
        let mut row: Vec<Option<String>> = record
            .iter()
            .map(|cell| {
                let cell = cell.trim();
                (!cell.is_empty()).then(|| cell.to_string())
            })
            .collect();
        row.resize(width, None);
        rows.push(row);
    }

    if skipped_rows > 0 {
        warn!(path = %path.display(), skipped_rows, "malformed rows skipped");
    }

    Ok(SourceTable {
        path: path.to_path_buf(),
        headers,
        rows,
        skipped_rows,
        encoding,
    })
}
