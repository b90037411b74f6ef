//! Excel extracts, read from their first worksheet.

use std::path::Path;

use calamine::{Data, ExcelDateTime, Reader, open_workbook_auto};
use chrono::Timelike;
use datim_common::format_numeric;

use crate::error::{IngestError, Result};
use crate::reader::{SourceEncoding, SourceTable, normalize_headers};

/// Reads the first worksheet; its first row is the header.
///
/// Dates stored as Excel serials become ISO text so the date parser sees the
/// same shape a CSV export would give. Completely empty rows are dropped.
pub(crate) fn read_workbook(path: &Path) -> Result<SourceTable> {
    let workbook_error = |message: String| IngestError::Workbook {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| workbook_error(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| workbook_error("workbook has no worksheets".to_string()))?
        .map_err(|e| workbook_error(e.to_string()))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Err(IngestError::EmptyFile {
            path: path.to_path_buf(),
        });
    };
    let header_cells: Vec<String> = header_row
        .iter()
        .map(|cell| cell_text(cell).unwrap_or_default())
        .collect();
    if header_cells.iter().all(String::is_empty) {
        return Err(IngestError::EmptyFile {
            path: path.to_path_buf(),
        });
    }
    let headers = normalize_headers(header_cells.iter().map(String::as_str));
    let width = headers.len();

    let rows = rows
        .map(|row| {
            let mut cells: Vec<Option<String>> = row.iter().take(width).map(cell_text).collect();
            cells.resize(width, None);
            cells
        })
        .filter(|cells| cells.iter().any(Option::is_some))
        .collect();

    Ok(SourceTable {
        path: path.to_path_buf(),
        headers,
        rows,
        skipped_rows: 0,
        encoding: SourceEncoding::Workbook,
    })
}

/// Cell as trimmed text; blanks and error cells are `None`.
fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty | Data::Error(_) => return None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::Float(v) => format_numeric(*v),
        Data::Int(v) => v.to_string(),
        Data::Bool(v) => v.to_string(),
        Data::DateTime(dt) => date_text(dt),
    };
    (!text.is_empty()).then_some(text)
}

fn date_text(value: &ExcelDateTime) -> String {
    match value.as_datetime() {
        Some(dt) if dt.num_seconds_from_midnight() == 0 => dt.format("%Y-%m-%d").to_string(),
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => format_numeric(value.as_f64()),
    }
}
