//! Report writer.
//!
//! The default output is one workbook per pipeline,
//! `<pipeline>_facility_aggregates.xlsx`, with one sheet per report group.
//! Each audit table gets its own single-sheet workbook. The CSV format writes
//! one `<pipeline>_<group>.csv` per group and per audit instead.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::Writer;
use datim_common::any_to_string;
use datim_core::ReportGroup;
use datim_model::PipelineKind;
use datim_normalize::AuditTable;
use polars::prelude::{AnyValue, DataFrame};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use tracing::debug;

use crate::types::{OutputFile, OutputKind, ReportFormat};

/// Stem of the workbook holding every report group.
pub const AGGREGATES_STEM: &str = "facility_aggregates";

/// File name for one group or audit of a pipeline's report.
pub fn report_file_name(pipeline: PipelineKind, group: &str, format: ReportFormat) -> String {
    format!("{}_{group}.{}", pipeline.slug(), format.extension())
}

/// Writes `frame` as CSV with a header row.
pub fn write_frame(frame: &DataFrame, path: &Path) -> Result<()> {
    let mut writer =
        Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;

    let header: Vec<&str> = frame
        .get_column_names()
        .into_iter()
        .map(|name| name.as_str())
        .collect();
    writer
        .write_record(&header)
        .with_context(|| format!("write header to {}", path.display()))?;

    let columns = frame.get_columns();
    for row in 0..frame.height() {
        let mut record = Vec::with_capacity(columns.len());
        for column in columns {
            let value = column
                .get(row)
                .with_context(|| format!("read row {row} of '{}'", column.name()))?;
            record.push(any_to_string(value));
        }
        writer
            .write_record(&record)
            .with_context(|| format!("write row {row} to {}", path.display()))?;
    }

    writer
        .flush()
        .with_context(|| format!("flush {}", path.display()))?;
    Ok(())
}

/// Writes each `(sheet name, frame)` pair as one worksheet of a new workbook.
pub fn write_workbook<'a>(
    sheets: impl IntoIterator<Item = (&'a str, &'a DataFrame)>,
    path: &Path,
) -> Result<()> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    for (name, frame) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(name)
            .with_context(|| format!("name sheet '{name}'"))?;
        fill_sheet(worksheet, frame, &header_format)
            .with_context(|| format!("fill sheet '{name}'"))?;
    }
    workbook
        .save(path)
        .with_context(|| format!("save {}", path.display()))?;
    Ok(())
}

/// Counts stay numeric; nulls leave the cell empty.
fn fill_sheet(worksheet: &mut Worksheet, frame: &DataFrame, header_format: &Format) -> Result<()> {
    for (col, column) in frame.get_columns().iter().enumerate() {
        let col = u16::try_from(col).context("too many columns for a worksheet")?;
        worksheet.write_string_with_format(0, col, column.name().as_str(), header_format)?;
        for row in 0..frame.height() {
            let sheet_row = u32::try_from(row + 1).context("too many rows for a worksheet")?;
            let value = column.get(row)?;
            match value {
                AnyValue::Null => {}
                AnyValue::UInt32(v) => {
                    worksheet.write_number(sheet_row, col, f64::from(v))?;
                }
                AnyValue::Int32(v) => {
                    worksheet.write_number(sheet_row, col, f64::from(v))?;
                }
                AnyValue::Float64(v) => {
                    worksheet.write_number(sheet_row, col, v)?;
                }
                other => {
                    worksheet.write_string(sheet_row, col, any_to_string(other))?;
                }
            }
        }
    }
    Ok(())
}

pub fn write_report_groups(
    output_dir: &Path,
    pipeline: PipelineKind,
    groups: &[ReportGroup],
    format: ReportFormat,
) -> Result<Vec<OutputFile>> {
    ensure_dir(output_dir)?;
    let paths: Vec<PathBuf> = match format {
        ReportFormat::Xlsx => {
            let path = output_dir.join(report_file_name(pipeline, AGGREGATES_STEM, format));
            write_workbook(
                groups.iter().map(|group| (group.name.as_str(), &group.frame)),
                &path,
            )?;
            vec![path; groups.len()]
        }
        ReportFormat::Csv => groups
            .iter()
            .map(|group| {
                let path = output_dir.join(report_file_name(pipeline, &group.name, format));
                write_frame(&group.frame, &path)?;
                Ok(path)
            })
            .collect::<Result<_>>()?,
    };

    Ok(groups
        .iter()
        .zip(paths)
        .map(|(group, path)| {
            debug!(group = %group.name, rows = group.frame.height(), "report group written");
            OutputFile {
                kind: OutputKind::Report,
                name: group.name.clone(),
                path,
                rows: group.frame.height(),
            }
        })
        .collect())
}

pub fn write_audit_tables(
    output_dir: &Path,
    pipeline: PipelineKind,
    audits: &[AuditTable],
    format: ReportFormat,
) -> Result<Vec<OutputFile>> {
    ensure_dir(output_dir)?;
    audits
        .iter()
        .map(|audit| {
            let path = output_dir.join(report_file_name(pipeline, audit.name, format));
            match format {
                ReportFormat::Xlsx => write_workbook([(audit.name, &audit.frame)], &path)?,
                ReportFormat::Csv => write_frame(&audit.frame, &path)?,
            }
            Ok(OutputFile {
                kind: OutputKind::Audit,
                name: audit.name.to_string(),
                path,
                rows: audit.frame.height(),
            })
        })
        .collect()
}

fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create output dir {}", dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn file_names_use_the_pipeline_slug() {
        assert_eq!(
            report_file_name(PipelineKind::HtsIndex, "ACE-1", ReportFormat::Csv),
            "hts_index_ACE-1.csv"
        );
        assert_eq!(
            report_file_name(PipelineKind::Radet, AGGREGATES_STEM, ReportFormat::Xlsx),
            "radet_facility_aggregates.xlsx"
        );
    }

    #[test]
    fn writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let frame = df!(
            "Facility" => ["Alpha, North", "Beta"],
            "TX_CURR" => [4u32, 0],
        )
        .unwrap();

        write_frame(&frame, &path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "Facility,TX_CURR\n\"Alpha, North\",4\nBeta,0\n");
    }

    #[test]
    fn invalid_sheet_name_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let frame = df!("TX_CURR" => [1u32]).unwrap();
        let err = write_workbook([("bad[name]", &frame)], &dir.path().join("x.xlsx")).unwrap_err();
        assert!(format!("{err:#}").contains("bad[name]"));
    }
}
