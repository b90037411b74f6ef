//! End-to-end runs over small extract directories.

use std::fs;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use chrono::NaiveDate;
use datim_cli::pipeline::{RunConfig, run_pipeline};
use datim_cli::types::{OutputKind, ReportFormat};
use datim_model::{OutputLayout, PipelineKind, ReportingPeriod};

const PMTCT_HEADER: &str =
    "Facility,Age,Date Tested for HIV,Point of Entry,ANC Setting,Modality,HIV Test Result";

fn third_quarter() -> ReportingPeriod {
    ReportingPeriod::new(
        NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
        NaiveDate::from_ymd_opt(2025, 9, 30).unwrap(),
    )
    .unwrap()
}

fn write_extract(dir: &Path, name: &str, header: &str, rows: &[&str]) {
    let mut content = format!("{header}\n");
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    fs::write(dir.join(name), content).unwrap();
}

fn pmtct_extracts(dir: &Path) {
    write_extract(
        dir,
        "ACE-1_pmtct_hts.csv",
        PMTCT_HEADER,
        &[
            "Alpha,25,2025-08-01,Facility,ANC,PMTCT (ANC1 Only),Negetive",
            "Alpha,31,15/09/2025,Facility,ANC,PMTCT (ANC1 Only),Positive",
            "Beta,28,2025-05-01,Facility,ANC,PMTCT (ANC1 Only),Negative",
            "Beta,40,2025-08-10,Facility,ANC,,Positive",
        ],
    );
    write_extract(
        dir,
        "ACE-2_pmtct_hts.csv",
        PMTCT_HEADER,
        &[
            "Gamma,22,2025-07-20,Facility,L&D,PMTCT (Post ANC1: Pregnancy/L&D),Negative",
            "Gamma,,2025-07-21,Facility,ANC,,Negative",
        ],
    );
}

fn config(input: &Path, pipeline: PipelineKind, layout: OutputLayout) -> RunConfig {
    RunConfig {
        pipeline,
        input_dir: input.to_path_buf(),
        output_dir: input.join("output"),
        period: third_quarter(),
        layout,
        format: ReportFormat::Csv,
        write_audits: true,
    }
}

/// Writes the ACE-2 PMTCT rows as a workbook instead of CSV.
fn pmtct_workbook(path: &Path) {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, name) in PMTCT_HEADER.split(',').enumerate() {
        sheet.write_string(0, col as u16, name).unwrap();
    }
    let rows = [
        ["Gamma", "22", "2025-07-20", "Facility", "L&D", "PMTCT (Post ANC1: Pregnancy/L&D)", "Negative"],
        ["Gamma", "", "2025-07-21", "Facility", "ANC", "", "Negative"],
    ];
    for (row, values) in rows.iter().enumerate() {
        let row = row as u32 + 1;
        for (col, value) in values.iter().enumerate() {
            let col = col as u16;
            match value.parse::<f64>() {
                Ok(number) => sheet.write_number(row, col, number).unwrap(),
                Err(_) if value.is_empty() => continue,
                Err(_) => sheet.write_string(row, col, *value).unwrap(),
            };
        }
    }
    workbook.save(path).unwrap();
}

#[test]
fn pmtct_run_writes_one_table_and_an_audit() {
    let dir = tempfile::tempdir().unwrap();
    pmtct_extracts(dir.path());

    let summary = run_pipeline(&config(
        dir.path(),
        PipelineKind::PmtctHts,
        OutputLayout::Single,
    ))
    .unwrap();

    assert_eq!(summary.files.len(), 2);
    assert_eq!(summary.records, 6);
    assert_eq!(summary.facilities, 3);
    assert_eq!(summary.indicators.len(), 14);

    let kinds: Vec<_> = summary.outputs.iter().map(|o| (o.kind, o.name.as_str())).collect();
    assert_eq!(
        kinds,
        vec![
            (OutputKind::Report, "Facility_Aggregates"),
            (OutputKind::Audit, "testing_settings"),
        ]
    );

    let report = fs::read_to_string(
        dir.path()
            .join("output")
            .join("pmtct_hts_Facility_Aggregates.csv"),
    )
    .unwrap();
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("ProjectName,Facility,PMTCT_ANC_Facility,"));
    assert!(lines[0].ends_with(",Setting_no_Modality,Modality_no_Setting"));
    assert_eq!(lines[1], "ACE-1,Alpha,2,1,1,0,0,0,0,0,0,0,0,0,0,0");
    assert_eq!(lines[2], "ACE-1,Beta,0,0,0,0,0,0,0,0,0,0,0,0,1,0");
    assert_eq!(lines[3], "ACE-2,Gamma,0,0,0,0,0,0,0,0,0,1,1,0,0,0");
}

#[test]
fn pmtct_indicator_counts() {
    let dir = tempfile::tempdir().unwrap();
    pmtct_extracts(dir.path());

    let summary = run_pipeline(&config(
        dir.path(),
        PipelineKind::PmtctHts,
        OutputLayout::Single,
    ))
    .unwrap();
    let counted: Vec<_> = summary
        .indicators
        .iter()
        .filter(|count| count.records > 0)
        .collect();

    insta::assert_json_snapshot!(counted, @r###"
    [
      {
        "name": "PMTCT_ANC_Facility",
        "records": 2,
        "facilities": 1,
        "status": {
          "status": "evaluated"
        }
      },
      {
        "name": "PMTCT_ANC_Facility_Negative",
        "records": 1,
        "facilities": 1,
        "status": {
          "status": "evaluated"
        }
      },
      {
        "name": "PMTCT_ANC_Facility_Positive",
        "records": 1,
        "facilities": 1,
        "status": {
          "status": "evaluated"
        }
      },
      {
        "name": "PMTCT_LD",
        "records": 1,
        "facilities": 1,
        "status": {
          "status": "evaluated"
        }
      },
      {
        "name": "PMTCT_LD_Negative",
        "records": 1,
        "facilities": 1,
        "status": {
          "status": "evaluated"
        }
      },
      {
        "name": "Setting_no_Modality",
        "records": 1,
        "facilities": 1,
        "status": {
          "status": "evaluated"
        }
      }
    ]
    "###);
}

#[test]
fn per_project_layout_writes_one_file_per_project() {
    let dir = tempfile::tempdir().unwrap();
    pmtct_extracts(dir.path());
    let mut run = config(dir.path(), PipelineKind::PmtctHts, OutputLayout::PerProject);
    run.write_audits = false;

    let summary = run_pipeline(&run).unwrap();

    let names: Vec<_> = summary.outputs.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["ACE-1", "ACE-2"]);
    let ace2 = fs::read_to_string(dir.path().join("output").join("pmtct_hts_ACE-2.csv")).unwrap();
    assert!(ace2.starts_with("Facility,PMTCT_ANC_Facility,"));
    assert_eq!(ace2.lines().count(), 2);
}

#[test]
fn workbook_round_trip_has_one_sheet_per_project() {
    let dir = tempfile::tempdir().unwrap();
    pmtct_extracts(dir.path());
    fs::remove_file(dir.path().join("ACE-2_pmtct_hts.csv")).unwrap();
    pmtct_workbook(&dir.path().join("ACE-2_pmtct_hts.xlsx"));
    let mut run = config(dir.path(), PipelineKind::PmtctHts, OutputLayout::PerProject);
    run.format = ReportFormat::Xlsx;
    run.write_audits = false;

    let summary = run_pipeline(&run).unwrap();

    assert_eq!(summary.records, 6);
    let path = dir
        .path()
        .join("output")
        .join("pmtct_hts_facility_aggregates.xlsx");
    assert!(summary.outputs.iter().all(|output| output.path == path));

    let mut workbook = open_workbook_auto(&path).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["ACE-1", "ACE-2"]);

    let ace1 = workbook.worksheet_range("ACE-1").unwrap();
    assert_eq!(ace1.height(), 3);
    assert_eq!(ace1.get((0, 0)), Some(&Data::String("Facility".into())));
    assert_eq!(ace1.get((1, 0)), Some(&Data::String("Alpha".into())));
    assert_eq!(ace1.get((1, 1)), Some(&Data::Float(2.0)));

    let ace2 = workbook.worksheet_range("ACE-2").unwrap();
    let gamma: Vec<Data> = ace2.rows().nth(1).unwrap().to_vec();
    let counts: Vec<f64> = gamma[1..]
        .iter()
        .map(|cell| match cell {
            Data::Float(value) => *value,
            other => panic!("expected a number, got {other:?}"),
        })
        .collect();
    assert_eq!(gamma[0], Data::String("Gamma".into()));
    assert_eq!(
        counts,
        vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0]
    );
}

#[test]
fn absent_optional_columns_skip_indicators_not_the_run() {
    let dir = tempfile::tempdir().unwrap();
    write_extract(
        dir.path(),
        "ACE-1_prep.csv",
        "Facility Name,Facility Id (Datim),Sex,Age,Date Of Commencement (yyyy-mm-dd),HIV status at PrEP Initiation",
        &["Alpha,abc123,Female,30,2025-08-03,Negative"],
    );

    let summary = run_pipeline(&config(
        dir.path(),
        PipelineKind::Prep,
        OutputLayout::PerProject,
    ))
    .unwrap();

    let new = summary
        .indicators
        .iter()
        .find(|count| count.name == "PrEP_NEW")
        .unwrap();
    assert_eq!((new.records, new.facilities), (1, 1));
    assert!(summary.skipped_indicators().any(|count| count.name == "PrEP_CT"));
    assert!(summary.normalization.missing_columns.iter().any(|c| c.contains("Last Pickup")));
}

#[test]
fn missing_key_column_aborts_before_evaluation() {
    let dir = tempfile::tempdir().unwrap();
    write_extract(
        dir.path(),
        "ACE-1_index.csv",
        "Facility Name,Age",
        &["Alpha,30"],
    );

    let err = run_pipeline(&config(
        dir.path(),
        PipelineKind::HtsIndex,
        OutputLayout::PerProject,
    ))
    .unwrap_err();

    assert!(format!("{err:#}").contains("Facility Id (Datim)"));
    assert!(!dir.path().join("output").exists());
}
