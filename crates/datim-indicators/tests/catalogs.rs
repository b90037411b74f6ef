//! Catalog-level checks across every pipeline.

use std::collections::HashSet;

use chrono::NaiveDate;
use datim_indicators::{IndicatorCatalog, spec};
use datim_model::{PipelineKind, ReportingPeriod};
use datim_normalize::{CanonicalTable, NormalizationPlan, normalize};
use insta::assert_json_snapshot;
use polars::prelude::*;
use proptest::prelude::*;

fn quarter() -> ReportingPeriod {
    ReportingPeriod::new(
        NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
        NaiveDate::from_ymd_opt(2025, 9, 30).unwrap(),
    )
    .unwrap()
}

/// Builds a canonical table from text columns; empty strings become nulls.
fn table(columns: &[(&str, Vec<&str>)], plan: &NormalizationPlan) -> CanonicalTable {
    let cols = columns
        .iter()
        .map(|(name, values)| {
            let values: Vec<Option<&str>> =
                values.iter().map(|v| (!v.is_empty()).then_some(*v)).collect();
            Series::new((*name).into(), values).into_column()
        })
        .collect();
    normalize(&DataFrame::new(cols).unwrap(), plan).unwrap().0
}

fn matched(catalog: &IndicatorCatalog, table: &CanonicalTable, row: usize) -> Vec<String> {
    let period = quarter();
    let row = table.row(row);
    catalog
        .iter()
        .filter(|def| def.criterion.matches(&row, &period))
        .map(|def| def.name.clone())
        .collect()
}

fn count(catalog: &IndicatorCatalog, table: &CanonicalTable, name: &str) -> usize {
    let period = quarter();
    let def = catalog.get(name).unwrap();
    table
        .rows()
        .filter(|row| def.criterion.matches(row, &period))
        .count()
}

#[test]
fn indicator_names_are_unique() {
    for kind in PipelineKind::ALL {
        let catalog = spec(kind).catalog;
        let mut seen = HashSet::new();
        for name in catalog.names() {
            assert!(seen.insert(name), "{kind}: duplicate indicator {name}");
        }
    }
}

#[test]
fn catalog_sizes() {
    let sizes: Vec<_> = PipelineKind::ALL
        .iter()
        .map(|kind| (kind.to_string(), spec(*kind).catalog.len()))
        .collect();
    assert_eq!(
        sizes,
        vec![
            ("RADET".to_string(), 58),
            ("HTS".to_string(), 56),
            ("HTS-Index".to_string(), 16),
            ("PMTCT-HTS".to_string(), 14),
            ("PrEP".to_string(), 12),
        ]
    );
}

#[test]
fn every_indicator_declares_its_columns() {
    for kind in PipelineKind::ALL {
        for def in &spec(kind).catalog {
            assert!(!def.requires().is_empty(), "{kind}: {} reads no column", def.name);
        }
    }
}

#[test]
fn pmtct_listing() {
    let names: Vec<_> = spec(PipelineKind::PmtctHts)
        .catalog
        .names()
        .map(str::to_string)
        .collect();
    assert_json_snapshot!(names, @r#"
    [
      "PMTCT_ANC_Facility",
      "PMTCT_ANC_Facility_Negative",
      "PMTCT_ANC_Facility_Positive",
      "PMTCT_ANC_Community",
      "PMTCT_ANC_Community_Negative",
      "PMTCT_ANC_Community_Positive",
      "PMTCT_Breastfeeding",
      "PMTCT_Breastfeeding_Negative",
      "PMTCT_Breastfeeding_Positive",
      "PMTCT_LD",
      "PMTCT_LD_Negative",
      "PMTCT_LD_Positive",
      "Setting_no_Modality",
      "Modality_no_Setting"
    ]
    "#);
}

#[test]
fn radet_order_starts_with_treatment_current() {
    let catalog = spec(PipelineKind::Radet).catalog;
    let names: Vec<_> = catalog.names().collect();
    assert_eq!(&names[..4], &["TX_CURR", "TX_CURR_ARV_DISP", "VL_ELIGIBILITY", "TX_PVLS_D"]);
    assert_eq!(&names[names.len() - 3..], &["TX_TB_N", "TB_PREV_N", "TB_PREV_D"]);
}

#[test]
fn new_client_counts_only_as_new() {
    let spec = spec(PipelineKind::Radet);
    let t = table(
        &[
            ("ART Start Date (yyyy-mm-dd)", vec!["2025-07-15"]),
            ("Current ART Status", vec!["Active"]),
            ("Client Verification Outcome", vec![""]),
            ("Sex", vec!["Female"]),
            ("Age", vec!["30"]),
        ],
        &spec.plan,
    );
    let hits = matched(&spec.catalog, &t, 0);

    assert!(hits.contains(&"TX_NEW".to_string()));
    assert!(hits.contains(&"TX_CURR".to_string()));
    assert!(!hits.contains(&"TX_RTT".to_string()));
    assert!(!hits.iter().any(|name| name.starts_with("TX_ML")));
}

#[test]
fn restarted_client_returns_to_treatment() {
    let spec = spec(PipelineKind::Radet);
    let t = table(
        &[
            ("ART Start Date (yyyy-mm-dd)", vec!["2019-02-01", "2019-02-01"]),
            ("Current ART Status", vec!["Active Restart", "Active Restart"]),
            ("Date of Current ART Status", vec!["2025-08-10", "2025-08-10"]),
            ("Previous ART Status", vec!["IIT", "IIT"]),
            ("Confirmed Date of Previous ART Status", vec!["2025-03-01", "2025-07-02"]),
            ("Sex", vec!["Male", "Male"]),
            ("Age", vec!["41", "41"]),
        ],
        &spec.plan,
    );
    assert!(matched(&spec.catalog, &t, 0).contains(&"TX_RTT".to_string()));
    // Interruption confirmed inside the quarter does not count.
    assert!(!matched(&spec.catalog, &t, 1).contains(&"TX_RTT".to_string()));
}

#[test]
fn interruption_bands_follow_time_on_treatment() {
    let spec = spec(PipelineKind::Radet);
    let t = table(
        &[
            (
                "ART Start Date (yyyy-mm-dd)",
                vec!["2025-07-01", "2025-04-01", "2024-01-01"],
            ),
            ("Current ART Status", vec!["IIT", "IIT", "IIT"]),
            (
                "Date of Current ART Status",
                vec!["2025-08-01", "2025-08-01", "2025-08-01"],
            ),
            ("Previous ART Status", vec!["", "Active", "Active"]),
            (
                "Confirmed Date of Previous ART Status",
                vec!["", "2025-06-01", "2025-06-01"],
            ),
            ("Sex", vec!["Female", "Female", "Male"]),
            ("Age", vec!["22", "35", "50"]),
        ],
        &spec.plan,
    );
    let bands: Vec<_> = (0..3)
        .map(|i| {
            matched(&spec.catalog, &t, i)
                .into_iter()
                .filter(|name| name.starts_with("IIT"))
                .collect::<Vec<_>>()
        })
        .collect();
    assert_eq!(bands, vec![vec!["IIT<3"], vec!["IIT3-5"], vec!["IIT>=6"]]);
    assert_eq!(count(&spec.catalog, &t, "TX_ML_IIT"), 3);
}

#[test]
fn suppressed_viral_load_counts_in_numerator() {
    let spec = spec(PipelineKind::Radet);
    let t = table(
        &[
            ("ART Start Date (yyyy-mm-dd)", vec!["2020-01-01"; 3]),
            ("Current ART Status", vec!["Active"; 3]),
            (
                "Date of Current ViralLoad Result Sample (yyyy-mm-dd)",
                vec!["2025-03-01"; 3],
            ),
            ("Date of Current Viral Load (yyyy-mm-dd)", vec!["2025-03-20"; 3]),
            ("Current Viral Load (c/ml)", vec!["Not Detected", "<40", "12,000"]),
            ("Pregnancy Status", vec!["Pregnant", "", ""]),
            ("Sex", vec!["Female", "Male", "Female"]),
            ("Age", vec!["28", "40", "33"]),
        ],
        &spec.plan,
    );
    assert_eq!(count(&spec.catalog, &t, "TX_PVLS_D"), 3);
    assert_eq!(count(&spec.catalog, &t, "TX_PVLS_N"), 2);
    assert_eq!(count(&spec.catalog, &t, "TX_PVLS_N_Pregnant"), 1);
    assert_eq!(count(&spec.catalog, &t, "TX_PVLS_N_Breastfeeding"), 0);
}

#[test]
fn misspelled_negative_counts_as_negative() {
    let spec = spec(PipelineKind::Hts);
    let t = table(
        &[
            ("Date Of HIV Testing (yyyy-mm-dd)", vec!["2025-08-01", "2025-08-02"]),
            ("Entry Point", vec!["Facility", "Facility"]),
            ("Testing Setting", vec!["STI", "STI"]),
            ("Modality", vec!["STI", "STI"]),
            ("Final HIV Test Result", vec!["Negative", "Negetive"]),
            ("Sex", vec!["Male", "Male"]),
            ("Age", vec!["19", "19"]),
        ],
        &spec.plan,
    );
    assert_eq!(count(&spec.catalog, &t, "HTS_STI_Negative"), 2);
    assert_eq!(count(&spec.catalog, &t, "HTS_TST_STI"), 2);
    assert_eq!(count(&spec.catalog, &t, "HTS_STI_Positive"), 0);
}

#[test]
fn pediatric_clinic_splits_on_age_five() {
    let spec = spec(PipelineKind::Hts);
    let t = table(
        &[
            ("Date Of HIV Testing (yyyy-mm-dd)", vec!["2025-08-01", "2025-08-01"]),
            ("Entry Point", vec!["Facility", "Facility"]),
            ("Testing Setting", vec!["Pediatric", "Pediatric"]),
            ("Modality", vec!["Pediatric", "Pediatric"]),
            ("Final HIV Test Result", vec!["Positive", "Positive"]),
            ("Sex", vec!["Female", "Female"]),
            ("Age", vec!["3", "7"]),
        ],
        &spec.plan,
    );
    assert_eq!(matched(&spec.catalog, &t, 0), vec!["HTS_TST_Pediatric", "HTS_Pediatric_Positive"]);
    assert_eq!(matched(&spec.catalog, &t, 1), vec!["HTS_TST_OtherPITC", "HTS_OtherPITC_Positive"]);
}

#[test]
fn tpt_completion_windows() {
    let spec = spec(PipelineKind::Radet);
    let t = table(
        &[
            ("Current ART Status", vec!["Active", "Active", "Died"]),
            ("TPT Type", vec!["Isoniazid and Rifapentine-(3HP)", "Isoniazid Preventive Therapy (IPT)", "3HP"]),
            ("Date of TPT Start (yyyy-mm-dd)", vec!["2024-11-15", "2025-02-01", "2025-02-01"]),
            ("TPT Completion date (yyyy-mm-dd)", vec!["2025-02-15", "2025-08-01", ""]),
            ("TPT Completion status", vec!["Treatment Completed", "Completed", ""]),
        ],
        &spec.plan,
    );
    assert_eq!(count(&spec.catalog, &t, "TB_PREV_D"), 3);
    assert_eq!(count(&spec.catalog, &t, "TB_PREV_N"), 2);
}

#[test]
fn prep_not_pregnant_is_excluded() {
    let spec = spec(PipelineKind::Prep);
    let t = table(
        &[
            ("Date Of Commencement (yyyy-mm-dd)", vec!["2025-08-01", "2025-08-01"]),
            ("HIV status at PrEP Initiation", vec!["Negative", ""]),
            ("Pregnancy Status", vec!["Not Pregnant", "Breastfeeding"]),
            ("Sex", vec!["Female", "Female"]),
            ("Age", vec!["24", "26"]),
        ],
        &spec.plan,
    );
    assert_eq!(count(&spec.catalog, &t, "PrEP_NEW"), 2);
    assert_eq!(count(&spec.catalog, &t, "PrEP_NEW_PregnantandBreastfeeding"), 1);
}

/// (breakdown, total) pairs where every breakdown record must be in the total.
fn hts_implications() -> Vec<(String, String)> {
    let catalog = spec(PipelineKind::Hts).catalog;
    catalog
        .names()
        .filter_map(|name| {
            let family = name
                .strip_suffix("_Negative")
                .or_else(|| name.strip_suffix("_Positive"))?;
            let total = if family == "PMTCT_ANC" {
                family.to_string()
            } else {
                format!("HTS_TST_{}", family.strip_prefix("HTS_")?)
            };
            Some((name.to_string(), total))
        })
        .collect()
}

fn choice(values: &'static [&'static str]) -> impl Strategy<Value = &'static str> {
    proptest::sample::select(values)
}

proptest! {
    #[test]
    fn hts_breakdowns_imply_totals(
        rows in proptest::collection::vec(
            (
                choice(&["2025-06-30", "2025-07-01", "2025-09-30", "2025-10-01", ""]),
                choice(&["Facility", "Community", ""]),
                choice(&["Index", "Pediatric", "Malnutrition", "TB", "CT", "SNS", "Others", "ANC", "L&D", ""]),
                choice(&["Index", "Pediatric", "Malnutrition", "TB", "VCT", "CT", "SNS", "Other PITC", "PMTCT (ANC1 Only)", ""]),
                choice(&["Negative", "Negetive", "Positive", "Indeterminate", ""]),
                choice(&["Male", "Female", ""]),
                choice(&["0", "4", "5", "30", "abc", ""]),
            ),
            1..40,
        )
    ) {
        let column = |f: fn(&(&'static str, &'static str, &'static str, &'static str, &'static str, &'static str, &'static str)) -> &'static str| {
            rows.iter().map(f).collect::<Vec<_>>()
        };
        let spec = spec(PipelineKind::Hts);
        let t = table(
            &[
                ("Date Of HIV Testing (yyyy-mm-dd)", column(|r| r.0)),
                ("Entry Point", column(|r| r.1)),
                ("Testing Setting", column(|r| r.2)),
                ("Modality", column(|r| r.3)),
                ("Final HIV Test Result", column(|r| r.4)),
                ("Sex", column(|r| r.5)),
                ("Age", column(|r| r.6)),
            ],
            &spec.plan,
        );
        let period = quarter();
        for (breakdown, total) in hts_implications() {
            let b = &spec.catalog.get(&breakdown).unwrap().criterion;
            let t_def = &spec.catalog.get(&total).unwrap().criterion;
            for row in t.rows() {
                if b.matches(&row, &period) {
                    prop_assert!(t_def.matches(&row, &period), "{breakdown} without {total}");
                }
            }
        }
    }
}

#[test]
fn arv_dispensing_needs_a_refill_duration() {
    let spec = spec(PipelineKind::Radet);
    let t = table(
        &[
            ("Current ART Status", vec!["Active"; 3]),
            ("Months of ARV Refill", vec!["3", "0", ""]),
            ("Sex", vec!["Male"; 3]),
            ("Age", vec!["30"; 3]),
        ],
        &spec.plan,
    );
    assert_eq!(count(&spec.catalog, &t, "TX_CURR"), 3);
    assert_eq!(count(&spec.catalog, &t, "TX_CURR_ARV_DISP"), 1);
}

#[test]
fn cervical_screening_needs_a_method() {
    let spec = spec(PipelineKind::Radet);
    let t = table(
        &[
            ("Current ART Status", vec!["Active"; 2]),
            ("Sex", vec!["Female"; 2]),
            ("Age", vec!["30"; 2]),
            ("Date of Cervical Cancer Screening (yyyy-mm-dd)", vec!["2025-08-01"; 2]),
            ("Cervical Cancer Screening Type", vec!["First Time Screening"; 2]),
            ("Cervical Cancer Screening Method", vec!["VIA", ""]),
            ("Result of Cervical Cancer Screening", vec!["Negative"; 2]),
        ],
        &spec.plan,
    );
    assert_eq!(count(&spec.catalog, &t, "CXCA_SCRN"), 1);
}

#[test]
fn tpt_requires_a_valid_verification() {
    let spec = spec(PipelineKind::Radet);
    let t = table(
        &[
            ("Current ART Status", vec!["Active"; 2]),
            ("Client Verification Outcome", vec!["Valid", "Invalid"]),
            ("TPT Type", vec!["Isoniazid and Rifapentine-(3HP)"; 2]),
            ("Date of TPT Start (yyyy-mm-dd)", vec!["2024-11-15"; 2]),
            ("TPT Completion date (yyyy-mm-dd)", vec!["2025-02-15"; 2]),
            ("TPT Completion status", vec!["Treatment Completed"; 2]),
        ],
        &spec.plan,
    );
    assert_eq!(count(&spec.catalog, &t, "TB_PREV_D"), 1);
    assert_eq!(count(&spec.catalog, &t, "TB_PREV_N"), 1);
}
