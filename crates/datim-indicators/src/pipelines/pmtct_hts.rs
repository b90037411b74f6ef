//! Antenatal and post-natal HIV testing register.

use datim_model::PipelineKind;
use datim_normalize::{AuditSpec, NormalizationPlan};

use super::testing::{Route, TestingColumns, TestingFamily};
use crate::catalog::IndicatorCatalog;
use crate::predicates::{AGE, age_present};

const COLUMNS: TestingColumns = TestingColumns {
    date: "Date Tested for HIV",
    entry: "Point of Entry",
    setting: "ANC Setting",
    modality: "Modality",
    result: "HIV Test Result",
};

const FACILITY: &[&str] = &["Facility"];
const ANC1: &[&str] = &["PMTCT (ANC1 Only)"];

pub fn plan() -> NormalizationPlan {
    NormalizationPlan::new().dates(&[COLUMNS.date]).ages(&[AGE])
}

pub fn audits() -> Vec<AuditSpec> {
    vec![AuditSpec::SettingTuples {
        columns: vec![COLUMNS.setting, COLUMNS.modality, COLUMNS.date, "Facility"],
        date_column: COLUMNS.date,
    }]
}

fn families() -> [TestingFamily; 4] {
    [
        TestingFamily::titled("PMTCT_ANC_Facility").route(Route::new(
            FACILITY,
            &["ANC", "Spoke health facility", "PMTCT (ANC1 Only)"],
            ANC1,
        )),
        TestingFamily::titled("PMTCT_ANC_Community").route(Route::new(
            &["Community"],
            &[
                "Congregational setting",
                "Delivery homes",
                "TBA Orthodx",
                "TBA Orthodox",
                "TBA rt-HCW",
            ],
            ANC1,
        )),
        TestingFamily::titled("PMTCT_Breastfeeding").route(Route::new(
            FACILITY,
            &["Post Natal Ward/Breastfeeding"],
            &["PMTCT (Post ANC1: Breastfeeding)"],
        )),
        TestingFamily::titled("PMTCT_LD").route(Route::new(
            FACILITY,
            &["L&D"],
            &["PMTCT (Post ANC1: Pregnancy/L&D)"],
        )),
    ]
}

/// The register has no Sex column; only Age is required.
pub fn catalog() -> IndicatorCatalog {
    let mut catalog = IndicatorCatalog::new(PipelineKind::PmtctHts);
    let complete = age_present();

    for family in families() {
        family.register(&mut catalog, &COLUMNS, &complete);
    }

    catalog
        .push(
            "Setting_no_Modality",
            COLUMNS.setting_without_modality() & age_present(),
        )
        .push(
            "Modality_no_Setting",
            COLUMNS.modality_without_setting() & age_present(),
        );
    catalog
}
