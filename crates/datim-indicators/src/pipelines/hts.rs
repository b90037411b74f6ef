//! HIV testing services register: HTS_TST by testing modality.

use datim_model::PipelineKind;
use datim_normalize::{AuditSpec, NormalizationPlan};

use super::testing::{Route, TestingColumns, TestingFamily};
use crate::catalog::IndicatorCatalog;
use crate::predicates::{AGE, age_at_least, age_below, blank, demographics, female};

const COLUMNS: TestingColumns = TestingColumns {
    date: "Date Of HIV Testing (yyyy-mm-dd)",
    entry: "Entry Point",
    setting: "Testing Setting",
    modality: "Modality",
    result: "Final HIV Test Result",
};

const FACILITY: &[&str] = &["Facility"];
const COMMUNITY: &[&str] = &["Community"];
const ANY_ENTRY: &[&str] = &["Facility", "Community"];

const PEDIATRIC: &[&str] = &["Pediatrics <5 Clinic", "Pediatric"];
const MALNUTRITION: &[&str] = &["Malnutrition", "Malnutrition Clinic"];

pub fn plan() -> NormalizationPlan {
    NormalizationPlan::new().dates(&[COLUMNS.date]).ages(&[AGE])
}

pub fn audits() -> Vec<AuditSpec> {
    vec![AuditSpec::SettingTuples {
        columns: vec![
            COLUMNS.entry,
            COLUMNS.setting,
            COLUMNS.modality,
            COLUMNS.date,
            "Facility",
        ],
        date_column: COLUMNS.date,
    }]
}

fn families() -> Vec<TestingFamily> {
    vec![
        TestingFamily::hts("Emergency").route(Route::new(FACILITY, &["Emergency"], &["Emergency"])),
        TestingFamily::hts("Index").route(Route::new(ANY_ENTRY, &["Index"], &["Index"])),
        TestingFamily::hts("Inpatient").route(Route::new(
            FACILITY,
            &["Inpatient", "Ward/Inpatient", "Ward"],
            &["Inpatient"],
        )),
        TestingFamily::hts("Malnutrition")
            .route(Route::new(FACILITY, MALNUTRITION, MALNUTRITION))
            .restrict(age_below(5.0)),
        TestingFamily::hts("MobileMod").route(Route::new(COMMUNITY, &["Outreach"], &["Mobile"])),
        TestingFamily::hts("OtherMod").route(Route::new(
            COMMUNITY,
            &["Others", "Standalone", "Standalone HTS", "OVC"],
            &["Other Community Platforms"],
        )),
        // Pediatric and malnutrition clinics test older clients under Other PITC.
        TestingFamily::hts("OtherPITC")
            .route(Route::new(
                FACILITY,
                &[
                    "Others",
                    "FP",
                    "BloodBank",
                    "Blood Bank",
                    "Standalone",
                    "Standalone HTS",
                    "TB",
                    "Others (Specify)",
                ],
                &["Other PITC"],
            ))
            .route(Route::new(FACILITY, &["TB"], &["TB_STAT/OtherPITC"]))
            .route(Route::new(FACILITY, PEDIATRIC, PEDIATRIC).when(age_at_least(5.0)))
            .route(Route::new(FACILITY, MALNUTRITION, MALNUTRITION).when(age_at_least(5.0))),
        TestingFamily::hts("Pediatric")
            .route(Route::new(FACILITY, PEDIATRIC, PEDIATRIC))
            .restrict(age_below(5.0)),
        TestingFamily::titled("PMTCT_ANC")
            .route(Route::new(
                FACILITY,
                &["ANC", "Spoke health facility"],
                &["PMTCT (ANC1 Only)"],
            ))
            .route(Route::new(
                COMMUNITY,
                &[
                    "Congregational setting",
                    "Delivery homes",
                    "TBA Orthodx",
                    "TBA Orthodox",
                    "TBA rt-HCW",
                ],
                &["PMTCT (ANC1 Only)"],
            )),
        TestingFamily::hts("PMTCT_Post_ANC1_Breastfeeding")
            .route(Route::new(
                FACILITY,
                &["Post Natal Ward/Breastfeeding"],
                &["PMTCT (Post ANC1: Breastfeeding)"],
            ))
            .restrict(female()),
        TestingFamily::hts("PMTCT_PostANC1_Pregnant_Labour_and_Delivery")
            .route(Route::new(
                FACILITY,
                &["L&D", "Retesting"],
                &["PMTCT (Post ANC1: Pregnancy/L&D)"],
            ))
            .restrict(female()),
        TestingFamily::hts("SNS").route(Route::new(FACILITY, &["SNS"], &["SNS"])),
        TestingFamily::hts("SNSMod").route(Route::new(COMMUNITY, &["SNS"], &["SNS"])),
        TestingFamily::hts("STI").route(Route::new(FACILITY, &["STI"], &["STI"])),
        TestingFamily::hts("TB").route(Route::new(FACILITY, &["TB"], &["TB"])),
        TestingFamily::hts("PrEP").route(Route::new(
            FACILITY,
            &["PrEP Testing"],
            &["PrEP_CT HTS"],
        )),
        TestingFamily::hts("VCTMod").route(Route::new(COMMUNITY, &["CT"], &["VCT"])),
        TestingFamily::hts("VCT").route(Route::new(FACILITY, &["CT"], &["VCT", "CT"])),
    ]
}

pub fn catalog() -> IndicatorCatalog {
    let mut catalog = IndicatorCatalog::new(PipelineKind::Hts);
    let complete = demographics();

    for family in families() {
        family.register(&mut catalog, &COLUMNS, &complete);
    }

    catalog
        .push(
            "Setting_no_Modality",
            COLUMNS.setting_without_modality() & demographics(),
        )
        .push(
            "Blank_Entry_Point",
            COLUMNS.tested_in_quarter() & blank(COLUMNS.entry) & demographics(),
        );
    catalog
}
