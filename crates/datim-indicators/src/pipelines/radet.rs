//! Treatment (RADET) indicators: TX_CURR, TX_PVLS, TX_NEW, TX_RTT, TX_ML,
//! CXCA, TX_TB and TB_PREV.

use chrono::NaiveDate;
use datim_model::{Cd4Class, PipelineKind, ReportingPeriod};
use datim_normalize::{AuditSpec, LabelRule, NormalizationPlan};

use crate::catalog::{Criterion, IndicatorCatalog, all, any};
use crate::lab::{self, LabFamily, LabOutcome, lab_result};
use crate::predicates::{
    age_at_least, age_below, age_present, blank, cd4_class_in, contains_any, date_before,
    date_in, demographics, elapsed_days, equals, female, nonzero, one_of, present, verified,
    viral_load_between,
};

const ART_START: &str = "ART Start Date (yyyy-mm-dd)";
const VL_SAMPLE_DATE: &str = "Date of Current ViralLoad Result Sample (yyyy-mm-dd)";
const VL_RESULT_DATE: &str = "Date of Current Viral Load (yyyy-mm-dd)";
const VL_VALUE: &str = "Current Viral Load (c/ml)";
const CURRENT_STATUS: &str = "Current ART Status";
const CURRENT_STATUS_DATE: &str = "Date of Current ART Status";
const PREVIOUS_STATUS: &str = "Previous ART Status";
const PREVIOUS_STATUS_DATE: &str = "Confirmed Date of Previous ART Status";
const ARV_REFILL: &str = "Months of ARV Refill";
const CARE_ENTRY: &str = "Care Entry Point";
const PREGNANCY: &str = "Pregnancy Status";
const CD4: &str = "Last CD4 Count";
const CD4_DATE: &str = "Date of Last CD4 Count";
const CAUSE_OF_DEATH: &str = "Cause of Death";
const CXCA_SCREEN_DATE: &str = "Date of Cervical Cancer Screening (yyyy-mm-dd)";
const CXCA_TREATMENT_DATE: &str = "Date of Precancerous Lesions Treatment (yyyy-mm-dd)";
const CXCA_SCREEN_TYPE: &str = "Cervical Cancer Screening Type";
const CXCA_SCREEN_METHOD: &str = "Cervical Cancer Screening Method";
const CXCA_RESULT: &str = "Result of Cervical Cancer Screening";
const TB_SCREEN_DATE: &str = "Date of TB Screening (yyyy-mm-dd)";
const TB_SCREEN_TYPE: &str = "TB Screening Type";
const TB_STATUS: &str = "TB status";
const TB_SAMPLE_DATE: &str = "Date of TB Sample Collection (yyyy-mm-dd)";
const TB_RESULT_DATE: &str = "Date of TB Diagnostic Result Received (yyyy-mm-dd)";
const TB_TREATMENT_START: &str = "Date of Start of TB Treatment (yyyy-mm-dd)";
const TPT_START: &str = "Date of TPT Start (yyyy-mm-dd)";
const TPT_COMPLETION_DATE: &str = "TPT Completion date (yyyy-mm-dd)";
const TPT_TYPE: &str = "TPT Type";
const TPT_COMPLETION_STATUS: &str = "TPT Completion status";

const ACTIVE: &[&str] = &["Active", "Active Restart"];

const INTERRUPTED_BEFORE_RESTART: &[&str] = &[
    "IIT",
    "Stopped Treatment",
    "Stopped treatment",
    "STOPPED TREATMENT",
    "Invalid - Long-term IIT",
    "Invalid \u{2013} Long-term IIT",
    "Invalid \u{e2} Long-term IIT",
];

const CXCA_SCREEN_TYPES: &[&str] = &[
    "First Time Screening",
    "Follow-up after previous negative result or suspected cancer",
    "Post-treatment Follow-up",
];

const CXCA_RESULTS: &[&str] = &["Negative", "Positive", "Suspicious for cancer"];

const TB_SCREEN_TYPES: &[&str] = &[
    "CXR",
    "Smear",
    "Gene Xpert",
    "Chest X-ray without CAD",
    "Chest X-ray with CAD",
    "Chest X-ray",
    "Chest X-Ray with CAD and/or Symptom screening",
    "Symptom screen (alone)",
];

const TB_SCREENED: &[&str] = &[
    "Presumptive TB",
    "No signs or symptoms of TB",
    "No sign or symptoms of TB",
    "TB Suspected and referred for evaluation",
    "Confirmed TB",
    "Currently on TPT",
];

const TB_SCREENED_POSITIVE: &[&str] = &[
    "Presumptive TB",
    "TB Suspected and referred for evaluation",
    "Confirmed TB",
];

const TB_SCREENED_NEGATIVE: &[&str] = &[
    "No signs or symptoms of TB",
    "No sign or symptoms of TB",
    "Currently on TPT",
];

const TB_SPECIMEN_STATUSES: &[&str] = &[
    "Presumptive TB",
    "TB Suspected and referred for evaluation",
    "Confirmed TB",
    "Currently on TB treatment",
];

const TPT_ELIGIBLE_STATUSES: &[&str] = &[
    "Active",
    "IIT",
    "Stopped Treatment",
    "Transferred Out",
    "Died",
];

const TPT_RIFAPENTINE: &[&str] = &["3HP", "3HR"];

const TPT_COMPLETED: &[&str] = &["Treatment Completed", "Treatment success", "Completed", "completed"];

/// Lowercased cause-of-death spellings for each reporting category.
const DEATH_CAUSES: &[(&str, &[&str])] = &[
    ("Unknown", &["unknown", "uknown", "unknown cause"]),
    ("cancer", &["hiv-related (cancer,parasitic disease)"]),
    ("Non_natural", &["non-natural causes"]),
    (
        "Other_HIV_Disease",
        &[
            "other hiv disease resulting in other disease or conditions leading to death",
            "suspected arv side effect (speciify)",
            "suspected arv side effect (specify)",
        ],
    ),
    (
        "Other_infectious",
        &[
            "suspected opportunistic infection (specify)",
            "hiv disease resulting in other infectious and parasitic disease",
        ],
    ),
    (
        "Other_natural",
        &["other cause of death", "natural cause", "other natural causes"],
    ),
    ("TB", &["hiv disease resulting in tb", "tuberculosis"]),
];

pub fn plan() -> NormalizationPlan {
    NormalizationPlan::new()
        .dates(&[
            ART_START,
            VL_SAMPLE_DATE,
            VL_RESULT_DATE,
            PREVIOUS_STATUS_DATE,
            CURRENT_STATUS_DATE,
            CXCA_TREATMENT_DATE,
            CXCA_SCREEN_DATE,
            TB_SCREEN_DATE,
            TB_SAMPLE_DATE,
            TB_RESULT_DATE,
            TB_TREATMENT_START,
            TPT_START,
            TPT_COMPLETION_DATE,
            CD4_DATE,
        ])
        .ages(&["Age"])
        .counts(&[ARV_REFILL])
        .viral_load(VL_VALUE)
        .cd4(CD4)
        .label(LabelRule::fold(CURRENT_STATUS, "stopped treatment", "Stopped Treatment"))
        .label(LabelRule::fold(PREVIOUS_STATUS, "stopped treatment", "Stopped Treatment"))
        .label(LabelRule::fold(TB_SCREEN_TYPE, "none", "Others"))
        .label(LabelRule::lowercase(CAUSE_OF_DEATH))
        .label(LabelRule::lowercase(lab::RESULT))
}

pub fn audits() -> Vec<AuditSpec> {
    vec![
        AuditSpec::ViralLoadPairs { column: VL_VALUE },
        AuditSpec::Cd4Pairs { column: CD4 },
    ]
}

fn in_quarter(column: &'static str) -> Criterion {
    date_in(column, ReportingPeriod::quarter)
}

fn in_semiannual(column: &'static str) -> Criterion {
    date_in(column, ReportingPeriod::semiannual)
}

/// Pregnancy breakdowns are restricted to female clients with a known age.
fn pregnancy(statuses: &'static [&'static str]) -> Criterion {
    one_of(PREGNANCY, statuses) & female() & age_present()
}

fn viral_load_denominator() -> Criterion {
    all([
        one_of(CURRENT_STATUS, ACTIVE),
        verified(),
        date_in(VL_SAMPLE_DATE, ReportingPeriod::viral_load_sample),
        date_in(VL_RESULT_DATE, ReportingPeriod::viral_load_result),
        elapsed_days(ART_START, VL_SAMPLE_DATE, 180..),
    ])
}

fn add_treatment_current(catalog: &mut IndicatorCatalog) {
    catalog
        .push(
            "TX_CURR",
            contains_any(CURRENT_STATUS, &["Active"]) & verified() & demographics(),
        )
        .push(
            "TX_CURR_ARV_DISP",
            one_of(CURRENT_STATUS, ACTIVE) & verified() & nonzero(ARV_REFILL) & demographics(),
        )
        .push(
            "VL_ELIGIBILITY",
            all([
                one_of(CURRENT_STATUS, ACTIVE),
                verified(),
                elapsed_days(ART_START, VL_SAMPLE_DATE, 180..),
                demographics(),
            ]),
        );
}

fn add_viral_load(catalog: &mut IndicatorCatalog) {
    let suppressed = || viral_load_between(VL_VALUE, 0.0, 999.0);
    let breakdowns: [(&str, &'static [&'static str]); 3] = [
        ("PBF", &["Pregnant", "Breastfeeding"]),
        ("Pregnant", &["Pregnant"]),
        ("Breastfeeding", &["Breastfeeding"]),
    ];

    catalog.push("TX_PVLS_D", viral_load_denominator() & demographics());
    for (suffix, statuses) in breakdowns {
        catalog.push(
            format!("TX_PVLS_D_{suffix}"),
            viral_load_denominator() & pregnancy(statuses),
        );
    }

    catalog.push(
        "TX_PVLS_N",
        viral_load_denominator() & suppressed() & demographics(),
    );
    for (suffix, statuses) in breakdowns {
        catalog.push(
            format!("TX_PVLS_N_{suffix}"),
            viral_load_denominator() & suppressed() & pregnancy(statuses),
        );
    }
}

fn add_new_on_treatment(catalog: &mut IndicatorCatalog) {
    let started = || {
        all([
            in_quarter(ART_START),
            !equals(CARE_ENTRY, "Transfer-in"),
            verified(),
            demographics(),
        ])
    };
    let cd4_known = || age_at_least(5.0) & cd4_class_in(CD4, &[Cd4Class::Valid]);
    let cd4_unknown =
        || age_below(5.0) | cd4_class_in(CD4, &[Cd4Class::Excess, Cd4Class::Unknown]);

    catalog
        .push("TX_NEW", started())
        .push("TX_NEW_BF", started() & pregnancy(&["Breastfeeding"]))
        .push("TX_NEW_Pregnant", started() & pregnancy(&["Pregnant"]))
        .push(
            "TX_NEW_PBF",
            started() & pregnancy(&["Pregnant", "Breastfeeding"]),
        )
        .push("TX_NEW_CD4_Known", started() & cd4_known())
        .push("TX_NEW_CD4_Unknown", started() & cd4_unknown());
}

fn add_returned_to_treatment(catalog: &mut IndicatorCatalog) {
    catalog.push(
        "TX_RTT",
        all([
            equals(CURRENT_STATUS, "Active Restart"),
            in_quarter(CURRENT_STATUS_DATE),
            verified(),
            one_of(PREVIOUS_STATUS, INTERRUPTED_BEFORE_RESTART),
            date_before(PREVIOUS_STATUS_DATE, ReportingPeriod::start),
            demographics(),
        ]),
    );
}

/// Clients on treatment at the start of the quarter (or started during it)
/// whose status changed within the quarter.
fn lost_to_follow_up() -> Criterion {
    let previously_active =
        contains_any(PREVIOUS_STATUS, &["Active"]) & date_before(PREVIOUS_STATUS_DATE, ReportingPeriod::start);
    let new_this_quarter = blank(PREVIOUS_STATUS) & in_quarter(ART_START);
    all([
        verified(),
        in_quarter(CURRENT_STATUS_DATE),
        previously_active | new_this_quarter,
        demographics(),
    ])
}

fn add_interruptions(catalog: &mut IndicatorCatalog) {
    let iit = || lost_to_follow_up() & equals(CURRENT_STATUS, "IIT");
    let on_art_for = |range: std::ops::Range<i64>| elapsed_days(ART_START, CURRENT_STATUS_DATE, range);

    catalog
        .push(
            "TX_ML_Stopped_TX",
            lost_to_follow_up() & contains_any(CURRENT_STATUS, &["Stop"]),
        )
        .push(
            "TX_ML_Died",
            lost_to_follow_up() & contains_any(CURRENT_STATUS, &["Died"]),
        )
        .push(
            "TX_ML_Transfer_out",
            lost_to_follow_up() & contains_any(CURRENT_STATUS, &["Transfer"]),
        )
        .push("TX_ML_IIT", iit())
        .push("IIT<3", iit() & on_art_for(0..90))
        .push("IIT3-5", iit() & on_art_for(90..180))
        .push(
            "IIT>=6",
            iit() & elapsed_days(ART_START, CURRENT_STATUS_DATE, 180..),
        );

    for &(suffix, causes) in DEATH_CAUSES {
        catalog.push(
            format!("TX_ML_Died_{suffix}"),
            lost_to_follow_up()
                & contains_any(CURRENT_STATUS, &["Died"])
                & one_of(CAUSE_OF_DEATH, causes),
        );
    }
}

fn add_cervical_cancer(catalog: &mut IndicatorCatalog) {
    let screened = || {
        all([
            female(),
            age_at_least(15.0),
            in_semiannual(CXCA_SCREEN_DATE),
            contains_any(CURRENT_STATUS, &["Active"]),
            verified(),
            one_of(CXCA_SCREEN_TYPE, CXCA_SCREEN_TYPES),
            present(CXCA_SCREEN_METHOD),
        ])
    };

    catalog
        .push("CXCA_SCRN", screened() & one_of(CXCA_RESULT, CXCA_RESULTS))
        .push(
            "CXCA_TX",
            screened()
                & contains_any(CXCA_RESULT, &["Positive"])
                & in_semiannual(CXCA_TREATMENT_DATE),
        );
}

/// Screened during the semiannual window and on ART with a screening type.
fn tb_screening_base() -> Criterion {
    all([
        in_semiannual(TB_SCREEN_DATE),
        verified(),
        contains_any(CURRENT_STATUS, &["Active"]),
        one_of(TB_SCREEN_TYPE, TB_SCREEN_TYPES),
        present(TB_STATUS),
    ])
}

fn semiannual_start(period: &ReportingPeriod) -> NaiveDate {
    period.semiannual().start
}

fn on_tb_treatment() -> Criterion {
    equals(TB_STATUS, "Currently on TB treatment") & in_semiannual(TB_TREATMENT_START)
}

fn specimen_sent() -> Criterion {
    all([
        in_semiannual(TB_SCREEN_DATE),
        verified(),
        contains_any(CURRENT_STATUS, &["Active"]),
        one_of(TB_SCREEN_TYPE, TB_SCREEN_TYPES),
        contains_any(TB_STATUS, TB_SPECIMEN_STATUSES),
        in_semiannual(TB_SAMPLE_DATE),
    ])
}

fn result_received() -> Criterion {
    specimen_sent() & present(lab::TEST_TYPE) & in_semiannual(TB_RESULT_DATE)
}

fn add_tb_screening(catalog: &mut IndicatorCatalog) {
    let screened = || tb_screening_base() & (contains_any(TB_STATUS, TB_SCREENED) | on_tb_treatment());
    let positive = || tb_screening_base() & (contains_any(TB_STATUS, TB_SCREENED_POSITIVE) | on_tb_treatment());
    let negative = || tb_screening_base() & contains_any(TB_STATUS, TB_SCREENED_NEGATIVE);
    let already_on_art = || date_before(ART_START, semiannual_start);
    let new_on_art = || in_semiannual(ART_START);

    catalog
        .push("TX_TB_D", screened())
        .push("TX_TB_D_AlreadyonART_ScreenedPositive", positive() & already_on_art())
        .push("TX_TB_D_NewonART_ScreenedPositive", positive() & new_on_art())
        .push("TX_TB_D_AlreadyonART_ScreenedNegative", negative() & already_on_art())
        .push("TX_TB_D_NewonART_ScreenedNegative", negative() & new_on_art())
        .push("TX_TB_D(Screening type)", screened())
        .push("TX_TB_D(Specimen sent)", specimen_sent());

    catalog.push(
        "TX_TB_D(TB Test Type)",
        result_received() & lab_result(None, LabOutcome::Returned),
    );
    for family in LabFamily::ALL {
        catalog.push(
            format!("TX_TB_D(TB Test Type)_{}", family.suffix()),
            result_received() & lab_result(Some(family), LabOutcome::Returned),
        );
    }

    catalog.push(
        "TX_TB_D(Result Returned)",
        result_received() & lab_result(None, LabOutcome::Positive),
    );
    for family in LabFamily::ALL {
        catalog.push(
            format!("TX_TB_D(Result Returned)_{}", family.suffix()),
            result_received() & lab_result(Some(family), LabOutcome::Positive),
        );
    }

    catalog.push(
        "TX_TB_N",
        result_received()
            & in_semiannual(TB_TREATMENT_START)
            & lab_result(None, LabOutcome::Positive),
    );
}

fn add_tb_prevention(catalog: &mut IndicatorCatalog) {
    let eligible = || verified() & contains_any(CURRENT_STATUS, TPT_ELIGIBLE_STATUSES);
    let rifapentine = || contains_any(TPT_TYPE, TPT_RIFAPENTINE);
    let isoniazid = || present(TPT_TYPE) & !contains_any(TPT_TYPE, TPT_RIFAPENTINE);
    let completed = || contains_any(TPT_COMPLETION_STATUS, TPT_COMPLETED);

    let early_3hp = || date_in(TPT_START, ReportingPeriod::tpt_3hp_early_start) & rifapentine();
    let late_3hp = || date_in(TPT_START, ReportingPeriod::tpt_3hp_late_start) & rifapentine();
    let ipt = || date_in(TPT_START, ReportingPeriod::tpt_ipt_start) & isoniazid();

    let numerator = any([
        early_3hp() & date_in(TPT_COMPLETION_DATE, ReportingPeriod::tpt_3hp_early_completion) & completed(),
        late_3hp() & date_in(TPT_COMPLETION_DATE, ReportingPeriod::tpt_3hp_late_completion) & completed(),
        ipt() & date_in(TPT_COMPLETION_DATE, ReportingPeriod::tpt_ipt_completion) & completed(),
    ]);

    catalog
        .push("TB_PREV_N", eligible() & numerator)
        .push("TB_PREV_D", eligible() & any([early_3hp(), late_3hp(), ipt()]));
}

pub fn catalog() -> IndicatorCatalog {
    let mut catalog = IndicatorCatalog::new(PipelineKind::Radet);
    add_treatment_current(&mut catalog);
    add_viral_load(&mut catalog);
    add_new_on_treatment(&mut catalog);
    add_returned_to_treatment(&mut catalog);
    add_interruptions(&mut catalog);
    add_cervical_cancer(&mut catalog);
    add_tb_screening(&mut catalog);
    add_tb_prevention(&mut catalog);
    catalog
}
