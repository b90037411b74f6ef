//! Pre-exposure prophylaxis register: PrEP_CT and PrEP_NEW.

use datim_model::{PipelineKind, ReportingPeriod};
use datim_normalize::NormalizationPlan;

use crate::catalog::{Criterion, IndicatorCatalog, all, any};
use crate::predicates::{
    AGE, SEX, age_at_least, blank, contains_any, date_before, date_in, equals, female, present,
};

const COMMENCED: &str = "Date Of Commencement (yyyy-mm-dd)";
const LAST_PICKUP: &str = "Date Of Last Pickup (yyyy-mm-dd)";
const INITIAL_STATUS: &str = "HIV status at PrEP Initiation";
const CURRENT_STATUS: &str = "Current HIV Status";
const PREGNANCY: &str = "Pregnancy Status";

const CT_TYPE: &str = "Current Prep Type";
const CT_DISTRIBUTION: &str = "Current Prep Distribution Setting";
const NEW_TYPE: &str = "Prep Type";
const NEW_DISTRIBUTION: &str = "Prep Distribution Setting";

pub fn plan() -> NormalizationPlan {
    NormalizationPlan::new()
        .dates(&[COMMENCED, LAST_PICKUP])
        .ages(&[AGE])
}

/// Negative or unrecorded status at initiation.
fn eligible_at_initiation() -> Criterion {
    contains_any(INITIAL_STATUS, &["Negative"]) | blank(INITIAL_STATUS)
}

fn adult() -> Criterion {
    age_at_least(15.0)
}

/// Pregnant or breastfeeding women. "Not Pregnant" contains "Pregnant" and is
/// excluded explicitly.
fn pregnant_or_breastfeeding() -> Criterion {
    female()
        & contains_any(PREGNANCY, &["Pregnant", "Breastfeeding"])
        & !equals(PREGNANCY, "Not Pregnant")
}

fn oral_or_unrecorded(column: &'static str) -> Criterion {
    contains_any(column, &["Oral"]) | blank(column)
}

fn distributed(column: &'static str) -> Criterion {
    contains_any(column, &["Facility", "Community"])
}

/// Started before the quarter and picked up during it.
fn continuing() -> Criterion {
    all([
        date_before(COMMENCED, ReportingPeriod::start),
        date_in(LAST_PICKUP, ReportingPeriod::quarter),
        eligible_at_initiation(),
        adult(),
    ])
}

fn newly_enrolled() -> Criterion {
    all([
        date_in(COMMENCED, ReportingPeriod::quarter),
        eligible_at_initiation(),
        adult(),
    ])
}

pub fn catalog() -> IndicatorCatalog {
    let with_sex = || present(SEX);
    let negative = || contains_any(CURRENT_STATUS, &["Negative"]);
    let positive = || contains_any(CURRENT_STATUS, &["Positive"]);
    let other = || blank(CURRENT_STATUS);

    let mut catalog = IndicatorCatalog::new(PipelineKind::Prep);
    catalog
        .push("PrEP_CT", continuing() & with_sex())
        .push("PrEP_CT_Type", continuing() & with_sex() & oral_or_unrecorded(CT_TYPE))
        .push(
            "PrEP_CT_Distribution",
            continuing() & with_sex() & distributed(CT_DISTRIBUTION),
        )
        .push(
            "PrEP_CT_TestResult",
            continuing() & with_sex() & any([negative(), positive(), other()]),
        )
        .push("PrEP_CT_TestResult_Negative", continuing() & with_sex() & negative())
        .push("PrEP_CT_TestResult_Positive", continuing() & with_sex() & positive())
        .push("PrEP_CT_TestResult_Other", continuing() & with_sex() & other())
        .push(
            "PrEP_CT_PregnantandBreastfeeding",
            continuing() & pregnant_or_breastfeeding(),
        )
        .push("PrEP_NEW", newly_enrolled() & with_sex())
        .push(
            "PrEP_NEW_Type",
            newly_enrolled() & with_sex() & oral_or_unrecorded(NEW_TYPE),
        )
        .push(
            "PrEP_NEW_Distribution",
            newly_enrolled() & with_sex() & distributed(NEW_DISTRIBUTION),
        )
        .push(
            "PrEP_NEW_PregnantandBreastfeeding",
            newly_enrolled() & pregnant_or_breastfeeding(),
        );
    catalog
}
