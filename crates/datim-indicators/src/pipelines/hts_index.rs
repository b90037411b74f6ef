//! Index testing register: offer, acceptance, elicitation and contact testing.

use datim_model::{PipelineKind, ReportingPeriod};
use datim_normalize::NormalizationPlan;

use super::testing::{NEGATIVE, POSITIVE, TESTED};
use crate::catalog::{Criterion, IndicatorCatalog, all};
use crate::predicates::{AGE, age_at_least, age_below, date_in, demographics, equals, one_of};

const ENTRY_POINT: &str = "Index client entry point";
const OFFERED_DATE: &str = "Date offered index testing";
const ACCEPTED: &str = "Accepted Index Testing";
const ELICITED_DATE: &str = "Date of Elicitation";
const TESTED_DATE: &str = "Date of HTS";
const KNOWN_POSITIVE: &str = "elicitedclientknownpositive";
const RESULT: &str = "HIV Test Result";

pub fn plan() -> NormalizationPlan {
    NormalizationPlan::new()
        .dates(&[OFFERED_DATE, ELICITED_DATE, TESTED_DATE])
        .ages(&[AGE])
}

/// Index entry point and the suffix its indicators carry.
const ENTRY_POINTS: [(&str, &str); 2] = [("Facility", "Fac"), ("Community", "Comm")];

fn offered(entry: &'static str) -> Criterion {
    all([
        equals(ENTRY_POINT, entry),
        date_in(OFFERED_DATE, ReportingPeriod::quarter),
        demographics(),
    ])
}

fn accepted(entry: &'static str) -> Criterion {
    offered(entry) & equals(ACCEPTED, "Yes")
}

fn elicited(entry: &'static str) -> Criterion {
    accepted(entry) & date_in(ELICITED_DATE, ReportingPeriod::quarter)
}

fn contact_tested(entry: &'static str) -> Criterion {
    elicited(entry) & date_in(TESTED_DATE, ReportingPeriod::quarter)
}

pub fn catalog() -> IndicatorCatalog {
    let mut catalog = IndicatorCatalog::new(PipelineKind::HtsIndex);

    for (entry, suffix) in ENTRY_POINTS {
        let newly_identified = || contact_tested(entry) & equals(KNOWN_POSITIVE, "No");

        catalog
            .push(format!("Offered_Index_{suffix}"), offered(entry))
            .push(format!("Accepted_Index_{suffix}"), accepted(entry))
            .push(format!("Elicited_Index_{suffix}"), elicited(entry))
            .push(
                format!("HTS_Index_Total_{suffix}"),
                contact_tested(entry) & one_of(RESULT, TESTED),
            )
            .push(
                format!("HTS_Index_KnownPos_{suffix}"),
                contact_tested(entry)
                    & equals(KNOWN_POSITIVE, "Yes")
                    & one_of(RESULT, POSITIVE),
            )
            .push(
                format!("HTS_Index_NewPos_{suffix}"),
                newly_identified() & one_of(RESULT, POSITIVE),
            )
            // Children under two are reported as documented negatives.
            .push(
                format!("HTS_Index_DocNeg_{suffix}"),
                newly_identified() & one_of(RESULT, NEGATIVE) & age_below(2.0),
            )
            .push(
                format!("HTS_Index_NewNeg_{suffix}"),
                newly_identified() & one_of(RESULT, NEGATIVE) & age_at_least(2.0),
            );
    }

    catalog
}
