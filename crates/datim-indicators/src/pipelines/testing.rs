//! Shared shape of the HIV testing registers (HTS and PMTCT-HTS).
//!
//! A testing family is a total plus negative and positive breakdowns over the
//! same routing: an entry point, a testing setting and a modality, optionally
//! narrowed by an extra condition such as an age band.

use datim_model::ReportingPeriod;

use crate::catalog::{Criterion, IndicatorCatalog, all, any};
use crate::predicates::{blank, date_in, one_of, present};

/// Result spellings counted as a negative test. "Negetive" is a recurring
/// data-entry variant and counts the same.
pub const NEGATIVE: &[&str] = &["Negative", "Negetive"];
pub const POSITIVE: &[&str] = &["Positive"];
pub const TESTED: &[&str] = &["Negative", "Negetive", "Positive"];

/// Column names of one testing register.
#[derive(Debug, Clone, Copy)]
pub struct TestingColumns {
    pub date: &'static str,
    pub entry: &'static str,
    pub setting: &'static str,
    pub modality: &'static str,
    pub result: &'static str,
}

impl TestingColumns {
    pub fn tested_in_quarter(&self) -> Criterion {
        date_in(self.date, ReportingPeriod::quarter)
    }

    /// Setting recorded without a modality, among conclusive results.
    pub fn setting_without_modality(&self) -> Criterion {
        all([
            self.tested_in_quarter(),
            present(self.setting),
            blank(self.modality),
            one_of(self.result, TESTED),
        ])
    }

    /// Modality recorded without a setting, among conclusive results.
    pub fn modality_without_setting(&self) -> Criterion {
        all([
            self.tested_in_quarter(),
            blank(self.setting),
            present(self.modality),
            one_of(self.result, TESTED),
        ])
    }
}

/// One accepted (entry point, setting, modality) combination.
#[derive(Debug, Clone)]
pub struct Route {
    entries: &'static [&'static str],
    settings: &'static [&'static str],
    modalities: &'static [&'static str],
    condition: Option<Criterion>,
}

impl Route {
    pub fn new(
        entries: &'static [&'static str],
        settings: &'static [&'static str],
        modalities: &'static [&'static str],
    ) -> Self {
        Self {
            entries,
            settings,
            modalities,
            condition: None,
        }
    }

    pub fn when(mut self, condition: Criterion) -> Self {
        self.condition = Some(condition);
        self
    }

    fn criterion(&self, columns: &TestingColumns) -> Criterion {
        let routed = one_of(columns.entry, self.entries)
            & one_of(columns.setting, self.settings)
            & one_of(columns.modality, self.modalities);
        match &self.condition {
            Some(condition) => routed & condition.clone(),
            None => routed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TestingFamily {
    total: String,
    negative: String,
    positive: String,
    routes: Vec<Route>,
    restriction: Option<Criterion>,
}

impl TestingFamily {
    /// `HTS_TST_<suffix>` with `HTS_<suffix>_Negative` / `HTS_<suffix>_Positive`.
    pub fn hts(suffix: &str) -> Self {
        Self::with_names(
            format!("HTS_TST_{suffix}"),
            format!("HTS_{suffix}_Negative"),
            format!("HTS_{suffix}_Positive"),
        )
    }

    /// `<total>` with `<total>_Negative` / `<total>_Positive`.
    pub fn titled(total: &str) -> Self {
        Self::with_names(
            total.to_string(),
            format!("{total}_Negative"),
            format!("{total}_Positive"),
        )
    }

    fn with_names(total: String, negative: String, positive: String) -> Self {
        Self {
            total,
            negative,
            positive,
            routes: Vec::new(),
            restriction: None,
        }
    }

    pub fn route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    /// Extra condition applied to the whole family.
    pub fn restrict(mut self, condition: Criterion) -> Self {
        self.restriction = Some(condition);
        self
    }

    /// Appends the total and both breakdowns to `catalog`.
    pub fn register(
        &self,
        catalog: &mut IndicatorCatalog,
        columns: &TestingColumns,
        completeness: &Criterion,
    ) {
        let mut base = columns.tested_in_quarter()
            & any(self.routes.iter().map(|route| route.criterion(columns)))
            & completeness.clone();
        if let Some(restriction) = &self.restriction {
            base = base & restriction.clone();
        }

        catalog
            .push(&self.total, base.clone() & one_of(columns.result, TESTED))
            .push(&self.negative, base.clone() & one_of(columns.result, NEGATIVE))
            .push(&self.positive, base & one_of(columns.result, POSITIVE));
    }
}
