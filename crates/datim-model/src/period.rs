//! Reporting period and the date windows derived from it.
//!
//! Every window is computed once, when the period is built, so predicates only
//! ever compare dates against fixed bounds.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::Serialize;

use crate::error::{ModelError, Result};

/// An inclusive `[start, end]` date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Inclusive on both ends.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// The reporting quarter plus every derived window the indicator catalogs use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportingPeriod {
    quarter: DateWindow,
    semiannual: DateWindow,
    viral_load_sample: DateWindow,
    viral_load_result: DateWindow,
    tpt_3hp_early_start: DateWindow,
    tpt_3hp_late_start: DateWindow,
    tpt_ipt_start: DateWindow,
    tpt_3hp_early_completion: DateWindow,
    tpt_late_completion: DateWindow,
}

fn months_before(anchor: NaiveDate, months: u32) -> Result<NaiveDate> {
    anchor
        .checked_sub_months(Months::new(months))
        .ok_or(ModelError::DateOutOfRange { anchor })
}

fn months_after(anchor: NaiveDate, months: u32) -> Result<NaiveDate> {
    anchor
        .checked_add_months(Months::new(months))
        .ok_or(ModelError::DateOutOfRange { anchor })
}

fn day_before(anchor: NaiveDate) -> Result<NaiveDate> {
    anchor
        .checked_sub_days(Days::new(1))
        .ok_or(ModelError::DateOutOfRange { anchor })
}

fn day_after(anchor: NaiveDate) -> Result<NaiveDate> {
    anchor
        .checked_add_days(Days::new(1))
        .ok_or(ModelError::DateOutOfRange { anchor })
}

impl ReportingPeriod {
    /// Builds a period from inclusive boundary dates.
    ///
    /// Fails when `start > end` or when a derived window would leave the
    /// calendar chrono supports.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(ModelError::InvalidPeriod { start, end });
        }

        let three_back = months_before(start, 3)?;
        let six_back = months_before(start, 6)?;
        let nine_back = months_before(start, 9)?;
        let year_back = day_after(months_before(end, 12)?)?;

        Ok(Self {
            quarter: DateWindow::new(start, end),
            semiannual: DateWindow::new(three_back, end),
            viral_load_sample: DateWindow::new(year_back, end),
            viral_load_result: DateWindow::new(year_back, day_before(months_after(start, 4)?)?),
            tpt_3hp_early_start: DateWindow::new(nine_back, day_before(six_back)?),
            tpt_3hp_late_start: DateWindow::new(six_back, day_before(three_back)?),
            tpt_ipt_start: DateWindow::new(nine_back, day_before(three_back)?),
            tpt_3hp_early_completion: DateWindow::new(six_back, end),
            tpt_late_completion: DateWindow::new(three_back, end),
        })
    }

    pub fn start(&self) -> NaiveDate {
        self.quarter.start
    }

    pub fn end(&self) -> NaiveDate {
        self.quarter.end
    }

    /// The reporting quarter itself.
    pub fn quarter(&self) -> DateWindow {
        self.quarter
    }

    /// Previous quarter start through quarter end, used by the TB and
    /// cervical cancer cohorts.
    pub fn semiannual(&self) -> DateWindow {
        self.semiannual
    }

    pub fn previous_quarter_start(&self) -> NaiveDate {
        self.semiannual.start
    }

    /// Viral load samples collected in the twelve months ending at quarter end.
    pub fn viral_load_sample(&self) -> DateWindow {
        self.viral_load_sample
    }

    /// Results received from the start of the sample window through the first
    /// month after the quarter.
    pub fn viral_load_result(&self) -> DateWindow {
        self.viral_load_result
    }

    pub fn tpt_3hp_early_start(&self) -> DateWindow {
        self.tpt_3hp_early_start
    }

    pub fn tpt_3hp_late_start(&self) -> DateWindow {
        self.tpt_3hp_late_start
    }

    pub fn tpt_ipt_start(&self) -> DateWindow {
        self.tpt_ipt_start
    }

    pub fn tpt_3hp_early_completion(&self) -> DateWindow {
        self.tpt_3hp_early_completion
    }

    pub fn tpt_3hp_late_completion(&self) -> DateWindow {
        self.tpt_late_completion
    }

    pub fn tpt_ipt_completion(&self) -> DateWindow {
        self.tpt_late_completion
    }

    /// True when the period runs from the first day of a calendar quarter to
    /// the last day of the same quarter.
    pub fn is_calendar_quarter(&self) -> bool {
        let start = self.start();
        let end = self.end();
        let aligned_start = start.day() == 1 && (start.month() - 1) % 3 == 0;
        let expected_end = months_after(start, 3).and_then(day_before);
        aligned_start && expected_end.is_ok_and(|expected| expected == end)
    }
}
