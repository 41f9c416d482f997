// src/models/period.rs

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

// Inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

// The six result sets merged into one report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportPeriod {
    Target,
    Mtd,
    PrevMonth,
    PrevYear,
    Ytd,
    PrevYtd,
}

impl ReportPeriod {
    pub fn label(self) -> &'static str {
        match self {
            ReportPeriod::Target => "target",
            ReportPeriod::Mtd => "mtd",
            ReportPeriod::PrevMonth => "prev_month",
            ReportPeriod::PrevYear => "prev_year",
            ReportPeriod::Ytd => "ytd",
            ReportPeriod::PrevYtd => "prev_ytd",
        }
    }
}

/// How a period restricts the source rows: actuals by date range, targets
/// by their `YYYYMM` month key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodFilter {
    Range(DateRange),
    Month(String),
}

// Date boundaries derived from one reference date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PeriodWindow {
    pub reference_date: NaiveDate,
    pub current: DateRange,
    pub prev_month: DateRange,
    pub prev_year: DateRange,
    pub ytd: DateRange,
    pub prev_ytd: DateRange,
    pub target_month: String,
    pub days_in_month: u32,
    pub day_of_month: u32,
}

impl PeriodWindow {
    pub fn filter_for(&self, period: ReportPeriod) -> PeriodFilter {
        match period {
            ReportPeriod::Target => PeriodFilter::Month(self.target_month.clone()),
            ReportPeriod::Mtd => PeriodFilter::Range(self.current),
            ReportPeriod::PrevMonth => PeriodFilter::Range(self.prev_month),
            ReportPeriod::PrevYear => PeriodFilter::Range(self.prev_year),
            ReportPeriod::Ytd => PeriodFilter::Range(self.ytd),
            ReportPeriod::PrevYtd => PeriodFilter::Range(self.prev_ytd),
        }
    }
}
