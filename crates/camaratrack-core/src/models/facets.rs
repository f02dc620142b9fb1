//! Per-year facets scraped from a deputy's public pages.
//!
//! Every type here has a fixed shape with a default for each field, so a
//! page that is missing data still produces a complete record.

use serde::{Deserialize, Serialize};

use super::Amount;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuePercent {
    pub value: Amount,
    pub percent: Amount,
}

/// One row of the monthly office-budget table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyBudgetEntry {
    pub month: String,
    pub value: Amount,
    pub percent: Amount,
}

/// Office budget ("verba de gabinete") usage for one year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfficeBudget {
    pub spent: ValuePercent,
    pub available: ValuePercent,
    pub monthly: Vec<MonthlyBudgetEntry>,
}

/// Staff, salary and benefits for one year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    pub office_staff_raw: String,
    pub staff_planned: u32,
    /// Equals `staff_planned` when the page lists only one count.
    pub staff_active: u32,
    pub salary: Amount,
    pub official_residence: String,
    pub housing_allowance_raw: String,
    pub travel_allowance_raw: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityCount {
    pub count: u32,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attendance {
    pub present: u32,
    pub justified_absence: u32,
    pub unjustified_absence: u32,
    pub url: String,
}

impl Attendance {
    pub fn absent(&self) -> u32 {
        self.justified_absence.saturating_add(self.unjustified_absence)
    }
}

/// Bills authored/reported and session attendance for one year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub authored: ActivityCount,
    pub reported: ActivityCount,
    pub plenary: Attendance,
    pub committee: Attendance,
}
