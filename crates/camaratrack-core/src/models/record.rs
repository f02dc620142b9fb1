use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Activity, LegislatorProfile, MonthlyExpenseBatch, OfficeBudget, Resources};

/// The three scraped facets of one year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearlyFacets {
    pub budget: OfficeBudget,
    pub resources: Resources,
    pub activity: Activity,
}

/// Everything collected for one deputy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegislatorRecord {
    pub profile: LegislatorProfile,
    pub years: BTreeMap<i32, YearlyFacets>,
    pub expenses: Vec<MonthlyExpenseBatch>,
}

/// Durable result of collecting one party. Its existence in the store means
/// every member was collected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartyCheckpoint {
    pub party_code: String,
    pub legislators: Vec<LegislatorRecord>,
}
