//! Aggregation of collected checkpoints into the final reports.
//!
//! Everything is recomputed from the checkpoints on every call. Parties that
//! have not been collected yet are simply absent from the result.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::Config;
use crate::extract::extract_number;
use crate::models::{Amount, LegislatorProfile, LegislatorRecord, YearlyFacets};
use crate::store::{ArtifactSink, CheckpointStore};

pub const ROSTER_ARTIFACT: &str = "roster";
pub const TOTALIZER_ARTIFACT: &str = "totalizer";
pub const BREAKDOWN_ARTIFACT: &str = "expense_breakdown";

/// Derived figures for one deputy and one year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearlyMetrics {
    pub year: i32,
    pub staff_active: u32,
    pub salary: Amount,
    pub official_residence: String,
    pub housing_allowance: Amount,
    pub office_budget: Amount,
    pub authored: u32,
    pub reported: u32,
    pub plenary_present: u32,
    pub plenary_absent: u32,
    pub committee_present: u32,
    pub committee_absent: u32,
    pub legislative_expense: Amount,
}

/// One row of the totalizer report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRecord {
    #[serde(flatten)]
    pub profile: LegislatorProfile,
    /// Salary of the last configured year.
    pub salary: Amount,
    pub official_residence: BTreeMap<i32, String>,
    pub staff_active: BTreeMap<i32, u32>,
    pub housing_allowance_total: Amount,
    pub authored_total: u32,
    pub reported_total: u32,
    pub plenary_present_total: u32,
    pub plenary_absent_total: u32,
    pub committee_present_total: u32,
    pub committee_absent_total: u32,
    pub office_budget_total: Amount,
    pub legislative_expense_total: Amount,
    /// housing allowance + office budget + legislative expense
    pub composite_score: Amount,
    pub years: Vec<YearlyMetrics>,
}

/// Expense totals of one deputy, by category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseBreakdownRecord {
    #[serde(flatten)]
    pub profile: LegislatorProfile,
    pub categories: BTreeMap<String, Amount>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateSummary {
    pub parties: usize,
    pub legislators: usize,
}

/// Sum of one per-year count, saturating at `u32::MAX`.
fn count_total(years: &[YearlyMetrics], field: impl Fn(&YearlyMetrics) -> u32) -> u32 {
    years.iter().map(field).fold(0u32, u32::saturating_add)
}

pub struct Aggregator<'a> {
    store: &'a dyn CheckpointStore,
    years: Vec<i32>,
}

impl<'a> Aggregator<'a> {
    pub fn new(store: &'a dyn CheckpointStore, config: &Config) -> Self {
        Self {
            store,
            years: config.years(),
        }
    }

    /// Every checkpoint, keyed by party code.
    pub fn merged_roster(&self) -> Result<BTreeMap<String, Vec<LegislatorRecord>>> {
        let mut roster = BTreeMap::new();
        for key in self.store.keys()? {
            if let Some(checkpoint) = self.store.get(&key)? {
                roster.insert(key, checkpoint.legislators);
            }
        }
        Ok(roster)
    }

    /// All collected deputies, party by party in key order.
    pub fn load_all(&self) -> Result<Vec<LegislatorRecord>> {
        Ok(self.merged_roster()?.into_values().flatten().collect())
    }

    pub fn derive_yearly(record: &LegislatorRecord, year: i32) -> YearlyMetrics {
        let default_facets = YearlyFacets::default();
        let facets = record.years.get(&year).unwrap_or(&default_facets);
        let resources = &facets.resources;
        let activity = &facets.activity;

        let legislative_expense: Amount = record
            .expenses
            .iter()
            .filter(|batch| batch.year() == Some(year))
            .map(|batch| batch.total())
            .sum();

        YearlyMetrics {
            year,
            staff_active: resources.staff_active,
            salary: resources.salary,
            official_residence: resources.official_residence.clone(),
            housing_allowance: extract_number(&resources.housing_allowance_raw),
            office_budget: facets.budget.spent.value,
            authored: activity.authored.count,
            reported: activity.reported.count,
            plenary_present: activity.plenary.present,
            plenary_absent: activity.plenary.absent(),
            committee_present: activity.committee.present,
            committee_absent: activity.committee.absent(),
            legislative_expense,
        }
    }

    pub fn derive_total(&self, record: &LegislatorRecord) -> AggregateRecord {
        let years: Vec<YearlyMetrics> = self
            .years
            .iter()
            .map(|&year| Self::derive_yearly(record, year))
            .collect();

        let housing_allowance_total: Amount = years.iter().map(|y| y.housing_allowance).sum();
        let office_budget_total: Amount = years.iter().map(|y| y.office_budget).sum();
        let legislative_expense_total: Amount = years.iter().map(|y| y.legislative_expense).sum();

        AggregateRecord {
            profile: record.profile.clone(),
            salary: years.last().map(|y| y.salary).unwrap_or_default(),
            official_residence: years
                .iter()
                .map(|y| (y.year, y.official_residence.clone()))
                .collect(),
            staff_active: years.iter().map(|y| (y.year, y.staff_active)).collect(),
            housing_allowance_total,
            authored_total: count_total(&years, |y| y.authored),
            reported_total: count_total(&years, |y| y.reported),
            plenary_present_total: count_total(&years, |y| y.plenary_present),
            plenary_absent_total: count_total(&years, |y| y.plenary_absent),
            committee_present_total: count_total(&years, |y| y.committee_present),
            committee_absent_total: count_total(&years, |y| y.committee_absent),
            office_budget_total,
            legislative_expense_total,
            composite_score: housing_allowance_total + office_budget_total + legislative_expense_total,
            years,
        }
    }

    /// Ascending by composite score; ties keep their input order.
    pub fn rank(mut records: Vec<AggregateRecord>) -> Vec<AggregateRecord> {
        records.sort_by_key(|r| r.composite_score);
        records
    }

    pub fn bucket_expenses(records: &[LegislatorRecord]) -> Vec<ExpenseBreakdownRecord> {
        records
            .iter()
            .map(|record| {
                let categories = record
                    .expenses
                    .iter()
                    .flat_map(|batch| &batch.entries)
                    .fold(BTreeMap::new(), |mut acc, entry| {
                        *acc.entry(entry.category.clone()).or_insert(Amount::ZERO) += entry.net_value;
                        acc
                    });
                ExpenseBreakdownRecord {
                    profile: record.profile.clone(),
                    categories,
                }
            })
            .collect()
    }

    pub fn persist_outputs(
        sink: &dyn ArtifactSink,
        roster: &BTreeMap<String, Vec<LegislatorRecord>>,
        ranked: &[AggregateRecord],
        breakdown: &[ExpenseBreakdownRecord],
    ) -> Result<()> {
        sink.write_artifact(ROSTER_ARTIFACT, &serde_json::to_value(roster)?)
            .context("Failed to write merged roster")?;
        sink.write_artifact(TOTALIZER_ARTIFACT, &serde_json::to_value(ranked)?)
            .context("Failed to write totalizer")?;
        sink.write_artifact(BREAKDOWN_ARTIFACT, &serde_json::to_value(breakdown)?)
            .context("Failed to write expense breakdown")?;
        Ok(())
    }

    /// Load, derive, rank, bucket and write every report.
    pub fn aggregate(&self, sink: &dyn ArtifactSink) -> Result<AggregateSummary> {
        let roster = self.merged_roster()?;
        let records: Vec<LegislatorRecord> = roster.values().flatten().cloned().collect();

        let ranked = Self::rank(records.iter().map(|r| self.derive_total(r)).collect());
        let breakdown = Self::bucket_expenses(&records);
        Self::persist_outputs(sink, &roster, &ranked, &breakdown)?;

        let summary = AggregateSummary {
            parties: roster.len(),
            legislators: records.len(),
        };
        info!(
            parties = summary.parties,
            deputies = summary.legislators,
            "Reports written"
        );
        Ok(summary)
    }
}
