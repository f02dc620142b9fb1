//! Data models for Chamber of Deputies entities.
//!
//! - `LegislatorProfile` and the API response wrappers it is built from
//! - Per-year facets: `OfficeBudget`, `Resources`, `Activity`
//! - Expenses: `ExpenseEntry`, `MonthlyExpenseBatch`
//! - Collection output: `LegislatorRecord`, `PartyCheckpoint`
//! - `Amount`: the two-decimal fixed-point number used for money

pub mod amount;
pub mod expense;
pub mod facets;
pub mod legislator;
pub mod record;

pub use amount::Amount;
pub use expense::{ExpenseEntry, ExpenseItem, MonthlyExpenseBatch};
pub use facets::{
    Activity, ActivityCount, Attendance, MonthlyBudgetEntry, OfficeBudget, Resources, ValuePercent,
};
pub use legislator::{
    profile_uri, Envelope, LastStatus, LegislatorInfoResponse, LegislatorProfile, PartyItem,
    RosterEntry,
};
pub use record::{LegislatorRecord, PartyCheckpoint, YearlyFacets};
