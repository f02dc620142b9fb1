//! Core library for camaratrack.
//!
//! Collects per-deputy expense, staff and attendance data from the Chamber of
//! Deputies (open data API plus public pages), checkpoints it party by party,
//! and aggregates it into a ranked totalizer and an expense breakdown.

pub mod aggregate;
pub mod api;
pub mod collector;
pub mod config;
pub mod extract;
pub mod models;
pub mod pipeline;
pub mod runner;
pub mod store;

#[cfg(test)]
mod test_support;

pub use aggregate::{AggregateRecord, AggregateSummary, Aggregator, ExpenseBreakdownRecord};
pub use api::{HttpSourceClient, RemoteError, SourceClient};
pub use collector::PeriodCollector;
pub use config::{Config, Period};
pub use runner::{PartyBatchRunner, RunReport};
pub use store::{ArtifactSink, CheckpointStore, FileStore, MemoryStore};
