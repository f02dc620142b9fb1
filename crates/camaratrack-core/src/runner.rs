//! Party-by-party batch collection.
//!
//! A party is the unit of work and of retry: its members are collected in
//! memory and the checkpoint is written only after the last one succeeds. A
//! remote failure abandons the party for this run and leaves it uncollected,
//! so the next run picks it up again. Parties already checkpointed are never
//! revisited.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::api::{endpoints, RemoteError, SourceClient};
use crate::collector::PeriodCollector;
use crate::config::Config;
use crate::models::{PartyCheckpoint, RosterEntry};
use crate::store::CheckpointStore;

/// Outcome of one `run`.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Parties checkpointed by this run.
    pub checkpointed: Vec<String>,
    /// Parties that already had a checkpoint.
    pub skipped: Vec<String>,
    /// Parties abandoned after a remote failure, with the reason.
    pub failed: Vec<(String, String)>,
}

impl RunReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct PartyBatchRunner<'a> {
    client: &'a dyn SourceClient,
    store: &'a dyn CheckpointStore,
    collector: PeriodCollector<'a>,
}

impl<'a> PartyBatchRunner<'a> {
    pub fn new(client: &'a dyn SourceClient, store: &'a dyn CheckpointStore, config: &Config) -> Self {
        Self {
            client,
            store,
            collector: PeriodCollector::new(client, config),
        }
    }

    pub async fn run(&self) -> Result<RunReport> {
        let started_at = Utc::now();

        let parties = endpoints::list_parties(self.client)
            .await
            .context("Failed to list parties")?;
        let roster = endpoints::list_legislators(self.client)
            .await
            .context("Failed to list deputies")?;
        info!(parties = parties.len(), deputies = roster.len(), "Fetched parties and roster");

        let mut pending = Vec::new();
        let mut skipped = Vec::new();
        for code in parties {
            if self.store.has(&code)? {
                skipped.push(code);
            } else {
                pending.push(code);
            }
        }
        info!(pending = pending.len(), skipped = skipped.len(), "Parties to collect");

        let mut checkpointed = Vec::new();
        let mut failed = Vec::new();
        for code in pending {
            match self.collect_party(&code, &roster).await {
                Ok(checkpoint) => {
                    self.store
                        .put(&code, &checkpoint)
                        .with_context(|| format!("Failed to checkpoint party {}", code))?;
                    info!(party = %code, members = checkpoint.legislators.len(), "Party checkpointed");
                    checkpointed.push(code);
                }
                Err(e) => {
                    warn!(party = %code, error = %e, "Party abandoned, will retry on next run");
                    failed.push((code, e.to_string()));
                }
            }
        }

        let report = RunReport {
            started_at,
            finished_at: Utc::now(),
            checkpointed,
            skipped,
            failed,
        };
        info!(
            checkpointed = report.checkpointed.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Collection finished"
        );
        Ok(report)
    }

    /// Collect every member of one party, in roster order.
    async fn collect_party(
        &self,
        code: &str,
        roster: &[RosterEntry],
    ) -> Result<PartyCheckpoint, RemoteError> {
        let members: Vec<i64> = roster
            .iter()
            .filter(|d| d.party_code == code)
            .map(|d| d.id)
            .collect();
        info!(party = %code, members = members.len(), "Collecting party");

        let mut legislators = Vec::with_capacity(members.len());
        for (i, id) in members.iter().enumerate() {
            debug!(party = %code, id, position = i + 1, total = members.len(), "Collecting deputy");
            legislators.push(self.collector.collect_legislator(*id).await?);
        }

        Ok(PartyCheckpoint {
            party_code: code.to_string(),
            legislators,
        })
    }
}
