//! A full run: collect whatever is missing, then rebuild the reports.

use anyhow::Result;
use tracing::info;

use crate::aggregate::{AggregateSummary, Aggregator};
use crate::api::SourceClient;
use crate::config::Config;
use crate::runner::{PartyBatchRunner, RunReport};
use crate::store::{ArtifactSink, CheckpointStore};

pub async fn collect(
    client: &dyn SourceClient,
    store: &dyn CheckpointStore,
    config: &Config,
) -> Result<RunReport> {
    PartyBatchRunner::new(client, store, config).run().await
}

pub fn aggregate(
    store: &dyn CheckpointStore,
    sink: &dyn ArtifactSink,
    config: &Config,
) -> Result<AggregateSummary> {
    Aggregator::new(store, config).aggregate(sink)
}

/// Aggregation always runs after collection, even when some parties failed:
/// the reports then cover the parties collected so far.
pub async fn run_full(
    client: &dyn SourceClient,
    store: &dyn CheckpointStore,
    sink: &dyn ArtifactSink,
    config: &Config,
) -> Result<(RunReport, AggregateSummary)> {
    let report = collect(client, store, config).await?;
    if !report.is_complete() {
        info!(failed = report.failed.len(), "Aggregating over a partial set of parties");
    }
    let summary = aggregate(store, sink, config)?;
    Ok((report, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::TOTALIZER_ARTIFACT;
    use crate::config::Period;
    use crate::store::{FileStore, MemoryStore};
    use crate::test_support::FakeSource;

    #[tokio::test]
    async fn test_run_full_with_one_party_failing() {
        let source = FakeSource::new(&["AAA", "BBB"])
            .with_member(1, "AAA")
            .with_member(2, "BBB");
        source.fail_member(2);
        let store = MemoryStore::new();
        let config = Config {
            periods: vec![Period::new(2019, 12)],
            ..Config::default()
        };

        let (report, summary) = run_full(&source, &store, &store, &config).await.unwrap();

        assert_eq!(report.failed.len(), 1);
        assert_eq!(summary.legislators, 1);
        let totalizer = store.artifact(TOTALIZER_ARTIFACT).unwrap();
        // 1500.00 budget + 200.00 housing + 12 x 50.00 expenses
        assert_eq!(totalizer[0]["composite_score"].as_f64(), Some(2300.0));
        assert_eq!(totalizer[0]["legislative_expense_total"].as_f64(), Some(600.0));
    }

    #[tokio::test]
    async fn test_run_full_on_disk_twice_keeps_checkpoints_identical() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();
        let source = FakeSource::new(&["AAA"]).with_member(1, "AAA");
        let config = Config {
            periods: vec![Period::new(2019, 1)],
            ..Config::default()
        };

        run_full(&source, &store, &store, &config).await.unwrap();
        let path = dir.path().join("checkpoints/AAA.json");
        let first = std::fs::read(&path).unwrap();
        source.clear_requests();

        run_full(&source, &store, &store, &config).await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), first);
        assert_eq!(source.request_count(), 2);
        assert!(dir.path().join("totalizer.json").exists());
        assert!(dir.path().join("expense_breakdown.json").exists());
        assert!(dir.path().join("roster.json").exists());
    }
}
