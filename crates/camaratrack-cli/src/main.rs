//! camaratrack - collects Chamber of Deputies expense and attendance data and
//! writes the aggregate reports.
//!
//! Usage: `camaratrack [run|collect|aggregate]` (default `run`).

use std::io;
use std::path::Path;

use anyhow::{bail, Result};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use camaratrack_core::{pipeline, Config, FileStore, HttpSourceClient, RunReport};

/// Log file name prefix inside `<data_dir>/logs`
const LOG_FILE: &str = "camaratrack.log";

enum Command {
    Run,
    Collect,
    Aggregate,
}

impl Command {
    fn parse(arg: Option<&str>) -> Result<Self> {
        match arg {
            None | Some("run") => Ok(Command::Run),
            Some("collect") => Ok(Command::Collect),
            Some("aggregate") => Ok(Command::Aggregate),
            Some(other) => bail!("Unknown command: {} (expected run, collect or aggregate)", other),
        }
    }
}

/// Initialize the tracing subscriber: stderr plus a daily log file.
/// Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug).
fn init_tracing(data_dir: &Path) -> WorkerGuard {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_appender = tracing_appender::rolling::daily(data_dir.join("logs"), LOG_FILE);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .with(filter)
        .init();

    guard
}

fn print_run_report(report: &RunReport) {
    eprintln!(
        "Collected {} parties ({} already done)",
        report.checkpointed.len(),
        report.skipped.len()
    );
    for (party, reason) in &report.failed {
        eprintln!("  {} not collected: {}", party, reason);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().collect();
    let command = Command::parse(args.get(1).map(String::as_str))?;

    let config = Config::load()?;
    let data_dir = config.data_dir()?;
    let store = FileStore::new(data_dir.clone())?;
    let _guard = init_tracing(&data_dir);
    info!(data_dir = %data_dir.display(), "camaratrack starting");

    match command {
        Command::Run => {
            let client = HttpSourceClient::new(&config)?;
            let (report, summary) = pipeline::run_full(&client, &store, &store, &config).await?;
            print_run_report(&report);
            eprintln!(
                "Reports written for {} deputies from {} parties",
                summary.legislators, summary.parties
            );
        }
        Command::Collect => {
            let client = HttpSourceClient::new(&config)?;
            let report = pipeline::collect(&client, &store, &config).await?;
            print_run_report(&report);
            if !report.is_complete() {
                warn!("Some parties failed; run again to resume");
            }
        }
        Command::Aggregate => {
            let summary = pipeline::aggregate(&store, &store, &config)?;
            eprintln!(
                "Reports written for {} deputies from {} parties",
                summary.legislators, summary.parties
            );
        }
    }

    info!("camaratrack finished");
    Ok(())
}
