//! Jarsync - check plugin and Paper jars for updates and download new builds.
//!
//! Progress and logs go to stderr; the report (or JSON with `--json`) goes to
//! stdout.

mod report;

use anyhow::{Context, Result};
use clap::Parser;
use jarsync_core::config::{default_output_dir, MatchConfig};
use jarsync_core::{CancellationToken, Updater, UpdaterConfig, WorkingSet};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "jarsync")]
#[command(about = "Find and download the latest builds of server plugins and Paper")]
#[command(version)]
struct Args {
    /// Plugin jars, Paper jars, or directories containing them
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Directory new builds are saved to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Minimum name-match score for accepting a catalog search hit
    #[arg(long, default_value_t = MatchConfig::ACCEPT_THRESHOLD)]
    threshold: u32,

    /// Number of artifacts checked at the same time
    #[arg(short, long, default_value_t = 1)]
    jobs: usize,

    /// Print outcomes as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG wins over --debug when set.
    let level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,jarsync={0},jarsync_core={0}", level)));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    let mut set = WorkingSet::new();
    let ingest = set.ingest(&args.paths);
    eprintln!("{}", report::ingest_line(&ingest));
    if set.is_empty() {
        warn!("No jar files to check");
        return Ok(());
    }

    let config = UpdaterConfig::builder()
        .output_dir(args.output_dir.clone().unwrap_or_else(default_output_dir))
        .match_threshold(args.threshold)
        .parallelism(args.jobs)
        .build();
    info!("Saving updates to {}", config.output_dir.display());
    let updater = Updater::new(config).context("failed to set up the updater")?;

    let cancel = CancellationToken::new();
    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling remaining work");
            ctrl_c_token.cancel();
        }
    });

    let (tx, mut rx) = mpsc::channel(256);
    let names: Vec<String> = set
        .artifacts()
        .iter()
        .map(|a| a.display_name.clone())
        .collect();
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let Some(line) = report::progress_line(&event, &names) {
                eprintln!("{}", line);
            }
        }
    });

    let outcomes = updater.run(&mut set, &cancel, Some(tx)).await?;
    printer.await.context("progress printer panicked")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    } else {
        for outcome in &outcomes {
            println!("{}", report::outcome_line(outcome));
        }
        println!("{}", jarsync_core::RunSummary::from_outcomes(&outcomes));
    }

    Ok(())
}
