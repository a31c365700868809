//! # source_digest
//!
//! Command-line entry point: load the source list, run every source once,
//! and write `report.json`, `report.md` and `index.html`.
//!
//! ## Usage
//!
//! ```sh
//! source_digest -o ./out
//! source_digest -c demos/events.yaml -o ./out --only Devpost
//! ```
//!
//! ## Exit status
//!
//! - `0`: a report was produced and every artifact was written, even if
//!   every source failed
//! - non-zero: setup failed (bad config, unwritable output directory,
//!   unknown `--only` name) or an artifact could not be written

use clap::Parser;
use source_digest::cli::Cli;
use source_digest::config::Config;
use source_digest::outputs;
use source_digest::utils::{ensure_writable_dir, truncate_for_log};
use std::error::Error;
use tracing::{debug, error, info, info_span, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("source_digest starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.config, ?args.output_dir, ?args.only, "Parsed CLI arguments");

    // ---- Load config ----
    let mut config = match &args.config {
        Some(path) => Config::load(path),
        None => Config::builtin(),
    }
    .inspect_err(|e| error!(error = %e, "Invalid configuration"))?;
    args.apply_to(&mut config);
    config
        .retain_only(&args.only)
        .inspect_err(|e| error!(error = %e, "Cannot select sources"))?;

    // Early check: ensure output dir is writable
    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let aggregator = config
        .aggregator(args.query.as_deref(), info_span!("run"))
        .inspect_err(|e| error!(error = %e, "Cannot build sources"))?;
    info!(
        sources = aggregator.len(),
        timeout_secs = config.settings.timeout_secs,
        concurrency = config.settings.concurrency,
        "Sources registered"
    );

    // ---- Aggregate ----
    let report = aggregator.run().await;

    // ---- Output ----
    let (mut written, mut failed) = outputs::write_all(&report, &args.output_dir).await;

    if config.settings.history {
        match args.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            Some(query) => match outputs::history::append(&report, &args.output_dir, query).await {
                Ok(Some(path)) => written.push(path),
                Ok(None) => {}
                Err(e) => {
                    error!(error = %e, "Failed to append price history");
                    failed.push("price history");
                }
            },
            None => warn!("Price history needs --query; skipping it"),
        }
    }

    println!(
        "{} items from {} sources ({} succeeded, {} failed)",
        report.total_items(),
        report.outcomes().len(),
        report.success_count(),
        report.failure_count()
    );
    for outcome in report.outcomes() {
        match outcome.error() {
            Some(e) => println!("  {:<20} failed: {}", outcome.source_name(), truncate_for_log(e, 120)),
            None if outcome.is_synthetic() => {
                println!("  {:<20} {} placeholder items", outcome.source_name(), outcome.items().len())
            }
            None => println!("  {:<20} {} items", outcome.source_name(), outcome.items().len()),
        }
    }
    for path in &written {
        println!("wrote {}", path.display());
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    if !failed.is_empty() {
        return Err(format!("failed to write {}", failed.join(", ")).into());
    }
    Ok(())
}
