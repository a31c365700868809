//! Command-line interface definitions for source_digest.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Most arguments can be provided via command-line flags or environment
//! variables; run settings given here override the config file.

use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the source_digest application.
///
/// # Examples
///
/// ```sh
/// # Built-in sources, artifacts in ./out
/// source_digest -o ./out
///
/// # Custom source list, only two of its sources, fetched in parallel
/// source_digest -c demos/events.yaml -o ./out --only Devpost --only MLH --concurrency 2
///
/// # Keyword search sources
/// source_digest -c demos/prices.yaml -o ./out -q "usb c hub" --history
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML source list (defaults to the built-in list)
    #[arg(short, long, env = "DIGEST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output directory for report.json, report.md and index.html
    #[arg(short, long, env = "DIGEST_OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Per-source time budget in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Pause between sources in milliseconds (sequential runs only)
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Maximum number of sources fetched at once
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub concurrency: Option<u64>,

    /// Search text substituted into `{query}` source URLs
    #[arg(short, long)]
    pub query: Option<String>,

    /// Only run the named source (repeatable)
    #[arg(long = "only", value_name = "NAME")]
    pub only: Vec<String>,

    /// Append live items to `<query>_price_history.csv` (needs --query)
    #[arg(long)]
    pub history: bool,
}

impl Cli {
    /// Apply the command-line overrides to a loaded config.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(secs) = self.timeout_secs {
            config.settings.timeout_secs = secs;
        }
        if let Some(ms) = self.delay_ms {
            config.settings.delay_ms = ms;
        }
        if let Some(n) = self.concurrency {
            config.settings.concurrency = usize::try_from(n).unwrap_or(usize::MAX);
        }
        if self.history {
            config.settings.history = true;
        }
    }
}
