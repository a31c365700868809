//! Artifact generation for JSON, Markdown, and HTML.
//!
//! Every exporter is a pure `render` function of the [`AggregateReport`]
//! plus an async `write` that puts the result in the output directory.
//! Rendering the same report twice gives byte-identical output.
//!
//! # Submodules
//!
//! - [`json`]: The persisted report, loadable again with [`json::read_report`]
//! - [`markdown`]: Items grouped by source for reading
//! - [`html`]: A static dashboard with counters and per-source filters
//! - [`history`]: Per-query CSV price history, appended to across runs
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── report.json
//! ├── report.md
//! ├── index.html
//! └── <query>_price_history.csv   # --history with --query only
//! ```
//!
//! [`AggregateReport`]: crate::models::AggregateReport

pub mod history;
pub mod html;
pub mod json;
pub mod markdown;

use crate::models::AggregateReport;
use std::path::{Path, PathBuf};
use tracing::{error, instrument};

/// Write the three report artifacts, returning the written paths and the
/// names of the artifacts that failed.
///
/// A failing exporter does not stop the others.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display()))]
pub async fn write_all(report: &AggregateReport, output_dir: &Path) -> (Vec<PathBuf>, Vec<&'static str>) {
    let mut written = Vec::new();
    let mut failed = Vec::new();

    match json::write(report, output_dir).await {
        Ok(path) => written.push(path),
        Err(e) => {
            error!(error = %e, "Failed to write JSON report");
            failed.push(json::FILE_NAME);
        }
    }
    match markdown::write(report, output_dir).await {
        Ok(path) => written.push(path),
        Err(e) => {
            error!(error = %e, "Failed to write Markdown report");
            failed.push(markdown::FILE_NAME);
        }
    }
    match html::write(report, output_dir).await {
        Ok(path) => written.push(path),
        Err(e) => {
            error!(error = %e, "Failed to write HTML dashboard");
            failed.push(html::FILE_NAME);
        }
    }

    (written, failed)
}
