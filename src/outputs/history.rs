//! Price history: one CSV file per search query, appended to on every run.
//!
//! Each run adds one row per live item:
//!
//! ```text
//! generated_at,source,title,url,price
//! 2025-05-06T20:30:00+00:00,Amazon,USB C Hub 7-in-1,https://www.amazon.in/dp/1,1299
//! ```
//!
//! The header is written only when the file is new or empty. Failed sources
//! and placeholder (synthetic) items are never recorded, so the history only
//! holds prices that were actually observed.

use crate::models::AggregateReport;
use serde::Serialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument};

#[derive(Serialize)]
struct HistoryRow<'a> {
    generated_at: String,
    source: &'a str,
    title: &'a str,
    url: &'a str,
    price: &'a str,
}

/// History file name for a query: `usb c hub` becomes
/// `usb_c_hub_price_history.csv`.
pub fn file_name(query: &str) -> String {
    let stem: String = query
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    let stem = if stem.is_empty() { "query".to_string() } else { stem.to_lowercase() };
    format!("{stem}_price_history.csv")
}

/// Render the rows for one report. With `header` set, a header line comes
/// first (only if there is at least one row).
pub fn render(report: &AggregateReport, header: bool) -> Result<Vec<u8>, csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(header)
        .from_writer(Vec::new());
    let generated_at = report.generated_at().to_rfc3339();

    for outcome in report.outcomes().iter().filter(|o| o.is_success() && !o.is_synthetic()) {
        for item in outcome.items() {
            wtr.serialize(HistoryRow {
                generated_at: generated_at.clone(),
                source: outcome.source_name(),
                title: &item.title,
                url: &item.url,
                price: item.field("price").unwrap_or_default(),
            })?;
        }
    }
    wtr.into_inner().map_err(|e| csv::Error::from(e.into_error()))
}

/// Append this run's rows to the history file for `query` in `output_dir`.
///
/// Returns `None` when the report has no live items to record.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display(), query))]
pub async fn append(report: &AggregateReport, output_dir: &Path, query: &str) -> Result<Option<PathBuf>, Box<dyn Error>> {
    let path = output_dir.join(file_name(query));
    let is_new = match fs::metadata(&path).await {
        Ok(meta) => meta.len() == 0,
        Err(_) => true,
    };

    let rows = render(report, is_new)?;
    if rows.is_empty() {
        info!(path = %path.display(), "No live items; price history unchanged");
        return Ok(None);
    }

    let mut file = OpenOptions::new().create(true).append(true).open(&path).await?;
    file.write_all(&rows).await?;
    file.flush().await?;
    info!(path = %path.display(), bytes = rows.len(), "Appended price history");
    Ok(Some(path))
}
