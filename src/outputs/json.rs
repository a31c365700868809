//! JSON output of the aggregate report.
//!
//! The persisted file is the full [`AggregateReport`] plus a derived
//! `platforms` array naming the sources that succeeded. It is also the input
//! for re-rendering: [`read_report`] loads it back and every exporter can run
//! from the loaded report alone.
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! └── report.json
//! ```

use crate::models::AggregateReport;
use serde::Serialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// File name of the JSON artifact.
pub const FILE_NAME: &str = "report.json";

#[derive(Serialize)]
struct JsonExport<'a> {
    #[serde(flatten)]
    report: &'a AggregateReport,
    platforms: Vec<&'a str>,
}

/// Serialize a report as pretty-printed JSON.
pub fn render(report: &AggregateReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonExport {
        report,
        platforms: report.platforms(),
    })
}

/// Write `report.json` into `output_dir`.
///
/// # Returns
///
/// The path of the written file, or an error if serialization or writing
/// fails.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display()))]
pub async fn write(report: &AggregateReport, output_dir: &Path) -> Result<PathBuf, Box<dyn Error>> {
    let json = render(report)?;
    let path = output_dir.join(FILE_NAME);
    info!(path = %path.display(), "Writing JSON");
    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote JSON report");
    Ok(path)
}

/// Load a report previously written by [`write`].
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn read_report(path: &Path) -> Result<AggregateReport, Box<dyn Error>> {
    let raw = fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceOutcome;
    use crate::models::tests::{item, ts};

    fn report() -> AggregateReport {
        AggregateReport::assemble(
            vec![
                SourceOutcome::success("BBC News", vec![item("Budget passes first vote", "https://bbc.com/1")], ts()),
                SourceOutcome::failure("Al Jazeera", "fetch failed for https://aljazeera.com/: HTTP 503", ts()),
            ],
            ts(),
        )
    }

    #[test]
    fn test_render_includes_platforms_and_counters() {
        let value: serde_json::Value = serde_json::from_str(&render(&report()).unwrap()).unwrap();
        assert_eq!(value["platforms"], serde_json::json!(["BBC News"]));
        assert_eq!(value["totalItems"], 1);
        assert_eq!(value["successCount"], 1);
        assert_eq!(value["failureCount"], 1);
        assert_eq!(value["outcomes"][1]["status"], "failure");
        assert_eq!(value["outcomes"][0]["items"][0]["title"], "Budget passes first vote");
    }

    #[test]
    fn test_rendered_json_loads_back() {
        let original = report();
        let loaded: AggregateReport = serde_json::from_str(&render(&original).unwrap()).unwrap();
        assert_eq!(loaded, original);
    }

    #[tokio::test]
    async fn test_write_and_read_back() {
        let dir = std::env::temp_dir().join(format!("source_digest_json_{}", std::process::id()));
        fs::create_dir_all(&dir).await.unwrap();
        let path = write(&report(), &dir).await.unwrap();
        assert!(path.ends_with(FILE_NAME));
        let loaded = read_report(&path).await.unwrap();
        assert_eq!(loaded, report());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
