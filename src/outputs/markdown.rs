//! Markdown output of the aggregate report.
//!
//! Items are grouped by source in outcome order, one `###` section per
//! source. Failed sources keep their section with zero items and the error
//! text, so nothing disappears from the document without a trace.
//!
//! ```text
//! ### BBC News (2 items)
//!
//! **Parliament votes on the new budget**
//! - **Link:** https://www.bbc.com/news/articles/c1
//! - **Published:** Tue, 06 May 2025 14:30:00 GMT
//! ```

use crate::models::{AggregateReport, SourceOutcome};
use crate::utils::{field_label, normalize_whitespace, slugify_title};
use std::error::Error;
use std::fmt::{self, Write};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// File name of the Markdown artifact.
pub const FILE_NAME: &str = "report.md";

/// Escape inline Markdown and collapse whitespace so a value stays on its
/// own line and renders literally.
fn inline(s: &str) -> String {
    let text = normalize_whitespace(s);
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '*' | '_' | '`' | '[' | ']' | '<' | '>' | '#' | '|') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn heading(outcome: &SourceOutcome) -> String {
    format!("{} ({} items)", inline(outcome.source_name()), outcome.items().len())
}

fn write_section(md: &mut String, outcome: &SourceOutcome) -> fmt::Result {
    writeln!(md, "### {}\n", heading(outcome))?;

    if let Some(error) = outcome.error() {
        writeln!(md, "_Source unavailable: {}_\n", inline(error))?;
        return Ok(());
    }
    if outcome.is_synthetic() {
        writeln!(md, "_Placeholder data: the live fetch failed, these items are canned._\n")?;
    }
    if outcome.items().is_empty() {
        writeln!(md, "_No items._\n")?;
    }

    for item in outcome.items() {
        writeln!(md, "**{}**", inline(&item.title))?;
        writeln!(md, "- **Link:** {}", item.url.split_whitespace().collect::<String>())?;
        for (key, value) in &item.fields {
            writeln!(md, "- **{}:** {}", inline(&field_label(key)), inline(value))?;
        }
        writeln!(md)?;
    }
    Ok(())
}

fn write_report(md: &mut String, report: &AggregateReport) -> fmt::Result {
    writeln!(md, "# Aggregated Digest\n")?;
    writeln!(
        md,
        "Generated on: {}  ",
        report.generated_at().format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(md, "Total Items: {}  ", report.total_items())?;
    writeln!(
        md,
        "Sources: {} succeeded, {} failed\n",
        report.success_count(),
        report.failure_count()
    )?;

    if !report.outcomes().is_empty() {
        writeln!(md, "## Contents\n")?;
        for outcome in report.outcomes() {
            let heading = heading(outcome);
            let marker = if outcome.is_success() { "" } else { " (unavailable)" };
            writeln!(md, "- [{}](#{}){}", heading, slugify_title(&heading), marker)?;
        }
        writeln!(md)?;
    }

    writeln!(md, "## Items by Source\n")?;
    for outcome in report.outcomes() {
        write_section(md, outcome)?;
    }
    Ok(())
}

/// Render a report as Markdown.
pub fn render(report: &AggregateReport) -> Result<String, fmt::Error> {
    let mut md = String::new();
    write_report(&mut md, report)?;
    Ok(md)
}

/// Write `report.md` into `output_dir`.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display()))]
pub async fn write(report: &AggregateReport, output_dir: &Path) -> Result<PathBuf, Box<dyn Error>> {
    let md = render(report)?;
    let path = output_dir.join(FILE_NAME);
    info!(path = %path.display(), "Writing Markdown");
    fs::write(&path, md).await?;
    info!(path = %path.display(), "Wrote Markdown report");
    Ok(path)
}
