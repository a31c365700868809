//! Static HTML dashboard.
//!
//! A single self-contained page: inline CSS, inline script, no server. It
//! shows summary counters, one filter button per successful source and one
//! card per item. Cards carry a `data-source` attribute that the script
//! filters on. Failed sources are listed in a notice above the grid, and a
//! run with no items renders an empty-state message instead of cards.

use crate::models::{AggregateReport, Item, SourceOutcome};
use crate::utils::field_label;
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use std::error::Error;
use std::fmt::{self, Write};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// File name of the HTML artifact.
pub const FILE_NAME: &str = "index.html";

const STYLE: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); min-height: 100vh; padding: 20px; }
.container { max-width: 1200px; margin: 0 auto; background: rgba(255,255,255,0.95); border-radius: 20px; padding: 30px; box-shadow: 0 20px 40px rgba(0,0,0,0.1); }
.header { text-align: center; margin-bottom: 30px; border-bottom: 3px solid #667eea; padding-bottom: 20px; }
.header h1 { color: #333; font-size: 2.4em; margin-bottom: 8px; }
.generated { color: #666; }
.stats { display: flex; justify-content: center; gap: 24px; margin: 20px 0; flex-wrap: wrap; }
.stat-card { background: linear-gradient(45deg, #667eea, #764ba2); color: white; padding: 15px 25px; border-radius: 15px; text-align: center; min-width: 120px; }
.stat-number { font-size: 2em; font-weight: bold; }
.stat-label { font-size: 0.9em; opacity: 0.9; }
.filters { margin: 20px 0; text-align: center; }
.filter-btn { background: #fff; border: 2px solid #667eea; color: #667eea; padding: 8px 16px; margin: 5px; border-radius: 25px; cursor: pointer; }
.filter-btn:hover, .filter-btn.active { background: #667eea; color: white; }
.failures { background: #fff4f4; border-left: 5px solid #d9534f; border-radius: 10px; padding: 15px 20px; margin: 20px 0; }
.failures h2 { font-size: 1.1em; color: #a94442; margin-bottom: 8px; }
.failures li { margin-left: 20px; color: #555; }
.grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(320px, 1fr)); gap: 25px; margin-top: 20px; }
.card { position: relative; background: white; border-radius: 15px; padding: 25px; box-shadow: 0 10px 25px rgba(0,0,0,0.1); border-left: 5px solid #667eea; }
.card.synthetic { border-left-color: #f0ad4e; }
.card-title { font-size: 1.2em; margin: 18px 0 12px; line-height: 1.4; }
.card-title a { color: #333; text-decoration: none; }
.card-title a:hover { text-decoration: underline; }
.detail { margin: 8px 0; }
.detail strong { color: #667eea; margin-right: 6px; }
.source-tag { position: absolute; top: 12px; right: 15px; background: rgba(102,126,234,0.1); color: #667eea; padding: 4px 10px; border-radius: 10px; font-size: 0.8em; }
.placeholder-tag { position: absolute; top: 12px; left: 15px; background: #fcf8e3; color: #8a6d3b; padding: 4px 10px; border-radius: 10px; font-size: 0.8em; }
.category-badge { display: inline-block; background: linear-gradient(45deg, #667eea, #764ba2); color: white; padding: 5px 12px; border-radius: 20px; font-size: 0.8em; font-weight: bold; margin-top: 10px; }
.empty { grid-column: 1 / -1; text-align: center; color: #666; padding: 40px 0; }
@media (max-width: 768px) { .grid { grid-template-columns: 1fr; } .stats { flex-direction: column; align-items: center; } }
"#;

const SCRIPT: &str = r#"
document.addEventListener('DOMContentLoaded', function () {
  var buttons = document.querySelectorAll('.filter-btn');
  var cards = document.querySelectorAll('.card');
  buttons.forEach(function (btn) {
    btn.addEventListener('click', function () {
      var source = btn.dataset.filter;
      buttons.forEach(function (b) { b.classList.remove('active'); });
      btn.classList.add('active');
      cards.forEach(function (card) {
        card.style.display = (source === '*' || card.dataset.source === source) ? '' : 'none';
      });
    });
  });
});
"#;

/// Only http(s) links are emitted; anything else becomes an inert anchor.
fn safe_href(url: &str) -> &str {
    if url.starts_with("https://") || url.starts_with("http://") {
        url
    } else {
        "#"
    }
}

fn write_stat(html: &mut String, value: usize, label: &str) -> fmt::Result {
    writeln!(
        html,
        r#"<div class="stat-card"><div class="stat-number">{}</div><div class="stat-label">{}</div></div>"#,
        value,
        text(label)
    )
}

fn write_card(html: &mut String, outcome: &SourceOutcome, item: &Item) -> fmt::Result {
    let source = outcome.source_name();
    let class = if outcome.is_synthetic() { "card synthetic" } else { "card" };
    writeln!(html, r#"<article class="{}" data-source="{}">"#, class, attr(source))?;
    writeln!(html, r#"<span class="source-tag">{}</span>"#, text(source))?;
    if outcome.is_synthetic() {
        writeln!(html, r#"<span class="placeholder-tag">placeholder</span>"#)?;
    }
    writeln!(
        html,
        r#"<h3 class="card-title"><a href="{}" target="_blank" rel="noopener">{}</a></h3>"#,
        attr(safe_href(&item.url)),
        text(&item.title)
    )?;
    for (key, value) in item.fields.iter().filter(|(k, _)| k.as_str() != "category") {
        writeln!(
            html,
            r#"<div class="detail"><strong>{}:</strong><span>{}</span></div>"#,
            text(&field_label(key)),
            text(value)
        )?;
    }
    if let Some(category) = item.field("category") {
        writeln!(html, r#"<span class="category-badge">{}</span>"#, text(category))?;
    }
    writeln!(html, "</article>")
}

fn write_page(html: &mut String, report: &AggregateReport) -> fmt::Result {
    writeln!(html, "<!DOCTYPE html>")?;
    writeln!(html, r#"<html lang="en">"#)?;
    writeln!(html, "<head>")?;
    writeln!(html, r#"<meta charset="UTF-8">"#)?;
    writeln!(html, r#"<meta name="viewport" content="width=device-width, initial-scale=1.0">"#)?;
    writeln!(html, "<title>Aggregated Digest</title>")?;
    writeln!(html, "<style>{}</style>", STYLE)?;
    writeln!(html, "</head>")?;
    writeln!(html, "<body>")?;
    writeln!(html, r#"<div class="container">"#)?;

    writeln!(html, r#"<header class="header">"#)?;
    writeln!(html, "<h1>Aggregated Digest</h1>")?;
    writeln!(
        html,
        r#"<p class="generated">Generated {}</p>"#,
        report.generated_at().format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(html, r#"<div class="stats">"#)?;
    write_stat(html, report.total_items(), "Total Items")?;
    write_stat(html, report.outcomes().len(), "Sources")?;
    write_stat(html, report.categories().len(), "Categories")?;
    write_stat(html, report.failure_count(), "Failed Sources")?;
    writeln!(html, "</div>")?;
    writeln!(html, "</header>")?;

    writeln!(html, r#"<nav class="filters">"#)?;
    writeln!(html, r#"<button class="filter-btn active" data-filter="*">All Items</button>"#)?;
    for platform in report.platforms() {
        writeln!(
            html,
            r#"<button class="filter-btn" data-filter="{}">{}</button>"#,
            attr(platform),
            text(platform)
        )?;
    }
    writeln!(html, "</nav>")?;

    if report.failure_count() > 0 {
        writeln!(html, r#"<section class="failures">"#)?;
        writeln!(html, "<h2>Unavailable sources</h2>")?;
        writeln!(html, "<ul>")?;
        for outcome in report.failures() {
            writeln!(
                html,
                r#"<li data-source="{}"><strong>{}</strong>: {}</li>"#,
                attr(outcome.source_name()),
                text(outcome.source_name()),
                text(outcome.error().unwrap_or_default())
            )?;
        }
        writeln!(html, "</ul>")?;
        writeln!(html, "</section>")?;
    }

    writeln!(html, r#"<main class="grid" id="items">"#)?;
    if report.total_items() == 0 {
        writeln!(html, r#"<p class="empty">No items were collected in this run.</p>"#)?;
    }
    for outcome in report.outcomes() {
        for item in outcome.items() {
            write_card(html, outcome, item)?;
        }
    }
    writeln!(html, "</main>")?;

    writeln!(html, "</div>")?;
    writeln!(html, "<script>{}</script>", SCRIPT)?;
    writeln!(html, "</body>")?;
    writeln!(html, "</html>")
}

/// Render a report as a standalone HTML page.
pub fn render(report: &AggregateReport) -> Result<String, fmt::Error> {
    let mut html = String::new();
    write_page(&mut html, report)?;
    Ok(html)
}

/// Write `index.html` into `output_dir`.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display()))]
pub async fn write(report: &AggregateReport, output_dir: &Path) -> Result<PathBuf, Box<dyn Error>> {
    let html = render(report)?;
    let path = output_dir.join(FILE_NAME);
    info!(path = %path.display(), "Writing HTML dashboard");
    fs::write(&path, html).await?;
    info!(path = %path.display(), "Wrote HTML dashboard");
    Ok(path)
}
