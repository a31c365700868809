//! Utility functions for text cleanup, logging and file system checks.
//!
//! This module provides helper functions used throughout the crate:
//! - Whitespace normalization and tag stripping for scraped text
//! - String truncation, capitalization and slugification for logs and labels
//! - File system validation for output directories

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));
static TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").expect("static regex"));

/// Collapse runs of whitespace into single spaces and trim both ends.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_whitespace("  a \n\t b "), "a b");
/// ```
pub fn normalize_whitespace(s: &str) -> String {
    WHITESPACE.replace_all(s.trim(), " ").into_owned()
}

/// Remove markup tags and decode entities, leaving normalized text.
pub fn strip_tags(s: &str) -> String {
    let without = TAGS.replace_all(s, " ");
    normalize_whitespace(&html_escape::decode_html_entities(&without))
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to at most `max` bytes (backing off to a char
/// boundary) with an ellipsis and byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Convert a heading to the anchor slug Markdown renderers generate.
///
/// Lowercases the text, removes special characters, and replaces spaces
/// with hyphens.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(slugify_title("Hello World"), "hello-world");
/// assert_eq!(slugify_title("BBC News (10 items)"), "bbc-news-10-items");
/// ```
pub fn slugify_title(title: &str) -> String {
    title
        .to_lowercase()
        .replace(|c: char| !c.is_alphanumeric() && c != ' ' && c != '-', "")
        .replace(' ', "-")
}

/// Capitalize the first character of a string.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(upcase("hello"), "Hello");
/// assert_eq!(upcase(""), "");
/// ```
pub fn upcase(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
    }
}

/// Turn a field key such as `start_date` into a label such as `Start date`.
pub fn field_label(key: &str) -> String {
    upcase(&key.replace(['_', '-'], " "))
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then performs a write test by
/// creating and immediately deleting a scratch file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    // Try a small sync write using std fs (simpler error surface)
    let scratch_path = path.join("..__write_check__");
    stdfs::File::create(&scratch_path)?;
    let _ = stdfs::remove_file(&scratch_path);
    info!("Output directory is writable");
    Ok(())
}
