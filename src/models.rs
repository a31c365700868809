//! Data models for discovered items and the aggregate report.
//!
//! This module defines the shared schema produced by the aggregator and
//! consumed by every exporter:
//! - [`Item`]: One discovered unit of content (headline, event, price)
//! - [`SourceOutcome`]: The recorded result of invoking one source adapter
//! - [`AggregateReport`]: The immutable merged result of one run
//!
//! Field names serialize in camelCase so the persisted report matches the
//! JSON layout external consumers expect.

use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One discovered unit of content.
///
/// Items are only built by the extraction layer (or from validated fallback
/// data), so `title` is always trimmed and non-empty and `url` is always an
/// absolute http(s) URL.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// The headline, event name or product title.
    pub title: String,
    /// Absolute URL of the item.
    pub url: String,
    /// Open, source-defined fields (dates, organizer, price, category...).
    #[serde(rename = "sourceSpecificFields", default)]
    pub fields: BTreeMap<String, String>,
}

impl Item {
    /// Look up a source-specific field.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }
}

/// Whether a source invocation produced items or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Failure,
}

/// The result of invoking one adapter.
///
/// Exactly one outcome is recorded per registered source per run. Fields are
/// private: the constructors guarantee that a success never carries an error
/// and a failure never carries items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "OutcomeRecord")]
pub struct SourceOutcome {
    source_name: String,
    status: OutcomeStatus,
    items: Vec<Item>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    fetched_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    synthetic: bool,
}

impl SourceOutcome {
    /// A live fetch that produced items.
    pub fn success(source_name: impl Into<String>, items: Vec<Item>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            source_name: source_name.into(),
            status: OutcomeStatus::Success,
            items,
            error: None,
            fetched_at,
            synthetic: false,
        }
    }

    /// A fetch that failed for any reason.
    pub fn failure(source_name: impl Into<String>, error: impl Into<String>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            source_name: source_name.into(),
            status: OutcomeStatus::Failure,
            items: Vec::new(),
            error: Some(error.into()),
            fetched_at,
            synthetic: false,
        }
    }

    /// Canned placeholder items standing in for a failed live fetch.
    pub fn synthetic(source_name: impl Into<String>, items: Vec<Item>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            synthetic: true,
            ..Self::success(source_name, items, fetched_at)
        }
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn status(&self) -> OutcomeStatus {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }
}

/// Wire shape of an outcome; normalized into a [`SourceOutcome`] on load.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OutcomeRecord {
    source_name: String,
    status: OutcomeStatus,
    #[serde(default)]
    items: Vec<Item>,
    #[serde(default)]
    error: Option<String>,
    fetched_at: DateTime<Utc>,
    #[serde(default)]
    synthetic: bool,
}

impl From<OutcomeRecord> for SourceOutcome {
    fn from(r: OutcomeRecord) -> Self {
        match r.status {
            OutcomeStatus::Success if r.synthetic => Self::synthetic(r.source_name, r.items, r.fetched_at),
            OutcomeStatus::Success => Self::success(r.source_name, r.items, r.fetched_at),
            OutcomeStatus::Failure => Self::failure(
                r.source_name,
                r.error.unwrap_or_else(|| "unknown error".to_string()),
                r.fetched_at,
            ),
        }
    }
}

/// The merged result of one aggregation run.
///
/// Built once by [`AggregateReport::assemble`], which derives every counter
/// from the outcomes; there is no way to mutate a report afterwards. A report
/// loaded from JSON is re-assembled, so the counters always agree with the
/// outcomes it carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ReportRecord")]
pub struct AggregateReport {
    generated_at: DateTime<Utc>,
    outcomes: Vec<SourceOutcome>,
    total_items: usize,
    success_count: usize,
    failure_count: usize,
}

impl AggregateReport {
    /// Build a report from outcomes already in registration order.
    pub fn assemble(outcomes: Vec<SourceOutcome>, generated_at: DateTime<Utc>) -> Self {
        let success_count = outcomes.iter().filter(|o| o.is_success()).count();
        let total_items = outcomes
            .iter()
            .filter(|o| o.is_success())
            .map(|o| o.items.len())
            .sum();
        Self {
            generated_at,
            failure_count: outcomes.len() - success_count,
            outcomes,
            total_items,
            success_count,
        }
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn outcomes(&self) -> &[SourceOutcome] {
        &self.outcomes
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    pub fn success_count(&self) -> usize {
        self.success_count
    }

    pub fn failure_count(&self) -> usize {
        self.failure_count
    }

    /// Names of the sources that succeeded, in outcome order.
    pub fn platforms(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.is_success())
            .map(|o| o.source_name())
            .unique()
            .collect()
    }

    /// Distinct `category` field values across all items, sorted.
    pub fn categories(&self) -> Vec<&str> {
        self.items()
            .filter_map(|(_, item)| item.field("category"))
            .sorted()
            .dedup()
            .collect()
    }

    /// Every item paired with the name of the source it came from.
    pub fn items(&self) -> impl Iterator<Item = (&str, &Item)> {
        self.outcomes
            .iter()
            .flat_map(|o| o.items.iter().map(move |item| (o.source_name(), item)))
    }

    /// Outcomes that failed, in outcome order.
    pub fn failures(&self) -> impl Iterator<Item = &SourceOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportRecord {
    generated_at: DateTime<Utc>,
    outcomes: Vec<SourceOutcome>,
}

impl From<ReportRecord> for AggregateReport {
    fn from(r: ReportRecord) -> Self {
        Self::assemble(r.outcomes, r.generated_at)
    }
}
