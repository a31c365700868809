//! Error taxonomy for source adapters.
//!
//! Every fault inside an adapter surfaces as exactly one [`SourceError`].
//! The aggregator downgrades all of them into a failed
//! [`SourceOutcome`](crate::models::SourceOutcome); none propagate past it.

use std::time::Duration;
use thiserror::Error;

/// A single signaled failure from one source invocation.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network or transport failure.
    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// The server answered with a non-success status.
    #[error("fetch failed for {url}: HTTP {status}")]
    Status { url: String, status: u16 },

    /// No rule in the rule set yielded a valid item.
    #[error("extraction failed: none of {rules} rule(s) yielded a valid item ({discarded} candidate(s) discarded)")]
    Extraction { rules: usize, discarded: usize },

    /// A candidate item failed validation.
    #[error("invalid item: {0}")]
    Validation(#[from] ValidationError),

    /// The invocation exceeded its time budget.
    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The adapter panicked.
    #[error("adapter panicked: {0}")]
    Panicked(String),
}

impl SourceError {
    /// Short machine-friendly label used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SourceError::Fetch { .. } | SourceError::Status { .. } => "fetch",
            SourceError::Extraction { .. } => "extraction",
            SourceError::Validation(_) => "validation",
            SourceError::Timeout(_) => "timeout",
            SourceError::Panicked(_) => "panic",
        }
    }

    /// Whether retrying the same request could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            SourceError::Fetch { .. } => true,
            SourceError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Why a candidate was discarded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title is empty")]
    EmptyTitle,

    #[error("title {title:?} is shorter than {min} characters")]
    ShortTitle { title: String, min: usize },

    #[error("title {0:?} starts with a rejected prefix")]
    RejectedTitle(String),

    #[error("candidate has no link")]
    MissingUrl,

    #[error("url {0:?} is not a well-formed http(s) url")]
    MalformedUrl(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let fetch = SourceError::Fetch {
            url: "https://a".into(),
            reason: "dns".into(),
        };
        assert_eq!(fetch.kind(), "fetch");
        assert_eq!(
            SourceError::Status { url: "https://a".into(), status: 404 }.kind(),
            "fetch"
        );
        assert_eq!(SourceError::Extraction { rules: 3, discarded: 1 }.kind(), "extraction");
        assert_eq!(SourceError::Timeout(Duration::from_millis(5)).kind(), "timeout");
        assert_eq!(SourceError::from(ValidationError::EmptyTitle).kind(), "validation");
    }

    #[test]
    fn test_messages_are_descriptive() {
        let e = SourceError::Extraction { rules: 5, discarded: 2 };
        assert!(e.to_string().contains("none of 5 rule(s)"));
        let e = SourceError::Timeout(Duration::from_millis(1500));
        assert_eq!(e.to_string(), "timed out after 1500ms");
        let e = SourceError::Status { url: "https://x".into(), status: 503 };
        assert_eq!(e.to_string(), "fetch failed for https://x: HTTP 503");
    }

    #[test]
    fn test_transient() {
        assert!(SourceError::Status { url: "u".into(), status: 503 }.is_transient());
        assert!(SourceError::Status { url: "u".into(), status: 429 }.is_transient());
        assert!(!SourceError::Status { url: "u".into(), status: 404 }.is_transient());
        assert!(!SourceError::Extraction { rules: 1, discarded: 0 }.is_transient());
    }
}
