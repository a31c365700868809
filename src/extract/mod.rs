//! Extraction rule sets: turning fetched content into validated items.
//!
//! A [`RuleSet`] is an ordered list of [`Rule`]s. Rules are tried in
//! declaration order against the same [`Page`] and the first one that yields
//! at least one valid item wins; later rules are never consulted, even if
//! they would have produced more. This is first-match, not best-match.
//!
//! Each rule only produces raw [`Candidate`]s. Validation and URL resolution
//! happen here, in [`ItemPolicy::validate`], so every rule kind gets the same
//! treatment:
//!
//! | Check | Outcome |
//! |-------|---------|
//! | title empty after trimming | discarded |
//! | title shorter than `min_title_len` | discarded |
//! | title starts with a rejected prefix | discarded |
//! | link missing, unresolvable or not http(s) | discarded |
//!
//! Discarded candidates do not count toward the item cap. Once the cap is
//! reached no further candidates of that rule are considered.
//!
//! # Rule kinds
//!
//! - [`SelectorRule`]: CSS selectors over an HTML document
//! - [`FeedRule`]: `<item>` entries of an RSS 2.0 feed
//! - [`FnRule`]: any pure function from the raw body to candidates

mod feed;
mod selector;

pub use feed::FeedRule;
pub use selector::{InvalidSelector, SelectorRule};

use crate::error::{SourceError, ValidationError};
use crate::models::Item;
use crate::utils::normalize_whitespace;
use once_cell::unsync::OnceCell;
use scraper::Html;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, instrument};
use url::Url;

/// A raw, unvalidated item produced by a rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    pub href: Option<String>,
    pub fields: BTreeMap<String, String>,
}

impl Candidate {
    pub fn new(title: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            href: Some(href.into()),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// Fetched content shared by every rule of one rule-set application.
///
/// The HTML document is parsed at most once, on first use.
pub struct Page<'a> {
    body: &'a str,
    html: OnceCell<Html>,
}

impl<'a> Page<'a> {
    pub fn new(body: &'a str) -> Self {
        Self {
            body,
            html: OnceCell::new(),
        }
    }

    pub fn body(&self) -> &'a str {
        self.body
    }

    pub fn html(&self) -> &Html {
        self.html.get_or_init(|| Html::parse_document(self.body))
    }
}

/// One candidate selection strategy.
pub trait Rule: Send + Sync {
    /// Human-readable label for logs.
    fn label(&self) -> &str;

    /// All candidates this rule finds, in document order.
    fn candidates(&self, page: &Page<'_>) -> Vec<Candidate>;
}

/// A rule backed by a plain function of the raw body.
pub struct FnRule<F> {
    label: String,
    f: F,
}

impl<F> FnRule<F>
where
    F: Fn(&str) -> Vec<Candidate> + Send + Sync,
{
    pub fn new(label: impl Into<String>, f: F) -> Self {
        Self {
            label: label.into(),
            f,
        }
    }
}

impl<F> Rule for FnRule<F>
where
    F: Fn(&str) -> Vec<Candidate> + Send + Sync,
{
    fn label(&self) -> &str {
        &self.label
    }

    fn candidates(&self, page: &Page<'_>) -> Vec<Candidate> {
        (self.f)(page.body())
    }
}

/// Per-source limits and filters applied to every candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemPolicy {
    /// Maximum number of items kept from the winning rule.
    pub max_items: usize,
    /// Minimum title length in characters, after whitespace normalization.
    pub min_title_len: usize,
    /// Case-insensitive title prefixes that mark a candidate as junk.
    pub reject_title_prefixes: Vec<String>,
}

impl Default for ItemPolicy {
    fn default() -> Self {
        Self {
            max_items: 10,
            min_title_len: 1,
            reject_title_prefixes: Vec::new(),
        }
    }
}

impl ItemPolicy {
    /// Turn a candidate into an [`Item`], resolving its link against `base`.
    pub fn validate(&self, candidate: Candidate, base: &Url) -> Result<Item, ValidationError> {
        let title = normalize_whitespace(&candidate.title);
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if title.chars().count() < self.min_title_len {
            return Err(ValidationError::ShortTitle {
                title,
                min: self.min_title_len,
            });
        }
        let lowered = title.to_lowercase();
        if self
            .reject_title_prefixes
            .iter()
            .any(|p| lowered.starts_with(&p.to_lowercase()))
        {
            return Err(ValidationError::RejectedTitle(title));
        }

        let href = candidate
            .href
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or(ValidationError::MissingUrl)?;
        let url = resolve_url(base, href)?;

        let fields = candidate
            .fields
            .into_iter()
            .map(|(k, v)| (k, normalize_whitespace(&v)))
            .filter(|(_, v)| !v.is_empty())
            .collect();

        Ok(Item { title, url, fields })
    }
}

/// Resolve `href` against `base`, accepting only absolute http(s) results.
pub fn resolve_url(base: &Url, href: &str) -> Result<String, ValidationError> {
    let resolved = base
        .join(href)
        .map_err(|_| ValidationError::MalformedUrl(href.to_string()))?;
    match resolved.scheme() {
        "http" | "https" if resolved.host_str().is_some() => Ok(resolved.to_string()),
        _ => Err(ValidationError::MalformedUrl(href.to_string())),
    }
}

/// An ordered, first-match-wins list of rules.
#[derive(Default)]
pub struct RuleSet {
    rules: Vec<Box<dyn Rule>>,
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|r| r.label()))
            .finish()
    }
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule; it is tried after every rule already present.
    pub fn with(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn push(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply the rules in order and return the items of the first rule that
    /// yields at least one valid item, capped at `policy.max_items`.
    ///
    /// # Errors
    ///
    /// [`SourceError::Extraction`] when no rule yields a valid item,
    /// including when every candidate was discarded by validation.
    #[instrument(level = "debug", skip_all, fields(base = %base, rules = self.rules.len()))]
    pub fn apply(&self, body: &str, base: &Url, policy: &ItemPolicy) -> Result<Vec<Item>, SourceError> {
        let page = Page::new(body);
        let mut discarded = 0usize;

        for rule in &self.rules {
            let mut items = Vec::new();
            for candidate in rule.candidates(&page) {
                if items.len() >= policy.max_items {
                    break;
                }
                match policy.validate(candidate, base) {
                    Ok(item) => items.push(item),
                    Err(e) => {
                        discarded += 1;
                        debug!(rule = rule.label(), error = %e, "Discarded candidate");
                    }
                }
            }
            if !items.is_empty() {
                debug!(rule = rule.label(), count = items.len(), "Rule matched");
                return Ok(items);
            }
            debug!(rule = rule.label(), "Rule yielded nothing; trying next");
        }

        Err(SourceError::Extraction {
            rules: self.rules.len(),
            discarded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.example.com/news/").unwrap()
    }

    fn fixed(label: &str, candidates: Vec<Candidate>) -> FnRule<impl Fn(&str) -> Vec<Candidate> + Send + Sync> {
        FnRule::new(label, move |_: &str| candidates.clone())
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let rules = RuleSet::new()
            .with(fixed("empty", vec![]))
            .with(fixed("second", vec![Candidate::new("Second rule headline", "/a")]))
            .with(fixed(
                "third",
                vec![
                    Candidate::new("Third rule headline one", "/b"),
                    Candidate::new("Third rule headline two", "/c"),
                ],
            ));
        let items = rules.apply("", &base(), &ItemPolicy::default()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Second rule headline");
    }

    #[test]
    fn test_rule_with_only_invalid_candidates_falls_through() {
        let rules = RuleSet::new()
            .with(fixed("junk", vec![Candidate::new("   ", "/a")]))
            .with(fixed("good", vec![Candidate::new("A real headline", "/b")]));
        let items = rules.apply("", &base(), &ItemPolicy::default()).unwrap();
        assert_eq!(items[0].url, "https://www.example.com/news/b");
    }

    #[test]
    fn test_cap_keeps_original_order() {
        let candidates = (1..=5)
            .map(|i| Candidate::new(format!("Headline number {i}"), format!("/{i}")))
            .collect();
        let rules = RuleSet::new().with(fixed("five", candidates));
        let policy = ItemPolicy {
            max_items: 2,
            ..ItemPolicy::default()
        };
        let items = rules.apply("", &base(), &policy).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Headline number 1");
        assert_eq!(items[1].title, "Headline number 2");
    }

    #[test]
    fn test_discarded_candidates_do_not_count_toward_cap() {
        let rules = RuleSet::new().with(fixed(
            "mixed",
            vec![
                Candidate::new("", "/0"),
                Candidate::new("Valid headline one", "/1"),
                Candidate::new("   ", "/2"),
                Candidate::new("Valid headline two", "/3"),
                Candidate::new("Valid headline three", "/4"),
            ],
        ));
        let policy = ItemPolicy {
            max_items: 2,
            ..ItemPolicy::default()
        };
        let items = rules.apply("", &base(), &policy).unwrap();
        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Valid headline one", "Valid headline two"]);
    }

    #[test]
    fn test_whitespace_only_title_is_extraction_error() {
        let rules = RuleSet::new().with(fixed(
            "blank",
            vec![Candidate::new("  ", "https://www.example.com/a")],
        ));
        let err = rules.apply("", &base(), &ItemPolicy::default()).unwrap_err();
        assert!(matches!(err, SourceError::Extraction { rules: 1, discarded: 1 }));
    }

    #[test]
    fn test_empty_rule_set_is_extraction_error() {
        let err = RuleSet::new()
            .apply("<html></html>", &base(), &ItemPolicy::default())
            .unwrap_err();
        assert_eq!(err.kind(), "extraction");
    }

    #[test]
    fn test_validate_title_rules() {
        let policy = ItemPolicy {
            min_title_len: 11,
            reject_title_prefixes: vec!["Advertisement".into()],
            ..ItemPolicy::default()
        };
        assert!(matches!(
            policy.validate(Candidate::new("Too short", "/a"), &base()),
            Err(ValidationError::ShortTitle { .. })
        ));
        assert!(matches!(
            policy.validate(Candidate::new("ADVERTISEMENT: buy things now", "/a"), &base()),
            Err(ValidationError::RejectedTitle(_))
        ));
        let item = policy
            .validate(Candidate::new("  Long   enough\n headline ", "/a"), &base())
            .unwrap();
        assert_eq!(item.title, "Long enough headline");
    }

    #[test]
    fn test_validate_urls() {
        let policy = ItemPolicy::default();
        let missing = Candidate {
            title: "Title".into(),
            href: None,
            fields: BTreeMap::new(),
        };
        assert_eq!(policy.validate(missing, &base()), Err(ValidationError::MissingUrl));
        assert!(matches!(
            policy.validate(Candidate::new("Title", "javascript:void(0)"), &base()),
            Err(ValidationError::MalformedUrl(_))
        ));
        assert!(matches!(
            policy.validate(Candidate::new("Title", "mailto:desk@example.com"), &base()),
            Err(ValidationError::MalformedUrl(_))
        ));
        let abs = policy
            .validate(Candidate::new("Title", "https://other.org/x?y=1"), &base())
            .unwrap();
        assert_eq!(abs.url, "https://other.org/x?y=1");
        let rel = policy.validate(Candidate::new("Title", "/world/1"), &base()).unwrap();
        assert_eq!(rel.url, "https://www.example.com/world/1");
    }

    #[test]
    fn test_fields_are_normalized_and_empty_dropped() {
        let item = ItemPolicy::default()
            .validate(
                Candidate::new("Title", "/a")
                    .with_field("dates", "  Jul 15 -\n 17 ")
                    .with_field("organizer", "   "),
                &base(),
            )
            .unwrap();
        assert_eq!(item.field("dates"), Some("Jul 15 - 17"));
        assert_eq!(item.field("organizer"), None);
    }
}
