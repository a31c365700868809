//! Source adapters: one per external source.
//!
//! Every adapter implements [`SourceAdapter`]: it fetches its page, applies
//! its ordered [`RuleSet`](crate::extract::RuleSet), and returns either the
//! items or a single [`SourceError`]. Adapters never decide run-level success
//! or failure; that is the aggregator's job.
//!
//! # Supported Sources
//!
//! | Source | Module | Kind | Notes |
//! |--------|--------|------|-------|
//! | BBC News | [`bbc`] | Headline board | Card headlines, several layouts |
//! | Times of India | [`times_of_india`] | Headline board | Skips advertisement teasers |
//! | Al Jazeera | [`aljazeera`] | Headline board | Article card titles |
//! | Devpost | [`devpost`] | Listing board | Hackathons with dates and organizer |
//! | MLH | [`mlh`] | Listing board | Season event list |
//!
//! Any other source can be declared in the YAML config and is built as a
//! plain [`WebSource`].
//!
//! # Canned fallback data
//!
//! [`WithFallback`] substitutes canned items when the live fetch fails. The
//! result is reported as synthetic, never as an ordinary live success.
//! A source with no live page at all is a [`Canned`] source: it always
//! answers with its placeholder items, always marked synthetic.

pub mod aljazeera;
pub mod bbc;
pub mod devpost;
pub mod mlh;
pub mod times_of_india;

use crate::error::SourceError;
use crate::extract::{ItemPolicy, RuleSet};
use crate::http::{FetchText, StaticContent};
use crate::models::Item;
use async_trait::async_trait;
use std::fmt;
use tracing::{info, instrument, warn};
use url::Url;

/// Keys accepted by [`builtin`], in the order the default config lists them.
pub const BUILTIN_KEYS: &[&str] = &["bbc", "times_of_india", "aljazeera", "devpost", "mlh"];

/// Items returned by one adapter invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched {
    pub items: Vec<Item>,
    /// True when the items are canned placeholders, not live data.
    pub synthetic: bool,
}

/// The capability every source provides.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Display name, unique within a run.
    fn name(&self) -> &str;

    /// Fetch and extract live items.
    async fn fetch_items(&self) -> Result<Vec<Item>, SourceError>;

    /// What the aggregator calls. Live data unless a decorator says otherwise.
    async fn fetch(&self) -> Result<Fetched, SourceError> {
        Ok(Fetched {
            items: self.fetch_items().await?,
            synthetic: false,
        })
    }
}

/// A page fetched over HTTP (or served from a fixture) and run through a
/// rule set.
pub struct WebSource {
    name: String,
    url: String,
    base: Url,
    rules: RuleSet,
    policy: ItemPolicy,
    fetcher: Box<dyn FetchText>,
}

impl fmt::Debug for WebSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebSource")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("rules", &self.rules)
            .field("policy", &self.policy)
            .finish()
    }
}

impl WebSource {
    /// Build a source fetching `url`; relative links resolve against `url`.
    pub fn new(
        name: impl Into<String>,
        url: &str,
        rules: RuleSet,
        policy: ItemPolicy,
        fetcher: Box<dyn FetchText>,
    ) -> Result<Self, url::ParseError> {
        Ok(Self {
            name: name.into(),
            url: url.to_string(),
            base: Url::parse(url)?,
            rules,
            policy,
            fetcher,
        })
    }

    /// Build a source that serves `body` instead of touching the network.
    pub fn from_fixture(
        name: impl Into<String>,
        url: &str,
        body: impl Into<String>,
        rules: RuleSet,
        policy: ItemPolicy,
    ) -> Result<Self, url::ParseError> {
        Self::new(name, url, rules, policy, Box::new(StaticContent(body.into())))
    }

    /// Resolve relative links against `base` instead of the page URL.
    pub fn with_base(mut self, base: Url) -> Self {
        self.base = base;
        self
    }

    /// Rename the source.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Replace the item policy.
    pub fn with_policy(mut self, policy: ItemPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn policy(&self) -> &ItemPolicy {
        &self.policy
    }
}

#[async_trait]
impl SourceAdapter for WebSource {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(level = "info", skip_all, fields(source = %self.name, url = %self.url))]
    async fn fetch_items(&self) -> Result<Vec<Item>, SourceError> {
        let body = self.fetcher.get_text(&self.url).await?;
        let items = self.rules.apply(&body, &self.base, &self.policy)?;
        info!(count = items.len(), "Extracted items");
        Ok(items)
    }
}

/// Decorator that substitutes canned items when the inner adapter fails.
///
/// The substitution is reported through [`Fetched::synthetic`] so the report
/// can mark it. With no canned items the inner error passes through.
pub struct WithFallback<A> {
    inner: A,
    canned: Vec<Item>,
}

impl<A: SourceAdapter> WithFallback<A> {
    pub fn new(inner: A, canned: Vec<Item>) -> Self {
        Self { inner, canned }
    }
}

#[async_trait]
impl<A: SourceAdapter> SourceAdapter for WithFallback<A> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch_items(&self) -> Result<Vec<Item>, SourceError> {
        self.inner.fetch_items().await
    }

    async fn fetch(&self) -> Result<Fetched, SourceError> {
        match self.inner.fetch().await {
            Err(e) if !self.canned.is_empty() => {
                warn!(
                    source = %self.inner.name(),
                    error = %e,
                    kind = e.kind(),
                    count = self.canned.len(),
                    "Live fetch failed; substituting canned items"
                );
                Ok(Fetched {
                    items: self.canned.clone(),
                    synthetic: true,
                })
            }
            other => other,
        }
    }
}

/// A source that only has placeholder items and never fetches.
#[derive(Debug, Clone)]
pub struct Canned {
    name: String,
    items: Vec<Item>,
}

impl Canned {
    pub fn new(name: impl Into<String>, items: Vec<Item>) -> Self {
        Self {
            name: name.into(),
            items,
        }
    }
}

#[async_trait]
impl SourceAdapter for Canned {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_items(&self) -> Result<Vec<Item>, SourceError> {
        Ok(self.items.clone())
    }

    async fn fetch(&self) -> Result<Fetched, SourceError> {
        info!(source = %self.name, count = self.items.len(), "Serving canned items");
        Ok(Fetched {
            items: self.fetch_items().await?,
            synthetic: true,
        })
    }
}

/// Display name of a built-in source.
pub fn builtin_name(key: &str) -> Option<&'static str> {
    match key {
        "bbc" => Some(bbc::NAME),
        "times_of_india" => Some(times_of_india::NAME),
        "aljazeera" => Some(aljazeera::NAME),
        "devpost" => Some(devpost::NAME),
        "mlh" => Some(mlh::NAME),
        _ => None,
    }
}

/// Build one of the built-in sources by key.
///
/// Returns `None` for an unknown key.
pub fn builtin(key: &str, fetcher: Box<dyn FetchText>) -> Option<Result<WebSource, url::ParseError>> {
    let source = match key {
        "bbc" => bbc::source(fetcher),
        "times_of_india" => times_of_india::source(fetcher),
        "aljazeera" => aljazeera::source(fetcher),
        "devpost" => devpost::source(fetcher),
        "mlh" => mlh::source(fetcher),
        _ => return None,
    };
    Some(source)
}
