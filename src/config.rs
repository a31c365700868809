//! YAML configuration: run settings and the list of sources.
//!
//! A source is either a built-in (selected by key, optionally renamed and
//! re-capped) or fully declared with its URL and ordered rules:
//!
//! ```yaml
//! settings:
//!   timeout_secs: 20
//!   concurrency: 4
//! sources:
//!   - builtin: bbc
//!   - name: Example Board
//!     url: https://example.com/search?q={query}
//!     min_title_len: 10
//!     rules:
//!       - selector: "div.card"
//!         title: "h3"
//!         fields: { dates: ".date-range, time" }
//!         defaults: { dates: "Dates TBA" }
//!       - feed: true
//!     fallback:
//!       - { title: "Canned listing", url: "https://example.com/canned" }
//!   - name: Offline Board
//!     fallback:
//!       - { title: "Always canned", url: "https://offline.example/e" }
//! ```
//!
//! A declared source with fallback items but no `url` and no `rules` is
//! canned only: it never fetches and its items are always synthetic.
//!
//! When no file is given the embedded `sources.yaml` is used.
//!
//! Every problem is reported before any source is fetched: unknown
//! built-ins, bad selectors, bad URLs, invalid fallback items and
//! duplicate names all fail the load with a [`ConfigError`].

use crate::aggregator::{Aggregator, RegistrationError};
use crate::error::ValidationError;
use crate::extract::{Candidate, FeedRule, InvalidSelector, ItemPolicy, RuleSet, SelectorRule};
use crate::http::{self, DEFAULT_USER_AGENT, FetchSettings};
use crate::models::Item;
use crate::sources::{self, Canned, SourceAdapter, WebSource, WithFallback};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{Span, debug, info, instrument, warn};
use url::Url;

/// The embedded default source list.
pub const BUILTIN_CONFIG: &str = include_str!("../sources.yaml");

/// Placeholder in a source URL replaced by the URL-encoded query.
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// Problems found while loading or applying a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("config declares no sources")]
    NoSources,

    #[error("source #{0} has neither a name nor a builtin key")]
    Unnamed(usize),

    #[error("unknown builtin source {key:?} (known: {known})")]
    UnknownBuiltin { key: String, known: String },

    #[error("source {name:?}: {reason}")]
    Invalid { name: String, reason: String },

    #[error("source {name:?}: bad url: {source}")]
    BadUrl {
        name: String,
        #[source]
        source: url::ParseError,
    },

    #[error("source {name:?}: {source}")]
    Selector {
        name: String,
        #[source]
        source: InvalidSelector,
    },

    #[error("source {name:?}: fallback item {title:?}: {source}")]
    Fallback {
        name: String,
        title: String,
        #[source]
        source: ValidationError,
    },

    #[error("source {0:?} needs a query (pass --query)")]
    MissingQuery(String),

    #[error("no source named {0:?} in the config")]
    UnknownSource(String),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error("cannot build http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Run-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Time budget for each source invocation, in seconds.
    pub timeout_secs: u64,
    /// Pause between sources when running sequentially, in milliseconds.
    pub delay_ms: u64,
    /// Maximum number of sources fetched at once.
    pub concurrency: usize,
    pub user_agent: String,
    /// Retries for transient HTTP failures.
    pub retries: usize,
    /// Append live items to a per-query CSV price history.
    pub history: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout_secs: 20,
            delay_ms: 0,
            concurrency: 4,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            retries: 2,
            history: false,
        }
    }
}

impl Settings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// HTTP settings for one source's fetcher.
    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            timeout: self.timeout(),
            user_agent: self.user_agent.clone(),
            retries: self.retries,
            ..FetchSettings::default()
        }
    }
}

/// One extraction rule as written in YAML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleConfig {
    /// CSS selector for item elements.
    pub selector: Option<String>,
    /// Read RSS `<item>` entries instead of HTML.
    pub feed: bool,
    pub title: Option<String>,
    pub link: Option<String>,
    pub fields: BTreeMap<String, String>,
    pub defaults: BTreeMap<String, String>,
    pub constants: BTreeMap<String, String>,
}

/// A canned item used when the live fetch fails.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FallbackItem {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

/// One entry of the `sources` list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    pub name: Option<String>,
    pub builtin: Option<String>,
    pub url: Option<String>,
    pub base_url: Option<String>,
    pub max_items: Option<usize>,
    pub min_title_len: Option<usize>,
    pub reject_title_prefixes: Vec<String>,
    pub rules: Vec<RuleConfig>,
    pub fallback: Vec<FallbackItem>,
}

/// The whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

fn known_builtins() -> String {
    sources::BUILTIN_KEYS.join(", ")
}

fn invalid(name: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        name: name.to_string(),
        reason: reason.into(),
    }
}

impl SourceConfig {
    /// The name the source is registered and reported under.
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or_else(|| self.builtin.as_deref().and_then(sources::builtin_name))
    }

    /// Declared with placeholder items only: nothing to fetch.
    fn is_canned(&self) -> bool {
        self.builtin.is_none() && self.url.is_none() && self.rules.is_empty() && !self.fallback.is_empty()
    }

    fn policy(&self, mut policy: ItemPolicy) -> ItemPolicy {
        if let Some(max) = self.max_items {
            policy.max_items = max;
        }
        if let Some(min) = self.min_title_len {
            policy.min_title_len = min;
        }
        policy
            .reject_title_prefixes
            .extend(self.reject_title_prefixes.iter().cloned());
        policy
    }

    fn check(&self, index: usize) -> Result<(), ConfigError> {
        if let Some(key) = &self.builtin {
            if sources::builtin_name(key).is_none() {
                return Err(ConfigError::UnknownBuiltin {
                    key: key.clone(),
                    known: known_builtins(),
                });
            }
        }
        let name = self.display_name().ok_or(ConfigError::Unnamed(index))?;
        match &self.builtin {
            Some(_) => {
                if self.url.is_some() || self.base_url.is_some() || !self.rules.is_empty() {
                    return Err(invalid(name, "a builtin source cannot declare url, base_url or rules"));
                }
            }
            None if self.is_canned() => {}
            None => {
                if self.url.is_none() {
                    return Err(invalid(name, "missing url"));
                }
                if self.rules.is_empty() {
                    return Err(invalid(name, "declares no rules"));
                }
                self.rule_set(name)?;
            }
        }
        if self.max_items == Some(0) {
            return Err(invalid(name, "max_items must be at least 1"));
        }
        Ok(())
    }

    fn rule_set(&self, name: &str) -> Result<RuleSet, ConfigError> {
        let mut rules = RuleSet::new();
        for (i, rule) in self.rules.iter().enumerate() {
            match (&rule.selector, rule.feed) {
                (Some(_), true) => {
                    return Err(invalid(name, format!("rule #{} sets both selector and feed", i + 1)));
                }
                (None, false) => {
                    return Err(invalid(name, format!("rule #{} needs a selector or feed: true", i + 1)));
                }
                (None, true) => rules.push(Box::new(FeedRule::new())),
                (Some(css), false) => {
                    let mut sel = SelectorRule::new(css.clone());
                    if let Some(title) = &rule.title {
                        sel = sel.title(title.clone());
                    }
                    if let Some(link) = &rule.link {
                        sel = sel.link(link.clone());
                    }
                    for (field, css) in &rule.fields {
                        sel = sel.field(field.clone(), css.clone());
                    }
                    for (field, value) in &rule.defaults {
                        sel = sel.default_value(field.clone(), value.clone());
                    }
                    for (field, value) in &rule.constants {
                        sel = sel.constant(field.clone(), value.clone());
                    }
                    let sel = sel.validate().map_err(|source| ConfigError::Selector {
                        name: name.to_string(),
                        source,
                    })?;
                    rules.push(Box::new(sel));
                }
            }
        }
        Ok(rules)
    }

    /// Resolve the fetch URL, filling `{query}` when present.
    fn resolved_url(&self, name: &str, query: Option<&str>) -> Result<Option<String>, ConfigError> {
        let Some(url) = &self.url else {
            return Ok(None);
        };
        if !url.contains(QUERY_PLACEHOLDER) {
            return Ok(Some(url.clone()));
        }
        let query = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| ConfigError::MissingQuery(name.to_string()))?;
        Ok(Some(url.replace(QUERY_PLACEHOLDER, &urlencoding::encode(query))))
    }

    /// Validate the canned items. Without a `base`, each item URL must be
    /// absolute.
    fn fallback_items(&self, name: &str, base: Option<&Url>, policy: &ItemPolicy) -> Result<Vec<Item>, ConfigError> {
        self.fallback
            .iter()
            .map(|f| {
                let rejected = |source| ConfigError::Fallback {
                    name: name.to_string(),
                    title: f.title.clone(),
                    source,
                };
                let own;
                let base = match base {
                    Some(base) => base,
                    None => {
                        own = Url::parse(&f.url).map_err(|_| rejected(ValidationError::MalformedUrl(f.url.clone())))?;
                        &own
                    }
                };
                let candidate = Candidate {
                    title: f.title.clone(),
                    href: Some(f.url.clone()),
                    fields: f.fields.clone(),
                };
                policy.validate(candidate, base).map_err(rejected)
            })
            .collect()
    }

    /// Build the adapter for this source, with its own fetcher.
    fn adapter(&self, settings: &Settings, query: Option<&str>) -> Result<Arc<dyn SourceAdapter>, ConfigError> {
        let name = self.display_name().unwrap_or_default().to_string();
        if self.is_canned() {
            let base = self
                .base_url
                .as_deref()
                .map(Url::parse)
                .transpose()
                .map_err(|source| ConfigError::BadUrl {
                    name: name.clone(),
                    source,
                })?;
            let items = self.fallback_items(&name, base.as_ref(), &self.policy(ItemPolicy::default()))?;
            debug!(source = %name, fallback = items.len(), "Built canned source");
            return Ok(Arc::new(Canned::new(name, items)));
        }
        let fetcher = Box::new(http::fetcher(&settings.fetch_settings())?);

        let source = match &self.builtin {
            Some(key) => {
                let built = sources::builtin(key, fetcher).ok_or_else(|| ConfigError::UnknownBuiltin {
                    key: key.clone(),
                    known: known_builtins(),
                })?;
                let source = built.map_err(|source| ConfigError::BadUrl {
                    name: name.clone(),
                    source,
                })?;
                let policy = self.policy(source.policy().clone());
                source.named(name.clone()).with_policy(policy)
            }
            None => {
                let url = self
                    .resolved_url(&name, query)?
                    .ok_or_else(|| invalid(&name, "missing url"))?;
                let bad_url = |source| ConfigError::BadUrl {
                    name: name.clone(),
                    source,
                };
                let mut source = WebSource::new(
                    name.clone(),
                    &url,
                    self.rule_set(&name)?,
                    self.policy(ItemPolicy::default()),
                    fetcher,
                )
                .map_err(bad_url)?;
                if let Some(base) = &self.base_url {
                    source = source.with_base(Url::parse(base).map_err(bad_url)?);
                }
                source
            }
        };

        let canned = self.fallback_items(&name, Some(source.base()), source.policy())?;
        debug!(source = %name, url = %source.url(), fallback = canned.len(), "Built source");
        if canned.is_empty() {
            Ok(Arc::new(source))
        } else {
            Ok(Arc::new(WithFallback::new(source, canned)))
        }
    }
}

impl Config {
    /// Parse and check a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.check()?;
        Ok(config)
    }

    /// Load a config file.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&yaml)?;
        info!(sources = config.sources.len(), "Loaded configuration");
        Ok(config)
    }

    /// The embedded default source list.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_yaml(BUILTIN_CONFIG)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.sources.is_empty() {
            return Err(ConfigError::NoSources);
        }
        for (i, source) in self.sources.iter().enumerate() {
            source.check(i + 1)?;
        }
        let mut seen = std::collections::HashSet::new();
        for name in self.source_names() {
            if !seen.insert(name) {
                return Err(RegistrationError::DuplicateSource(name.to_string()).into());
            }
        }
        Ok(())
    }

    /// Names of the configured sources, in order.
    pub fn source_names(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().filter_map(SourceConfig::display_name)
    }

    /// Keep only the named sources, preserving config order.
    pub fn retain_only(&mut self, names: &[String]) -> Result<(), ConfigError> {
        if names.is_empty() {
            return Ok(());
        }
        if let Some(unknown) = names
            .iter()
            .find(|n| !self.source_names().any(|s| s == n.as_str()))
        {
            return Err(ConfigError::UnknownSource(unknown.clone()));
        }
        self.sources
            .retain(|s| s.display_name().is_some_and(|n| names.iter().any(|w| w == n)));
        Ok(())
    }

    /// Build an aggregator for every configured source.
    ///
    /// Each source gets its own HTTP client. `span` becomes the parent of all
    /// aggregation logging.
    pub fn aggregator(&self, query: Option<&str>, span: Span) -> Result<Aggregator, ConfigError> {
        let s = &self.settings;
        if s.concurrency > 1 && s.delay_ms > 0 {
            warn!(
                concurrency = s.concurrency,
                delay_ms = s.delay_ms,
                "delay_ms only applies when concurrency is 1; ignoring it"
            );
        }

        let mut builder = Aggregator::builder()
            .timeout(s.timeout())
            .delay(s.delay())
            .concurrency(s.concurrency)
            .span(span);
        for source in &self.sources {
            let name = source.display_name().unwrap_or_default().to_string();
            builder = builder.register(name, source.adapter(s, query)?)?;
        }
        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DECLARED: &str = r#"
settings:
  timeout_secs: 5
  concurrency: 2
sources:
  - builtin: devpost
    max_items: 3
    fallback:
      - title: Global AI Hackathon 2025
        url: https://devpost.com/
        fields: { dates: "Jul 15-17, 2025", category: Hackathon }
  - name: Price Search
    url: https://shop.example.com/s?k={query}
    min_title_len: 5
    reject_title_prefixes: [sponsored]
    rules:
      - selector: "div.result"
        title: "h2"
        fields: { price: ".price" }
        defaults: { price: "N/A" }
      - feed: true
"#;

    #[test]
    fn test_builtin_config_loads() {
        let config = Config::builtin().unwrap();
        let names: Vec<_> = config.source_names().collect();
        assert_eq!(names, vec!["BBC News", "Times of India", "Al Jazeera", "Devpost", "MLH"]);
    }

    #[test]
    fn test_demo_configs_load() {
        let events = Config::from_yaml(include_str!("../demos/events.yaml")).unwrap();
        let names: Vec<_> = events.source_names().collect();
        assert_eq!(names, vec!["Devpost", "MLH", "Scaler", "Unacademy"]);
        assert!(events.sources[3].is_canned());
        assert_eq!(events.sources[2].rules.len(), 2);

        let prices = Config::from_yaml(include_str!("../demos/prices.yaml")).unwrap();
        assert!(prices.sources.iter().all(|s| s.url.as_deref().is_some_and(|u| u.contains(QUERY_PLACEHOLDER))));
        assert!(prices.settings.history);
        assert!(!events.settings.history);
    }

    #[test]
    fn test_declared_config() {
        let config = Config::from_yaml(DECLARED).unwrap();
        assert_eq!(config.settings.timeout(), Duration::from_secs(5));
        assert_eq!(config.settings.concurrency, 2);
        assert_eq!(config.settings.retries, 2);
        assert_eq!(config.sources[1].rules.len(), 2);
        assert!(config.sources[1].rules[1].feed);
    }

    #[test]
    fn test_settings_default_when_absent() {
        let config = Config::from_yaml("sources:\n  - builtin: bbc\n").unwrap();
        assert_eq!(config.settings, Settings::default());
    }

    #[test]
    fn test_unknown_builtin() {
        let err = Config::from_yaml("sources:\n  - builtin: reddit\n").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownBuiltin { .. }));
        assert!(err.to_string().contains("times_of_india"));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let yaml = "sources:\n  - builtin: bbc\n  - builtin: mlh\n    name: BBC News\n";
        let err = Config::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Registration(RegistrationError::DuplicateSource(_))));
    }

    #[test]
    fn test_bad_selector_rejected() {
        let yaml = "sources:\n  - name: Broken\n    url: https://a.example/\n    rules:\n      - selector: \"div[\"\n";
        let err = Config::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Selector { .. }));
    }

    #[test]
    fn test_rule_needs_exactly_one_kind() {
        let both = "sources:\n  - name: X\n    url: https://a.example/\n    rules:\n      - { selector: a, feed: true }\n";
        assert!(matches!(Config::from_yaml(both), Err(ConfigError::Invalid { .. })));
        let neither = "sources:\n  - name: X\n    url: https://a.example/\n    rules:\n      - { title: h3 }\n";
        assert!(matches!(Config::from_yaml(neither), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_declared_source_needs_url_and_rules() {
        let no_url = "sources:\n  - name: X\n    rules:\n      - feed: true\n";
        assert!(matches!(Config::from_yaml(no_url), Err(ConfigError::Invalid { .. })));
        let no_rules = "sources:\n  - name: X\n    url: https://a.example/\n";
        assert!(matches!(Config::from_yaml(no_rules), Err(ConfigError::Invalid { .. })));
        let unnamed = "sources:\n  - url: https://a.example/\n    rules:\n      - feed: true\n";
        assert!(matches!(Config::from_yaml(unnamed), Err(ConfigError::Unnamed(1))));
    }

    #[test]
    fn test_empty_source_list_rejected() {
        assert!(matches!(Config::from_yaml("sources: []\n"), Err(ConfigError::NoSources)));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(Config::from_yaml("sources:\n  - builtin: bbc\n    selectr: a\n").is_err());
    }

    #[test]
    fn test_query_template() {
        let config = Config::from_yaml(DECLARED).unwrap();
        let source = &config.sources[1];
        let url = source.resolved_url("Price Search", Some("usb c hub & dock")).unwrap();
        assert_eq!(url.as_deref(), Some("https://shop.example.com/s?k=usb%20c%20hub%20%26%20dock"));
        assert!(matches!(
            source.resolved_url("Price Search", None),
            Err(ConfigError::MissingQuery(_))
        ));
        assert!(matches!(
            source.resolved_url("Price Search", Some("  ")),
            Err(ConfigError::MissingQuery(_))
        ));
    }

    #[test]
    fn test_retain_only() {
        let mut config = Config::builtin().unwrap();
        config
            .retain_only(&["MLH".to_string(), "BBC News".to_string()])
            .unwrap();
        let names: Vec<_> = config.source_names().collect();
        assert_eq!(names, vec!["BBC News", "MLH"]);

        let err = config.retain_only(&["Reddit".to_string()]).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownSource(n) if n == "Reddit"));
    }

    #[test]
    fn test_policy_overrides_extend_builtin() {
        let source = SourceConfig {
            max_items: Some(3),
            reject_title_prefixes: vec!["sponsored".into()],
            ..SourceConfig::default()
        };
        let base = ItemPolicy {
            max_items: 10,
            min_title_len: 16,
            reject_title_prefixes: vec!["advertisement".into()],
        };
        let policy = source.policy(base);
        assert_eq!(policy.max_items, 3);
        assert_eq!(policy.min_title_len, 16);
        assert_eq!(policy.reject_title_prefixes, vec!["advertisement", "sponsored"]);
    }

    #[test]
    fn test_invalid_fallback_item() {
        let source = SourceConfig {
            fallback: vec![FallbackItem {
                title: "Canned".into(),
                url: "ftp://files.example/x".into(),
                fields: BTreeMap::new(),
            }],
            ..SourceConfig::default()
        };
        let base = Url::parse("https://a.example/").unwrap();
        let err = source.fallback_items("X", Some(&base), &ItemPolicy::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Fallback { .. }));
    }

    #[test]
    fn test_canned_only_source() {
        let yaml = "sources:\n  - name: Unacademy\n    fallback:\n      - { title: Data Science Bootcamp, url: \"https://unacademy.com/\" }\n";
        let config = Config::from_yaml(yaml).unwrap();
        assert!(config.sources[0].is_canned());

        let relative = "sources:\n  - name: X\n    fallback:\n      - { title: Relative link, url: /events }\n";
        assert!(matches!(
            Config::from_yaml(relative).unwrap().aggregator(None, Span::none()),
            Err(ConfigError::Fallback { source: ValidationError::MalformedUrl(_), .. })
        ));

        let with_base =
            "sources:\n  - name: X\n    base_url: https://a.example/\n    fallback:\n      - { title: Relative link, url: /events }\n";
        assert!(Config::from_yaml(with_base).unwrap().aggregator(None, Span::none()).is_ok());

        let nothing = "sources:\n  - name: X\n";
        assert!(matches!(Config::from_yaml(nothing), Err(ConfigError::Invalid { .. })));
    }

    #[tokio::test]
    async fn test_canned_source_runs_as_synthetic() {
        let yaml = "sources:\n  - name: Unacademy\n    fallback:\n      - { title: Data Science Bootcamp, url: \"https://unacademy.com/\", fields: { organizer: Unacademy } }\n";
        let report = Config::from_yaml(yaml)
            .unwrap()
            .aggregator(None, Span::none())
            .unwrap()
            .run()
            .await;
        let outcome = &report.outcomes()[0];
        assert!(outcome.is_success());
        assert!(outcome.is_synthetic());
        assert_eq!(outcome.items()[0].field("organizer"), Some("Unacademy"));
    }

    #[tokio::test]
    async fn test_aggregator_registers_in_config_order() {
        let config = Config::from_yaml(DECLARED).unwrap();
        let aggregator = config.aggregator(Some("usb hub"), Span::none()).unwrap();
        let names: Vec<_> = aggregator.source_names().collect();
        assert_eq!(names, vec!["Devpost", "Price Search"]);
    }

    #[tokio::test]
    async fn test_aggregator_requires_query_for_templates() {
        let config = Config::from_yaml(DECLARED).unwrap();
        assert!(matches!(
            config.aggregator(None, Span::none()),
            Err(ConfigError::MissingQuery(_))
        ));
    }
}
