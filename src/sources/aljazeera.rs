//! Al Jazeera headline board.

use super::WebSource;
use crate::extract::{ItemPolicy, RuleSet, SelectorRule};
use crate::http::FetchText;

pub const NAME: &str = "Al Jazeera";
pub const URL: &str = "https://www.aljazeera.com/";

/// Layout-specific selectors first; the bare `article h3 a` matches nearly
/// every page and only serves as the last resort.
pub fn rules() -> RuleSet {
    RuleSet::new()
        .with(SelectorRule::new(".featured-articles-list article h3 a"))
        .with(SelectorRule::new(".top-news-item h3 a"))
        .with(SelectorRule::new("h3.article-card__title a"))
        .with(SelectorRule::new(".news-item h3 a"))
        .with(SelectorRule::new("article h3 a"))
}

pub fn policy() -> ItemPolicy {
    ItemPolicy {
        max_items: 10,
        min_title_len: 11,
        ..ItemPolicy::default()
    }
}

pub fn source(fetcher: Box<dyn FetchText>) -> Result<WebSource, url::ParseError> {
    WebSource::new(NAME, URL, rules(), policy(), fetcher)
}
