//! Times of India headline board.

use super::WebSource;
use crate::extract::{ItemPolicy, RuleSet, SelectorRule};
use crate::http::FetchText;

pub const NAME: &str = "Times of India";
pub const URL: &str = "https://timesofindia.indiatimes.com/";

pub fn rules() -> RuleSet {
    RuleSet::new()
        .with(SelectorRule::new(".top-newslist li a"))
        .with(SelectorRule::new(".news-item a"))
        .with(SelectorRule::new(".story-link"))
        .with(SelectorRule::new("a[data-title]"))
        .with(SelectorRule::new(".headline a"))
}

/// Teasers on this board are often sponsored; those titles start with
/// "Advertisement".
pub fn policy() -> ItemPolicy {
    ItemPolicy {
        max_items: 10,
        min_title_len: 16,
        reject_title_prefixes: vec!["advertisement".to_string()],
    }
}

pub fn source(fetcher: Box<dyn FetchText>) -> Result<WebSource, url::ParseError> {
    WebSource::new(NAME, URL, rules(), policy(), fetcher)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::SourceAdapter;

    #[tokio::test]
    async fn test_skips_ads_and_short_titles() {
        let body = r#"
            <ul class="top-newslist">
              <li><a href="/india/monsoon-arrives/articleshow/1.cms">Monsoon arrives early in Kerala this year</a></li>
              <li><a href="/ads/2">Advertisement: best phones under 10k</a></li>
              <li><a href="/city/3">Too short</a></li>
              <li><a href="https://timesofindia.indiatimes.com/business/4.cms">Rupee gains against the dollar in early trade</a></li>
            </ul>
        "#;
        let source = WebSource::from_fixture(NAME, URL, body, rules(), policy()).unwrap();
        let items = source.fetch_items().await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0].url,
            "https://timesofindia.indiatimes.com/india/monsoon-arrives/articleshow/1.cms"
        );
        assert_eq!(items[1].title, "Rupee gains against the dollar in early trade");
    }

    #[tokio::test]
    async fn test_falls_back_to_later_layouts() {
        let body = r#"<div class="headline"><a href="/world/9">Leaders meet for climate summit talks</a></div>"#;
        let source = WebSource::from_fixture(NAME, URL, body, rules(), policy()).unwrap();
        let items = source.fetch_items().await.unwrap();
        assert_eq!(items[0].url, "https://timesofindia.indiatimes.com/world/9");
    }
}
