//! BBC News headline board.
//!
//! The BBC front page has changed card markup several times; the rule set
//! lists the known layouts newest first.

use super::WebSource;
use crate::extract::{ItemPolicy, RuleSet, SelectorRule};
use crate::http::FetchText;

pub const NAME: &str = "BBC News";
pub const URL: &str = "https://www.bbc.com/news";

pub fn rules() -> RuleSet {
    RuleSet::new()
        .with(SelectorRule::new(r#"h3[data-testid="card-headline"]"#))
        .with(SelectorRule::new("h3.gs-c-promo-heading__title"))
        .with(SelectorRule::new(r#"h2[data-testid="card-headline"]"#))
        .with(SelectorRule::new(r#"a[data-testid="internal-link"] h3"#))
        .with(SelectorRule::new(".media__content h3 a"))
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::SourceAdapter;

    const FRONT: &str = r#"
        <html><body>
          <a href="/news/articles/c1" data-testid="internal-link">
            <h3 data-testid="card-headline">Parliament votes on the new budget</h3>
          </a>
          <a href="https://www.bbc.com/news/articles/c2">
            <h3 data-testid="card-headline">Short</h3>
          </a>
          <a href="/sport/football/3">
            <h3 data-testid="card-headline">Cup final goes to extra time</h3>
          </a>
          <h3 class="gs-c-promo-heading__title">Older layout headline ignored</h3>
        </body></html>
    "#;

    #[tokio::test]
    async fn test_extracts_card_headlines() {
        let source = WebSource::from_fixture(NAME, URL, FRONT, rules(), policy()).unwrap();
        let items = source.fetch_items().await.unwrap();
        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Parliament votes on the new budget", "Cup final goes to extra time"]
        );
        assert_eq!(items[0].url, "https://www.bbc.com/news/articles/c1");
        assert_eq!(items[1].url, "https://www.bbc.com/sport/football/3");
    }

    #[test]
    fn test_selectors_are_valid() {
        for css in [
            r#"h3[data-testid="card-headline"]"#,
            "h3.gs-c-promo-heading__title",
            r#"a[data-testid="internal-link"] h3"#,
        ] {
            assert!(SelectorRule::new(css).validate().is_ok());
        }
        assert_eq!(rules().len(), 5);
    }
}
