//! Devpost hackathon listing board.

use super::WebSource;
use crate::extract::{ItemPolicy, RuleSet, SelectorRule};
use crate::http::FetchText;

pub const NAME: &str = "Devpost";
pub const URL: &str = "https://devpost.com/hackathons";

pub fn rules() -> RuleSet {
    RuleSet::new().with(
        SelectorRule::new("div.hackathon-tile")
            .title("h3, h2, a")
            .field("dates", ".date-range, time")
            .default_value("dates", "Dates TBA")
            .field("organizer", ".organizer, .sponsor-name")
            .default_value("organizer", "Devpost Community")
            .constant("category", "Hackathon")
            .constant("platform", NAME),
    )
}

pub fn policy() -> ItemPolicy {
    ItemPolicy {
        max_items: 10,
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

    #[tokio::test]
    async fn test_tiles_with_fields() {
        let body = r#"
            <div class="hackathon-tile">
              <a href="https://global-ai.devpost.com/"><h3>Global AI Hackathon</h3></a>
              <div class="date-range">Jul 15 - 17, 2025</div>
              <div class="organizer">Devpost Community</div>
            </div>
            <div class="hackathon-tile">
              <a href="https://web3.devpost.com/"><h3>Web3 Innovation Challenge</h3></a>
              <div class="sponsor-name">Blockchain Alliance</div>
            </div>
        "#;
        let source = WebSource::from_fixture(NAME, URL, body, rules(), policy()).unwrap();
        let items = source.fetch_items().await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Global AI Hackathon");
        assert_eq!(items[0].url, "https://global-ai.devpost.com/");
        assert_eq!(items[0].field("dates"), Some("Jul 15 - 17, 2025"));
        assert_eq!(items[1].field("dates"), Some("Dates TBA"));
        assert_eq!(items[1].field("organizer"), Some("Blockchain Alliance"));
        assert_eq!(items[1].field("category"), Some("Hackathon"));
        assert_eq!(items[1].field("platform"), Some("Devpost"));
    }
}
