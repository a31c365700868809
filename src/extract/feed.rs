//! RSS 2.0 feed rules.

use super::{Candidate, Page, Rule};
use crate::utils::strip_tags;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<FeedItem>,
}

#[derive(Debug, Deserialize)]
struct FeedItem {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

/// Read `<item>` entries from an RSS 2.0 document.
///
/// `pubDate` becomes the `published` field and the description, stripped of
/// markup, becomes `summary`. A body that is not RSS yields no candidates.
#[derive(Debug, Clone, Default)]
pub struct FeedRule;

impl FeedRule {
    pub fn new() -> Self {
        Self
    }
}

impl Rule for FeedRule {
    fn label(&self) -> &str {
        "rss items"
    }

    fn candidates(&self, page: &Page<'_>) -> Vec<Candidate> {
        let rss: Rss = match quick_xml::de::from_str(page.body()) {
            Ok(rss) => rss,
            Err(e) => {
                debug!(error = %e, "Body is not an RSS document");
                return Vec::new();
            }
        };

        rss.channel
            .items
            .into_iter()
            .map(|it| {
                let mut c = Candidate {
                    title: it.title.unwrap_or_default(),
                    href: it.link,
                    ..Candidate::default()
                };
                if let Some(published) = it.pub_date {
                    c.fields.insert("published".into(), published);
                }
                if let Some(description) = it.description {
                    c.fields.insert("summary".into(), strip_tags(&description));
                }
                c
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>World</title>
    <link>https://www.example.com/</link>
    <item>
      <title>Markets rally after rate decision</title>
      <link>https://www.example.com/markets/1</link>
      <pubDate>Tue, 06 May 2025 14:30:00 GMT</pubDate>
      <description><![CDATA[<p>Stocks <b>rose</b> sharply.</p>]]></description>
    </item>
    <item>
      <title>Storm warning issued for the coast</title>
      <link>/weather/2</link>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_reads_items_in_order() {
        let page = Page::new(FEED);
        let c = FeedRule::new().candidates(&page);
        assert_eq!(c.len(), 2);
        assert_eq!(c[0].title, "Markets rally after rate decision");
        assert_eq!(c[0].href.as_deref(), Some("https://www.example.com/markets/1"));
        assert_eq!(c[0].fields["published"], "Tue, 06 May 2025 14:30:00 GMT");
        assert_eq!(c[0].fields["summary"].trim(), "Stocks rose sharply.");
        assert_eq!(c[1].href.as_deref(), Some("/weather/2"));
        assert!(c[1].fields.is_empty());
    }

    #[test]
    fn test_html_body_yields_nothing() {
        let page = Page::new("<html><body><h3>Not a feed</h3></body></html>");
        assert!(FeedRule::new().candidates(&page).is_empty());
    }
}
