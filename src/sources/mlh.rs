//! Major League Hacking season event list.

use super::WebSource;
use crate::extract::{ItemPolicy, RuleSet, SelectorRule};
use crate::http::FetchText;

pub const NAME: &str = "MLH";
pub const URL: &str = "https://mlh.io/seasons/2026/events";

fn event_rule(container: &str) -> SelectorRule {
    SelectorRule::new(container)
        .title("h3, h2, a")
        .field("dates", ".date, time")
        .default_value("dates", "Dates TBA")
        .field("organizer", ".location, .university")
        .default_value("organizer", "MLH Community")
        .constant("category", "Hackathon")
        .constant("platform", NAME)
}

pub fn rules() -> RuleSet {
    RuleSet::new()
        .with(event_rule("div.event"))
        .with(event_rule("div.hackathon"))
}

pub fn policy() -> ItemPolicy {
    ItemPolicy {
        max_items: 8,
        ..ItemPolicy::default()
    }
}

pub fn source(fetcher: Box<dyn FetchText>) -> Result<WebSource, url::ParseError> {
    WebSource::new(NAME, URL, rules(), policy(), fetcher)
}
