//! CSS selector rules over HTML documents.

use super::{Candidate, Page, Rule};
use scraper::{ElementRef, Selector};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;

/// A selector string that `scraper` refused to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid css selector {selector:?}: {reason}")]
pub struct InvalidSelector {
    pub selector: String,
    pub reason: String,
}

/// Select item elements with a CSS selector and read title, link and
/// fields relative to each one.
///
/// - **title**: text of the `title` sub-element, or of the item element itself
/// - **link**: `href` of the `link` sub-element; otherwise the item element if
///   it is an `<a>`, then its nearest `<a>` ancestor, then its first
///   `a[href]` descendant
/// - **fields**: text of the first match of each field selector, falling back
///   to a per-field default; constants are attached to every candidate
///
/// Selectors are kept as strings and parsed when applied; call
/// [`SelectorRule::validate`] to reject bad selectors up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorRule {
    item: String,
    title: Option<String>,
    link: Option<String>,
    fields: Vec<(String, String)>,
    defaults: BTreeMap<String, String>,
    constants: BTreeMap<String, String>,
}

fn parse(css: &str) -> Result<Selector, InvalidSelector> {
    Selector::parse(css).map_err(|e| InvalidSelector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<Vec<_>>().join(" ")
}

impl SelectorRule {
    pub fn new(item: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            title: None,
            link: None,
            fields: Vec::new(),
            defaults: BTreeMap::new(),
            constants: BTreeMap::new(),
        }
    }

    pub fn title(mut self, css: impl Into<String>) -> Self {
        self.title = Some(css.into());
        self
    }

    pub fn link(mut self, css: impl Into<String>) -> Self {
        self.link = Some(css.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, css: impl Into<String>) -> Self {
        self.fields.push((name.into(), css.into()));
        self
    }

    /// Value used when the field selector finds nothing.
    pub fn default_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(name.into(), value.into());
        self
    }

    /// Value attached to every candidate regardless of the document.
    pub fn constant(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.constants.insert(name.into(), value.into());
        self
    }

    /// Check that every selector parses.
    pub fn validate(self) -> Result<Self, InvalidSelector> {
        parse(&self.item)?;
        for css in self.title.iter().chain(self.link.iter()) {
            parse(css)?;
        }
        for (_, css) in &self.fields {
            parse(css)?;
        }
        Ok(self)
    }

    fn link_for(el: ElementRef<'_>, any_link: &Selector) -> Option<String> {
        if el.value().name() == "a" {
            if let Some(href) = el.value().attr("href") {
                return Some(href.to_string());
            }
        }
        el.ancestors()
            .filter_map(ElementRef::wrap)
            .find(|a| a.value().name() == "a" && a.value().attr("href").is_some())
            .or_else(|| el.select(any_link).next())
            .and_then(|a| a.value().attr("href"))
            .map(str::to_string)
    }

    fn extract(&self, page: &Page<'_>) -> Result<Vec<Candidate>, InvalidSelector> {
        let item_sel = parse(&self.item)?;
        let title_sel = self.title.as_deref().map(parse).transpose()?;
        let link_sel = self.link.as_deref().map(parse).transpose()?;
        let field_sels = self
            .fields
            .iter()
            .map(|(name, css)| parse(css).map(|s| (name.as_str(), s)))
            .collect::<Result<Vec<_>, _>>()?;
        let any_link = parse("a[href]")?;

        let candidates = page
            .html()
            .select(&item_sel)
            .map(|el| {
                let title = match &title_sel {
                    Some(sel) => el.select(sel).next().map(text_of).unwrap_or_default(),
                    None => text_of(el),
                };
                let href = match &link_sel {
                    Some(sel) => el
                        .select(sel)
                        .next()
                        .and_then(|a| a.value().attr("href"))
                        .map(str::to_string),
                    None => Self::link_for(el, &any_link),
                };

                let mut fields = self.constants.clone();
                for (name, sel) in &field_sels {
                    let value = el
                        .select(sel)
                        .next()
                        .map(text_of)
                        .filter(|t| !t.trim().is_empty())
                        .or_else(|| self.defaults.get(*name).cloned());
                    if let Some(value) = value {
                        fields.insert(name.to_string(), value);
                    }
                }

                Candidate { title, href, fields }
            })
            .collect();
        Ok(candidates)
    }
}

impl Rule for SelectorRule {
    fn label(&self) -> &str {
        &self.item
    }

    fn candidates(&self, page: &Page<'_>) -> Vec<Candidate> {
        self.extract(page).unwrap_or_else(|e| {
            warn!(error = %e, "Skipping rule with invalid selector");
            Vec::new()
        })
    }
}
