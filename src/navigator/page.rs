//! Parsed snapshot of the page a navigator is showing
//!
//! Everything the crawl reads from a page goes through [`Page`]: element
//! lookups for the walker and the extractor, entity link enumeration, the
//! raw source for full-text patterns, and href resolution.

use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use url::Url;

/// Owned snapshot of one element
///
/// Elements are copied out of the document so they can outlive the parsed
/// tree and cross `.await` points.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    text: String,
    attrs: BTreeMap<String, String>,
}

impl Element {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attrs: BTreeMap::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    fn from_ref(element: ElementRef<'_>) -> Self {
        let text = collapse_whitespace(element.text());
        let attrs = element
            .value()
            .attrs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self { text, attrs }
    }

    /// Visible text with whitespace runs collapsed to single spaces
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn href(&self) -> Option<&str> {
        self.attr("href")
    }

    /// Returns true if the element looks like an inactive control
    ///
    /// Covers the `disabled` attribute, `aria-disabled="true"`, a `disabled`
    /// class, and anchors whose href leads nowhere.
    pub fn is_disabled(&self) -> bool {
        if self.attr("disabled").is_some() {
            return true;
        }
        if self
            .attr("aria-disabled")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
        {
            return true;
        }
        if self
            .attr("class")
            .is_some_and(|c| c.split_whitespace().any(|c| c == "disabled"))
        {
            return true;
        }
        match self.href().map(str::trim) {
            None => true,
            Some(href) => href.is_empty() || href == "#" || href.starts_with("javascript:"),
        }
    }
}

/// A parsed page together with the address it was loaded from
pub struct Page {
    raw: String,
    document: Html,
    url: Option<Url>,
}

impl Page {
    /// Parses an HTML document
    ///
    /// An unparseable `url` is treated as unknown; relative hrefs then stay
    /// unresolved.
    pub fn parse(html: impl Into<String>, url: Option<&str>) -> Self {
        let raw = html.into();
        let document = Html::parse_document(&raw);
        let url = url.and_then(|u| Url::parse(u).ok());
        Self { raw, document, url }
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// The page source as it was received
    pub fn raw_html(&self) -> &str {
        &self.raw
    }

    /// All visible text of the document body
    pub fn text(&self) -> String {
        match parse_selector("body") {
            Some(body) => self
                .document
                .select(&body)
                .next()
                .map(|el| collapse_whitespace(el.text()))
                .unwrap_or_default(),
            None => String::new(),
        }
    }

    /// First element matching a CSS selector
    ///
    /// An invalid selector matches nothing.
    pub fn find(&self, selector: &str) -> Option<Element> {
        let selector = parse_selector(selector)?;
        self.first(&selector)
    }

    /// Every element matching a CSS selector, in document order
    pub fn find_all(&self, selector: &str) -> Vec<Element> {
        match parse_selector(selector) {
            Some(selector) => self.all(&selector),
            None => Vec::new(),
        }
    }

    pub fn first(&self, selector: &Selector) -> Option<Element> {
        self.document.select(selector).next().map(Element::from_ref)
    }

    pub fn all(&self, selector: &Selector) -> Vec<Element> {
        self.document.select(selector).map(Element::from_ref).collect()
    }

    pub fn contains(&self, selector: &str) -> bool {
        parse_selector(selector)
            .map(|s| self.document.select(&s).next().is_some())
            .unwrap_or(false)
    }

    /// `(text, absolute href)` for every matching element that carries a
    /// followable link
    pub fn references(&self, selector: &str) -> Vec<(String, String)> {
        self.find_all(selector)
            .into_iter()
            .filter_map(|el| {
                let href = self.resolve(el.href()?)?;
                Some((el.text().to_string(), href))
            })
            .collect()
    }

    /// Resolves an href against the page address
    pub fn resolve(&self, href: &str) -> Option<String> {
        match &self.url {
            Some(base) => resolve_link(href, base),
            None => {
                let parsed = Url::parse(href.trim()).ok()?;
                matches!(parsed.scheme(), "http" | "https").then(|| parsed.to_string())
            }
        }
    }
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
        Some(absolute_url.to_string())
    } else {
        None
    }
}

/// Parses a CSS selector, logging and discarding invalid ones
pub(crate) fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(s) => Some(s),
        Err(e) => {
            tracing::debug!("Invalid selector '{}': {:?}", selector, e);
            None
        }
    }
}

/// Removes every element matching `selector` from a document
///
/// Returns the re-serialized document and the number of removed elements,
/// or `None` when nothing matched (the source is then left untouched).
pub(crate) fn strip_elements(html: &str, selector: &str) -> Option<(String, usize)> {
    let selector = parse_selector(selector)?;
    let mut document = Html::parse_document(html);
    let ids: Vec<_> = document.select(&selector).map(|el| el.id()).collect();
    if ids.is_empty() {
        return None;
    }
    for id in &ids {
        if let Some(mut node) = document.tree.get_mut(*id) {
            node.detach();
        }
    }
    Some((document.html(), ids.len()))
}

fn collapse_whitespace<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
