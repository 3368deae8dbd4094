//! Thin wrapper over a parsed HTML document
//!
//! `scraper::Html` is not `Send`, so a `Document` must be dropped before
//! the next `.await`. Everything handed out here is owned data.

use crate::CrawlError;
use scraper::{ElementRef, Html, Selector};

/// An anchor element, detached from the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkElement {
    pub href: String,
    pub text: String,
    pub outer_html: String,
}

impl LinkElement {
    fn from_element(element: ElementRef<'_>) -> Option<Self> {
        let href = element.value().attr("href")?.to_string();
        Some(Self {
            href,
            text: element.text().collect(),
            outer_html: element.html(),
        })
    }
}

/// A parsed HTML page
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses a response body, replacing invalid UTF-8
    pub fn parse(body: &[u8]) -> Self {
        Self {
            html: Html::parse_document(&String::from_utf8_lossy(body)),
        }
    }

    /// Every `<a>` carrying an `href` attribute, in document order
    pub fn anchors(&self) -> Vec<LinkElement> {
        let selector = anchor_selector();
        self.html
            .select(&selector)
            .filter_map(LinkElement::from_element)
            .collect()
    }

    /// Outer HTML of the first element matching `selector`
    pub fn first_html(&self, selector: &Selector) -> Option<String> {
        self.html.select(selector).next().map(|e| e.html())
    }

    /// Text content of every element matching `selector`
    pub fn texts(&self, selector: &Selector) -> Vec<String> {
        self.html
            .select(selector)
            .map(|e| e.text().collect::<String>())
            .collect()
    }

    /// Attribute value of the first element matching `selector` that has it
    pub fn first_attr(&self, selector: &Selector, attr: &str) -> Option<String> {
        self.html
            .select(selector)
            .find_map(|e| e.value().attr(attr).map(str::to_string))
    }

    /// The whole document serialized back to HTML
    pub fn html(&self) -> String {
        self.html.html()
    }
}

/// Compiles a CSS selector, mapping failures onto `CrawlError::Document`
pub fn parse_selector(selector: &str) -> Result<Selector, CrawlError> {
    Selector::parse(selector)
        .map_err(|e| CrawlError::Document(format!("invalid selector '{}': {}", selector, e)))
}

fn anchor_selector() -> Selector {
    Selector::parse("a[href]").expect("anchor selector is valid")
}
