// src/models/snapshot.rs

//! Parsed-page snapshots.
//!
//! A [`Snapshot`] keeps the raw markup of a page as fetched and exposes the
//! few element roles the detectors compare: announcement items, content
//! paragraphs, and the first content heading. The parse tree itself never
//! leaves this module, so the detectors stay testable against hand-built
//! items.

use std::sync::LazyLock;

use scraper::{Html, Selector};

/// Announcement rows on the secretariat category page.
static ANNOUNCEMENT_ITEMS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("article").expect("static selector"));

/// Paragraphs within the main content region of an article page.
static CONTENT_PARAGRAPHS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".entry-content p").expect("static selector"));

/// Section headings within the main content region.
static CONTENT_HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".entry-content h2").expect("static selector"));

/// One announcement element, identified by its id attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnouncementItem {
    /// The element's id attribute; empty when the markup carries none
    pub id: String,

    /// Serialized outer markup
    pub html: String,
}

/// One content paragraph, identified by its literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphItem {
    /// Inner text, the only stable identity the source markup offers
    pub text: String,

    /// Serialized outer markup
    pub html: String,
}

/// The full rendered state of a page at one point in time.
///
/// Snapshots are immutable; a new check produces a new snapshot that
/// supersedes the stored one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    html: String,
}

impl Snapshot {
    /// Wrap fetched markup as a snapshot.
    pub fn parse(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    /// Serialized form, as persisted by the snapshot store.
    pub fn as_html(&self) -> &str {
        &self.html
    }

    /// All announcement items, in document order.
    pub fn announcement_items(&self) -> Vec<AnnouncementItem> {
        let document = Html::parse_document(&self.html);
        document
            .select(&ANNOUNCEMENT_ITEMS)
            .map(|element| AnnouncementItem {
                id: element.value().attr("id").unwrap_or_default().to_string(),
                html: element.html(),
            })
            .collect()
    }

    /// All content-region paragraphs, in document order.
    pub fn content_paragraphs(&self) -> Vec<ParagraphItem> {
        let document = Html::parse_document(&self.html);
        document
            .select(&CONTENT_PARAGRAPHS)
            .map(|element| ParagraphItem {
                text: element.text().collect(),
                html: element.html(),
            })
            .collect()
    }

    /// Outer markup of the first content-region heading, if the page has one.
    pub fn first_content_heading(&self) -> Option<String> {
        let document = Html::parse_document(&self.html);
        document
            .select(&CONTENT_HEADING)
            .next()
            .map(|element| element.html())
    }
}
