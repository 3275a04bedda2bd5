// src/detector/paragraphs.rs

//! Change detection for single-article content pages.

use std::collections::HashSet;

use crate::models::ParagraphItem;

/// Whether the article's paragraphs are unchanged.
///
/// Unequal counts always mean a change. With equal counts, the pages count
/// as equal iff every new paragraph's text appears somewhere in the old
/// paragraph set; order is ignored. Containment is checked in that one
/// direction only, matching the upstream rule as observed.
pub fn unchanged(old: &[ParagraphItem], new: &[ParagraphItem]) -> bool {
    if old.len() != new.len() {
        return false;
    }

    let old_texts: HashSet<&str> = old.iter().map(|item| item.text.as_str()).collect();
    new.iter().all(|item| old_texts.contains(item.text.as_str()))
}

/// The first heading wrapped in a link to the source page, followed by the
/// markup of every paragraph whose text is absent from the old set, in
/// new-page order.
///
/// There is no separator between the heading link and the first paragraph;
/// subsequent paragraphs are separated by line breaks. A page without a
/// heading simply omits the link.
pub fn delta(
    old: &[ParagraphItem],
    new: &[ParagraphItem],
    heading_html: Option<&str>,
    source_url: &str,
) -> String {
    let mut body = String::new();

    if let Some(heading) = heading_html {
        body.push_str(&format!(r#"<a href="{source_url}">{heading}</a>"#));
    }

    let known: HashSet<&str> = old.iter().map(|item| item.text.as_str()).collect();
    let fresh: Vec<&str> = new
        .iter()
        .filter(|item| !known.contains(item.text.as_str()))
        .map(|item| item.html.as_str())
        .collect();
    body.push_str(&fresh.join("\n"));

    body
}
