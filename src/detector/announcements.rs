// src/detector/announcements.rs

//! Change detection for announcement-list pages.

use std::collections::HashSet;

use crate::models::AnnouncementItem;

/// Whether the announcement list is unchanged.
///
/// The lists are compared as ordered id sequences, element for element.
/// A reorder of the same ids therefore counts as a change.
pub fn unchanged(old: &[AnnouncementItem], new: &[AnnouncementItem]) -> bool {
    let old_ids: Vec<&str> = old.iter().map(|item| item.id.as_str()).collect();
    let new_ids: Vec<&str> = new.iter().map(|item| item.id.as_str()).collect();
    old_ids == new_ids
}

/// Markup of every new item whose id is absent from the old list, in
/// new-list order, separated by line breaks.
///
/// Empty when no id is new, which can happen on a reorder-only change.
pub fn delta(old: &[AnnouncementItem], new: &[AnnouncementItem]) -> String {
    let known: HashSet<&str> = old.iter().map(|item| item.id.as_str()).collect();
    let fresh: Vec<&str> = new
        .iter()
        .filter(|item| !known.contains(item.id.as_str()))
        .map(|item| item.html.as_str())
        .collect();
    fresh.join("\n")
}
