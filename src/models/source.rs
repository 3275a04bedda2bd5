// src/models/source.rs

//! The monitored pages and their comparison rules.

use std::time::Duration;

use url::Url;

use crate::config::ScheduleConfig;
use crate::detector::{announcements, paragraphs};
use crate::error::Result;
use crate::models::Snapshot;

/// Secretariat announcements category page.
pub const ANNOUNCEMENTS_URL: &str = "https://fmi.unibuc.ro/category/anunturi-secretariat/";

/// Studies-completion information page.
pub const STUDIES_COMPLETION_URL: &str = "https://fmi.unibuc.ro/finalizare-studii/";

/// How a page's content is compared across snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A list of announcement items with stable element ids
    AnnouncementList,

    /// A single article whose paragraphs carry no stable ids
    Article,
}

/// One monitored page: identity, subjects, and comparison rules.
///
/// Immutable after construction; exactly one instance per monitored page.
#[derive(Debug, Clone)]
pub struct WatchedSource {
    /// Subject used in logs
    pub subject_en: String,

    /// Subject used in the outgoing mail
    pub subject_ro: String,

    /// Page to fetch
    pub url: Url,

    /// Stable key for the snapshot store
    pub snapshot_key: String,

    /// Which detector variant applies
    pub kind: SourceKind,

    /// Daemon-mode check interval
    pub interval: Duration,
}

impl WatchedSource {
    /// Build the full list of monitored pages.
    pub fn all(schedule: &ScheduleConfig) -> Result<Vec<WatchedSource>> {
        Ok(vec![
            WatchedSource {
                subject_en: "Secretary Announcements".to_string(),
                subject_ro: "Anunturi Secretariat".to_string(),
                url: Url::parse(ANNOUNCEMENTS_URL)?,
                snapshot_key: "secretaryAnnouncements".to_string(),
                kind: SourceKind::AnnouncementList,
                interval: Duration::from_secs(schedule.announcements_interval_mins * 60),
            },
            WatchedSource {
                subject_en: "Studies Completion".to_string(),
                subject_ro: "Finalizare Studii".to_string(),
                url: Url::parse(STUDIES_COMPLETION_URL)?,
                snapshot_key: "studiesCompletion".to_string(),
                kind: SourceKind::Article,
                interval: Duration::from_secs(schedule.studies_interval_mins * 60),
            },
        ])
    }

    /// Whether the page is unchanged between the two snapshots, under this
    /// source's equality rule.
    pub fn unchanged(&self, old: &Snapshot, new: &Snapshot) -> bool {
        match self.kind {
            SourceKind::AnnouncementList => {
                announcements::unchanged(&old.announcement_items(), &new.announcement_items())
            }
            SourceKind::Article => {
                paragraphs::unchanged(&old.content_paragraphs(), &new.content_paragraphs())
            }
        }
    }

    /// Render the markup of everything new in `new` relative to `old`.
    ///
    /// May be empty even when [`unchanged`](Self::unchanged) returned false;
    /// callers treat an empty delta as nothing worth mailing.
    pub fn delta(&self, old: &Snapshot, new: &Snapshot) -> String {
        match self.kind {
            SourceKind::AnnouncementList => {
                announcements::delta(&old.announcement_items(), &new.announcement_items())
            }
            SourceKind::Article => paragraphs::delta(
                &old.content_paragraphs(),
                &new.content_paragraphs(),
                new.first_content_heading().as_deref(),
                self.url.as_str(),
            ),
        }
    }
}
