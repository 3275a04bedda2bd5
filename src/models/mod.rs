// src/models/mod.rs

//! Data model for the watcher.

pub mod snapshot;
pub mod source;

pub use snapshot::{AnnouncementItem, ParagraphItem, Snapshot};
pub use source::{SourceKind, WatchedSource};
