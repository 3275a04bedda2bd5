// src/detector/mod.rs

//! Change detection between two page snapshots.
//!
//! Two variants exist, one per source kind, and they deliberately apply
//! different strictness: announcement lists compare the full ordered id
//! sequence, article pages compare paragraph text order-independently.

pub mod announcements;
pub mod paragraphs;
