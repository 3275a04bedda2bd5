// src/services/mod.rs

//! I/O services: page fetching, mail dispatch, liveness listener.

pub mod fetcher;
pub mod health;
pub mod mailer;

pub use fetcher::{HttpFetcher, PageFetcher};
pub use mailer::{Notifier, SmtpMailer};
