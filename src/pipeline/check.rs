// src/pipeline/check.rs

//! The per-source check cycle.
//!
//! Each cycle is an explicit state machine:
//!
//! ```text
//! Fetching -> ResolvingSnapshot -> Comparing -> { Unchanged | Notifying } -> Done
//! ```
//!
//! Fetching and snapshot resolution retry with a fixed linear delay up to a
//! bound; exhausting the bound abandons the cycle with no side effects.
//! Notification is soft: a failed send never blocks snapshot persistence,
//! and a failed persistence never rolls back the send, so delivery is
//! at-least-once across cycles.

use std::time::Duration;

use crate::error::AppError;
use crate::models::{Snapshot, WatchedSource};
use crate::services::{Notifier, PageFetcher};
use crate::storage::SnapshotStore;

/// Retry policy for one cycle.
#[derive(Debug, Clone, Copy)]
pub struct CycleOptions {
    /// Retries after the first failed attempt, per retryable step
    pub max_retries: u32,

    /// Fixed delay between attempts
    pub retry_delay: Duration,
}

impl CycleOptions {
    /// Policy for the daemon: no in-cycle retries, the next interval tick
    /// is the retry.
    pub fn next_tick_only() -> Self {
        Self {
            max_retries: 0,
            retry_delay: Duration::ZERO,
        }
    }
}

/// Everything a check cycle needs, passed explicitly instead of living in
/// process-global state.
pub struct CheckContext<'a> {
    pub fetcher: &'a dyn PageFetcher,
    pub store: &'a dyn SnapshotStore,
    pub notifier: &'a dyn Notifier,
    pub options: CycleOptions,
}

/// Terminal result of one check cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The page matches the stored snapshot; no side effects
    Unchanged,

    /// A change was detected and a notification was dispatched
    Notified,

    /// A change was detected but the delta was empty (order-only change);
    /// the snapshot was persisted without mailing
    NothingToReport,

    /// Fetch or snapshot resolution exhausted its retries; no side effects
    GaveUp,
}

enum CheckState {
    Fetching {
        attempts: u32,
    },
    ResolvingSnapshot {
        current: Snapshot,
        attempts: u32,
    },
    Comparing {
        previous: Snapshot,
        current: Snapshot,
    },
    Notifying {
        previous: Snapshot,
        current: Snapshot,
    },
    Done(CheckOutcome),
}

/// Run one full check cycle for a source.
pub async fn run_cycle(ctx: &CheckContext<'_>, source: &WatchedSource) -> CheckOutcome {
    log::info!("Checking {}...", source.subject_en);

    let mut state = CheckState::Fetching { attempts: 0 };
    loop {
        state = match state {
            CheckState::Fetching { attempts } => match ctx.fetcher.fetch(&source.url).await {
                Ok(current) => {
                    log::info!("Fetched current page for {}.", source.subject_en);
                    CheckState::ResolvingSnapshot {
                        current,
                        attempts: 0,
                    }
                }
                Err(error) => retry_or_give_up(ctx, source, attempts, "fetch", &error, |attempts| {
                    CheckState::Fetching { attempts }
                })
                .await,
            },

            CheckState::ResolvingSnapshot { current, attempts } => {
                match ctx.store.load(&source.snapshot_key).await {
                    Ok(Some(previous)) => {
                        log::info!("Resolved stored snapshot for {}.", source.snapshot_key);
                        CheckState::Comparing { previous, current }
                    }
                    Ok(None) => {
                        // Absent is not "unchanged"; it gets the same retry
                        // treatment as a failed read.
                        let error = AppError::store_read("no stored snapshot for key");
                        retry_or_give_up(ctx, source, attempts, "snapshot read", &error, |attempts| {
                            CheckState::ResolvingSnapshot { current, attempts }
                        })
                        .await
                    }
                    Err(error) => {
                        retry_or_give_up(ctx, source, attempts, "snapshot read", &error, |attempts| {
                            CheckState::ResolvingSnapshot { current, attempts }
                        })
                        .await
                    }
                }
            }

            CheckState::Comparing { previous, current } => {
                if source.unchanged(&previous, &current) {
                    log::info!("No updates detected for {}.", source.subject_en);
                    CheckState::Done(CheckOutcome::Unchanged)
                } else {
                    CheckState::Notifying { previous, current }
                }
            }

            CheckState::Notifying { previous, current } => {
                let body = source.delta(&previous, &current);

                let outcome = if body.is_empty() {
                    log::warn!(
                        "Change detected for {} but the delta is empty (order-only change); nothing to mail.",
                        source.subject_en
                    );
                    CheckOutcome::NothingToReport
                } else {
                    log::info!(
                        "Updates detected for {}. Sending notification...",
                        source.subject_en
                    );
                    if let Err(error) = ctx.notifier.send(&source.subject_ro, &body).await {
                        log::error!(
                            "Failed to send notification for {}: {}",
                            source.subject_en,
                            error
                        );
                    }
                    CheckOutcome::Notified
                };

                // Persisted regardless of the send outcome. A failed save
                // means the same change is re-detected (and re-sent) on the
                // next cycle.
                match ctx.store.save(&source.snapshot_key, &current).await {
                    Ok(()) => log::info!("Stored new snapshot for {}.", source.snapshot_key),
                    Err(error) => log::error!(
                        "Failed to persist snapshot for {}: {}",
                        source.snapshot_key,
                        error
                    ),
                }

                CheckState::Done(outcome)
            }

            CheckState::Done(outcome) => return outcome,
        };
    }
}

/// Decide between a delayed re-attempt and abandoning the cycle.
async fn retry_or_give_up(
    ctx: &CheckContext<'_>,
    source: &WatchedSource,
    attempts: u32,
    step: &str,
    error: &AppError,
    next: impl FnOnce(u32) -> CheckState,
) -> CheckState {
    if attempts < ctx.options.max_retries {
        log::warn!(
            "{} failed for {} ({}). Retrying in {:?}...",
            step,
            source.subject_en,
            error,
            ctx.options.retry_delay
        );
        tokio::time::sleep(ctx.options.retry_delay).await;
        next(attempts + 1)
    } else {
        log::warn!(
            "Hit the {} retry limit for {}; giving up until the next cycle ({}).",
            step,
            source.subject_en,
            error
        );
        CheckState::Done(CheckOutcome::GaveUp)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use url::Url;

    use super::*;
    use crate::config::ScheduleConfig;
    use crate::error::{AppError, Result};

    fn fast_options(max_retries: u32) -> CycleOptions {
        CycleOptions {
            max_retries,
            retry_delay: Duration::ZERO,
        }
    }

    fn announcement_source() -> WatchedSource {
        WatchedSource::all(&ScheduleConfig::default()).unwrap()[0].clone()
    }

    fn announcements_page(ids: &[&str]) -> String {
        let articles: Vec<String> = ids
            .iter()
            .map(|id| format!(r#"<article id="{id}"><h2>{id}</h2></article>"#))
            .collect();
        format!("<html><body>{}</body></html>", articles.join(""))
    }

    /// Fetcher that replays a scripted sequence, then a steady fallback.
    /// With no script and no fallback every call fails with a 503.
    struct ScriptedFetcher {
        script: Mutex<VecDeque<Result<Snapshot>>>,
        fallback: Option<String>,
        calls: AtomicUsize,
    }

    impl ScriptedFetcher {
        fn new(script: Vec<Result<Snapshot>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                fallback: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn always(html: &str) -> Self {
            Self {
                script: Mutex::new(VecDeque::new()),
                fallback: Some(html.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PageFetcher for ScriptedFetcher {
        async fn fetch(&self, url: &Url) -> Result<Snapshot> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut script = self.script.lock().unwrap();
            match script.pop_front() {
                Some(response) => response,
                None => match &self.fallback {
                    Some(html) => Ok(Snapshot::parse(html.clone())),
                    None => Err(AppError::fetch(url.as_str(), Some(503))),
                },
            }
        }
    }

    /// Store with a scripted previous snapshot and togglable write failures.
    struct FakeStore {
        previous: Option<String>,
        fail_writes: bool,
        loads: AtomicUsize,
        saved: Mutex<Vec<(String, String)>>,
    }

    impl FakeStore {
        fn with_previous(html: &str) -> Self {
            Self {
                previous: Some(html.to_string()),
                fail_writes: false,
                loads: AtomicUsize::new(0),
                saved: Mutex::new(Vec::new()),
            }
        }

        fn absent() -> Self {
            Self {
                previous: None,
                fail_writes: false,
                loads: AtomicUsize::new(0),
                saved: Mutex::new(Vec::new()),
            }
        }

        fn saved_count(&self) -> usize {
            self.saved.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl SnapshotStore for FakeStore {
        async fn load(&self, _key: &str) -> Result<Option<Snapshot>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(self.previous.as_deref().map(Snapshot::parse))
        }

        async fn save(&self, key: &str, snapshot: &Snapshot) -> Result<()> {
            if self.fail_writes {
                return Err(AppError::store_write("write refused"));
            }
            self.saved
                .lock()
                .unwrap()
                .push((key.to_string(), snapshot.as_html().to_string()));
            Ok(())
        }
    }

    /// Notifier that records every send.
    #[derive(Default)]
    struct RecordingNotifier {
        fail: bool,
        sent: Mutex<Vec<(String, String)>>,
    }

    impl RecordingNotifier {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn sent_count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, subject: &str, html_body: &str) -> Result<()> {
            if self.fail {
                return Err(AppError::send("relay rejected the message"));
            }
            self.sent
                .lock()
                .unwrap()
                .push((subject.to_string(), html_body.to_string()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn unchanged_page_has_no_side_effects() {
        let page = announcements_page(&["x1", "x2"]);
        let fetcher = ScriptedFetcher::always(&page);
        let store = FakeStore::with_previous(&page);
        let notifier = RecordingNotifier::default();
        let ctx = CheckContext {
            fetcher: &fetcher,
            store: &store,
            notifier: &notifier,
            options: fast_options(5),
        };
        let source = announcement_source();

        // Two no-op cycles: never a send, never a store write.
        assert_eq!(run_cycle(&ctx, &source).await, CheckOutcome::Unchanged);
        assert_eq!(run_cycle(&ctx, &source).await, CheckOutcome::Unchanged);
        assert_eq!(notifier.sent_count(), 0);
        assert_eq!(store.saved_count(), 0);
    }

    #[tokio::test]
    async fn new_item_notifies_with_romanian_subject_and_persists() {
        let fetcher = ScriptedFetcher::always(&announcements_page(&["x2", "x1"]));
        let store = FakeStore::with_previous(&announcements_page(&["x1"]));
        let notifier = RecordingNotifier::default();
        let ctx = CheckContext {
            fetcher: &fetcher,
            store: &store,
            notifier: &notifier,
            options: fast_options(5),
        };
        let source = announcement_source();

        assert_eq!(run_cycle(&ctx, &source).await, CheckOutcome::Notified);

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "Anunturi Secretariat");
        assert!(sent[0].1.contains(r#"id="x2""#));
        assert!(!sent[0].1.contains(r#"id="x1""#));
        assert_eq!(store.saved_count(), 1);
    }

    #[tokio::test]
    async fn fetch_retries_are_bounded() {
        let fetcher = ScriptedFetcher::new(Vec::new());
        let store = FakeStore::with_previous(&announcements_page(&["x1"]));
        let notifier = RecordingNotifier::default();
        let ctx = CheckContext {
            fetcher: &fetcher,
            store: &store,
            notifier: &notifier,
            options: fast_options(2),
        };
        let source = announcement_source();

        assert_eq!(run_cycle(&ctx, &source).await, CheckOutcome::GaveUp);
        // One initial attempt plus two retries, then nothing.
        assert_eq!(fetcher.calls(), 3);
        assert_eq!(notifier.sent_count(), 0);
        assert_eq!(store.saved_count(), 0);
    }

    #[tokio::test]
    async fn absent_snapshot_is_retried_not_treated_as_unchanged() {
        let page = announcements_page(&["x1"]);
        let fetcher = ScriptedFetcher::always(&page);
        let store = FakeStore::absent();
        let notifier = RecordingNotifier::default();
        let ctx = CheckContext {
            fetcher: &fetcher,
            store: &store,
            notifier: &notifier,
            options: fast_options(1),
        };
        let source = announcement_source();

        assert_eq!(run_cycle(&ctx, &source).await, CheckOutcome::GaveUp);
        assert_eq!(store.loads.load(Ordering::SeqCst), 2);
        assert_eq!(notifier.sent_count(), 0);
        assert_eq!(store.saved_count(), 0);
    }

    #[tokio::test]
    async fn failed_send_still_persists_the_snapshot() {
        let fetcher = ScriptedFetcher::always(&announcements_page(&["x2", "x1"]));
        let store = FakeStore::with_previous(&announcements_page(&["x1"]));
        let notifier = RecordingNotifier::failing();
        let ctx = CheckContext {
            fetcher: &fetcher,
            store: &store,
            notifier: &notifier,
            options: fast_options(5),
        };
        let source = announcement_source();

        assert_eq!(run_cycle(&ctx, &source).await, CheckOutcome::Notified);
        assert_eq!(store.saved_count(), 1);
    }

    #[tokio::test]
    async fn failed_persistence_re_sends_next_cycle() {
        let page = announcements_page(&["x2", "x1"]);
        let fetcher = ScriptedFetcher::always(&page);
        let mut store = FakeStore::with_previous(&announcements_page(&["x1"]));
        store.fail_writes = true;
        let notifier = RecordingNotifier::default();
        let ctx = CheckContext {
            fetcher: &fetcher,
            store: &store,
            notifier: &notifier,
            options: fast_options(5),
        };
        let source = announcement_source();

        // At-least-once: the store never advances, so the same change is
        // detected and mailed again.
        assert_eq!(run_cycle(&ctx, &source).await, CheckOutcome::Notified);
        assert_eq!(run_cycle(&ctx, &source).await, CheckOutcome::Notified);
        assert_eq!(notifier.sent_count(), 2);
        assert_eq!(store.saved_count(), 0);
    }

    #[tokio::test]
    async fn reorder_only_change_skips_mail_but_persists() {
        let fetcher = ScriptedFetcher::always(&announcements_page(&["x2", "x1"]));
        let store = FakeStore::with_previous(&announcements_page(&["x1", "x2"]));
        let notifier = RecordingNotifier::default();
        let ctx = CheckContext {
            fetcher: &fetcher,
            store: &store,
            notifier: &notifier,
            options: fast_options(5),
        };
        let source = announcement_source();

        assert_eq!(
            run_cycle(&ctx, &source).await,
            CheckOutcome::NothingToReport
        );
        assert_eq!(notifier.sent_count(), 0);
        assert_eq!(store.saved_count(), 1);
    }
}
