// src/pipeline/run.rs

//! Orchestration for the two deployment modes.

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{Snapshot, WatchedSource};
use crate::pipeline::check::{CheckContext, CheckOutcome, CycleOptions, run_cycle};
use crate::services::{HttpFetcher, PageFetcher, SmtpMailer, health};
use crate::storage::{MemoryStore, MongoStore, SnapshotStore};

/// Run one check cycle for every source against the durable store, then
/// release the connection and return.
///
/// Sources are checked sequentially; the shared store handle is closed only
/// once every source has completed its cycle, success or not.
pub async fn run_batch(config: &Config) -> Result<()> {
    let store_config = config.store.as_ref().ok_or_else(|| {
        AppError::config("batch mode needs MONGODB_USERNAME, MONGODB_PASSWORD and MONGODB_CLUSTER")
    })?;

    let store = MongoStore::connect(store_config).await?;
    let fetcher = HttpFetcher::new(&config.http)?;
    let mailer = SmtpMailer::new(&config.smtp)?;
    let sources = WatchedSource::all(&config.schedule)?;

    let ctx = CheckContext {
        fetcher: &fetcher,
        store: &store,
        notifier: &mailer,
        options: CycleOptions {
            max_retries: config.schedule.max_retries,
            retry_delay: Duration::from_secs(config.schedule.retry_delay_secs),
        },
    };

    let mut completed = 0;
    for source in &sources {
        let outcome = run_cycle(&ctx, source).await;
        log_outcome(source, outcome);
        completed += 1;
    }

    if completed == sources.len() {
        store.close().await;
    }

    Ok(())
}

/// Run forever: seed an in-memory store, then check every source on its own
/// interval, with the liveness listener bound for the hosting platform.
pub async fn run_daemon(config: &Config) -> Result<()> {
    let fetcher = Arc::new(HttpFetcher::new(&config.http)?);
    let mailer = Arc::new(SmtpMailer::new(&config.smtp)?);
    let store = MemoryStore::new();
    let sources = WatchedSource::all(&config.schedule)?;

    let port = config.port;
    tokio::spawn(async move {
        if let Err(error) = health::serve(port).await {
            log::error!("Liveness listener failed: {}", error);
        }
    });

    // Seed every source before the timers start; a page that cannot be
    // fetched at startup leaves nothing to compare against, so it is fatal.
    for source in &sources {
        let snapshot = seed_snapshot(fetcher.as_ref(), source, config).await?;
        store.save(&source.snapshot_key, &snapshot).await?;
        log::info!("Seeded initial snapshot for {}.", source.subject_en);
    }

    let tasks: Vec<_> = sources
        .into_iter()
        .map(|source| {
            let fetcher = Arc::clone(&fetcher);
            let mailer = Arc::clone(&mailer);
            let store = store.clone();

            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(source.interval);
                // The source was just seeded; skip the immediate first tick.
                ticker.tick().await;

                loop {
                    ticker.tick().await;
                    let ctx = CheckContext {
                        fetcher: fetcher.as_ref(),
                        store: &store,
                        notifier: mailer.as_ref(),
                        options: CycleOptions::next_tick_only(),
                    };
                    let outcome = run_cycle(&ctx, &source).await;
                    log_outcome(&source, outcome);
                }
            })
        })
        .collect();

    futures::future::join_all(tasks).await;
    Ok(())
}

/// Fetch the first snapshot for a source, with the configured retry policy.
async fn seed_snapshot(
    fetcher: &dyn PageFetcher,
    source: &WatchedSource,
    config: &Config,
) -> Result<Snapshot> {
    let mut attempts = 0;
    loop {
        match fetcher.fetch(&source.url).await {
            Ok(snapshot) => return Ok(snapshot),
            Err(error) if attempts < config.schedule.max_retries => {
                attempts += 1;
                log::warn!(
                    "Initial fetch failed for {} ({}). Retrying...",
                    source.subject_en,
                    error
                );
                tokio::time::sleep(Duration::from_secs(config.schedule.retry_delay_secs)).await;
            }
            Err(error) => return Err(error),
        }
    }
}

fn log_outcome(source: &WatchedSource, outcome: CheckOutcome) {
    match outcome {
        CheckOutcome::Unchanged => {
            log::info!("{}: unchanged.", source.subject_en);
        }
        CheckOutcome::Notified => {
            log::info!("{}: change notified.", source.subject_en);
        }
        CheckOutcome::NothingToReport => {
            log::info!("{}: changed, nothing to report.", source.subject_en);
        }
        CheckOutcome::GaveUp => {
            log::warn!("{}: cycle abandoned after repeated failures.", source.subject_en);
        }
    }
}
