// src/main.rs

//! FMI News Watcher CLI
//!
//! `check` runs one cycle per source against the durable store and exits,
//! for cron-style hosting. `watch` keeps the process alive with one interval
//! timer per source and an in-memory store.

use clap::{Parser, Subcommand};

use fmi_news::config::Config;
use fmi_news::pipeline;

/// FMI News - watches FMI Bucharest pages and emails new content
#[derive(Parser, Debug)]
#[command(name = "fmi-news", version, about = "Watches FMI pages and emails new announcements")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check every source once against the stored snapshots, then exit
    Check,

    /// Keep checking every source on its own interval, with an in-memory store
    Watch,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point.
#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("FMI News watcher starting...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(error) => {
            log::error!("Invalid configuration: {}", error);
            return;
        }
    };

    let result = match cli.command {
        Command::Check => pipeline::run_batch(&config).await,
        Command::Watch => pipeline::run_daemon(&config).await,
    };

    // The hosting scheduler treats any exit as a completed run; failures
    // show up in the logs only, never in the exit code.
    match result {
        Ok(()) => log::info!("Done!"),
        Err(error) => log::error!("Run failed: {}", error),
    }
}
