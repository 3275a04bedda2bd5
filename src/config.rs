// src/config.rs

//! Application configuration, loaded from environment variables.
//!
//! Deployment config (credentials, recipients, intervals) comes from the
//! environment; a `.env` file is honored when present. Anything with a
//! sensible default is optional.

use std::env;
use std::fmt;
use std::str::FromStr;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP client behavior
    pub http: HttpConfig,

    /// Outbound mail credentials and recipients
    pub smtp: SmtpConfig,

    /// Snapshot store connection, present only when the Mongo variables are set
    pub store: Option<StoreConfig>,

    /// Check cadence and retry policy
    pub schedule: ScheduleConfig,

    /// Port for the hosting platform's liveness listener
    pub port: u16,
}

/// HTTP client settings.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    pub user_agent: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::TIMEOUT_SECS,
        }
    }
}

/// Outbound mail settings. The relay host and port are fixed by the provider.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// Sender account, also used as the from address
    pub username: String,

    /// Sender account password (app password)
    pub password: String,

    /// Notification recipients
    pub recipients: Vec<String>,
}

/// Snapshot store connection settings.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub username: String,
    pub password: String,

    /// Cluster host, e.g. `cluster0.example.mongodb.net`
    pub cluster: String,
}

/// Check cadence and retry policy.
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    /// Bounded retries for fetch and store-read failures within one cycle
    pub max_retries: u32,

    /// Fixed delay between retries, in seconds
    pub retry_delay_secs: u64,

    /// Daemon-mode check interval for the announcements page, in minutes
    pub announcements_interval_mins: u64,

    /// Daemon-mode check interval for the studies-completion page, in minutes
    pub studies_interval_mins: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            max_retries: defaults::MAX_RETRIES,
            retry_delay_secs: defaults::RETRY_DELAY_SECS,
            announcements_interval_mins: defaults::ANNOUNCEMENTS_INTERVAL_MINS,
            studies_interval_mins: defaults::STUDIES_INTERVAL_MINS,
        }
    }
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// Sender credentials and recipients are required. The store variables
    /// must be set all together or not at all; batch mode refuses to run
    /// without them.
    pub fn from_env() -> Result<Self> {
        let smtp = SmtpConfig {
            username: required("SENDER_USERNAME")?,
            password: required("SENDER_PASSWORD")?,
            recipients: parse_recipients(&required("RECEIVERS_LIST")?),
        };
        if smtp.recipients.is_empty() {
            return Err(AppError::config("RECEIVERS_LIST contains no addresses"));
        }

        let store = match (
            optional("MONGODB_USERNAME"),
            optional("MONGODB_PASSWORD"),
            optional("MONGODB_CLUSTER"),
        ) {
            (Some(username), Some(password), Some(cluster)) => Some(StoreConfig {
                username,
                password,
                cluster,
            }),
            (None, None, None) => None,
            _ => {
                return Err(AppError::config(
                    "MONGODB_USERNAME, MONGODB_PASSWORD and MONGODB_CLUSTER must be set together",
                ));
            }
        };

        let http = HttpConfig {
            user_agent: optional("HTTP_USER_AGENT").unwrap_or_else(defaults::user_agent),
            timeout_secs: parsed("HTTP_TIMEOUT_SECS", defaults::TIMEOUT_SECS)?,
        };

        let schedule = ScheduleConfig {
            max_retries: parsed("CHECK_RETRIES", defaults::MAX_RETRIES)?,
            retry_delay_secs: parsed("RETRY_DELAY_SECS", defaults::RETRY_DELAY_SECS)?,
            announcements_interval_mins: parsed(
                "ANNOUNCEMENTS_INTERVAL_MINS",
                defaults::ANNOUNCEMENTS_INTERVAL_MINS,
            )?,
            studies_interval_mins: parsed(
                "STUDIES_INTERVAL_MINS",
                defaults::STUDIES_INTERVAL_MINS,
            )?,
        };

        let port = parsed("PORT", defaults::PORT)?;

        Ok(Self {
            http,
            smtp,
            store,
            schedule,
            port,
        })
    }
}

/// Read a required environment variable.
fn required(name: &str) -> Result<String> {
    optional(name).ok_or_else(|| AppError::config(format!("{name} is not set")))
}

/// Read an optional environment variable, treating empty values as unset.
fn optional(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        _ => None,
    }
}

/// Read and parse an environment variable, falling back to a default.
fn parsed<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match optional(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| AppError::config(format!("{name} is invalid: {e}"))),
        None => Ok(default),
    }
}

/// Split a comma-separated recipient list into addresses.
fn parse_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|address| !address.is_empty())
        .map(str::to_string)
        .collect()
}

mod defaults {
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; fmi-news/0.1)".into()
    }
    pub const TIMEOUT_SECS: u64 = 30;
    pub const MAX_RETRIES: u32 = 5;
    pub const RETRY_DELAY_SECS: u64 = 10;
    pub const ANNOUNCEMENTS_INTERVAL_MINS: u64 = 30;
    pub const STUDIES_INTERVAL_MINS: u64 = 720;
    pub const PORT: u16 = 5000;
}
