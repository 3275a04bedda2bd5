// src/error.rs

//! Unified error handling for the watcher application.

use std::fmt;

use thiserror::Error;

/// Result type alias for watcher operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Which store operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Read,
    Write,
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreOp::Read => write!(f, "read"),
            StoreOp::Write => write!(f, "write"),
        }
    }
}

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Page fetch did not yield a usable document
    #[error("fetch failed for {url} (status: {status:?})")]
    Fetch { url: String, status: Option<u16> },

    /// HTTP transport failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Snapshot store operation failed
    #[error("store {operation} failed: {message}")]
    Store { operation: StoreOp, message: String },

    /// Database driver error outside a read/write operation
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    /// Outbound mail dispatch failed
    #[error("mail send failed: {0}")]
    Send(String),

    /// CSS selector parsing failed
    #[error("invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Mail address parsing failed
    #[error("address error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Create a fetch error with the attempted status code, when known.
    pub fn fetch(url: impl Into<String>, status: Option<u16>) -> Self {
        Self::Fetch {
            url: url.into(),
            status,
        }
    }

    /// Create a store read error.
    pub fn store_read(message: impl fmt::Display) -> Self {
        Self::Store {
            operation: StoreOp::Read,
            message: message.to_string(),
        }
    }

    /// Create a store write error.
    pub fn store_write(message: impl fmt::Display) -> Self {
        Self::Store {
            operation: StoreOp::Write,
            message: message.to_string(),
        }
    }

    /// Create a mail send error.
    pub fn send(message: impl fmt::Display) -> Self {
        Self::Send(message.to_string())
    }

    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
