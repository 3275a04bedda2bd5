// src/lib.rs

//! FMI News Watcher Library
//!
//! Periodically fetches two FMI Bucharest pages, compares each against the
//! previously stored snapshot, and emails the new content when a change is
//! detected.

pub mod config;
pub mod detector;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
