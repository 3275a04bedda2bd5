// src/pipeline/mod.rs

//! The check-and-notify pipeline.

mod check;
mod run;

pub use check::{CheckContext, CheckOutcome, CycleOptions, run_cycle};
pub use run::{run_batch, run_daemon};
