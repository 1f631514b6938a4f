//! Supervised stream sessions
//!
//! This module provides the `StreamSession` abstraction that manages:
//! - Launching the encoder for one stream job
//! - Draining and filtering the encoder's diagnostic output
//! - Counting down the run duration and publishing status ticks
//! - The stop sequence and the per-session log file

mod config;
mod log;
mod monitor;
mod session;
mod stats;
mod tracker;

pub use config::SessionConfig;
pub use log::SessionLog;
pub use monitor::{is_failure_line, monitor, MonitorSummary, FAILURE_KEYWORDS, TAIL_LINES};
pub use session::StreamSession;
pub use stats::{EndReason, SessionOutcome, SessionReport};
pub use tracker::{DurationTracker, Tick, TrackerState};
