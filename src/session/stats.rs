use chrono::{DateTime, Local};
use std::path::PathBuf;
use tokio::time::Instant;

use crate::encoder::ExitOutcome;

/// Why the supervised wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The configured run duration elapsed
    DurationElapsed,
    /// The encoder exited on its own before the duration elapsed
    EncoderExited,
    /// The user interrupted the run
    Interrupted,
    /// Session bookkeeping failed mid-run
    Error,
}

/// Final state of a session
#[derive(Debug, Clone)]
pub enum SessionOutcome {
    /// The encoder ran and was stopped; a non-zero exit is still a completion
    Completed { end: EndReason, exit: ExitOutcome },

    /// A precondition failed, nothing was spawned
    Abandoned { reason: String },

    /// An unexpected error ended the session
    Failed {
        error: String,
        exit: Option<ExitOutcome>,
    },
}

impl SessionOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, SessionOutcome::Completed { .. })
    }

    pub fn exit(&self) -> Option<&ExitOutcome> {
        match self {
            SessionOutcome::Completed { exit, .. } => Some(exit),
            SessionOutcome::Failed { exit, .. } => exit.as_ref(),
            SessionOutcome::Abandoned { .. } => None,
        }
    }
}

/// Summary of one supervised session
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub job_index: usize,
    pub video_file: String,

    /// Session log, if the session got far enough to have one
    pub log_path: Option<PathBuf>,

    /// When the session started (launch attempt)
    pub started_at: DateTime<Local>,

    /// Monotonic launch time, used to check the stagger between sessions
    pub launched_at: Instant,

    pub finished_at: DateTime<Local>,

    /// Status ticks published by the duration tracker
    pub ticks: usize,

    pub outcome: SessionOutcome,
}

impl SessionReport {
    pub fn duration_secs(&self) -> f64 {
        self.finished_at
            .signed_duration_since(self.started_at)
            .num_milliseconds() as f64
            / 1000.0
    }
}
