use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncoderError {
    #[error("video not found: {}", .0.display())]
    VideoNotFound(PathBuf),

    #[error("encoder executable `{0}` not found on PATH")]
    EncoderNotFound(String),

    #[error("failed to spawn encoder: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("failed to signal encoder (pid {pid}): {reason}")]
    Signal { pid: u32, reason: String },

    #[error("failed to kill encoder: {0}")]
    Kill(#[source] std::io::Error),

    #[error("failed waiting for encoder exit: {0}")]
    Wait(#[source] std::io::Error),
}

impl EncoderError {
    /// Whether the error was raised before any process was spawned.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            EncoderError::VideoNotFound(_) | EncoderError::EncoderNotFound(_)
        )
    }
}
