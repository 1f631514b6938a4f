//! External encoder process wrapper
//!
//! Builds the encoder invocation for a [`StreamJob`](crate::streams::StreamJob),
//! probes the input for an audio stream, launches the encoder as a child
//! process and owns its lifecycle:
//! - launch (with precondition checks, no process spawned on failure)
//! - waiting for an early exit
//! - graceful stop with a bounded grace period, then forced kill

mod command;
mod error;
mod probe;
mod process;

pub use command::{find_executable, EncoderCommand, EncoderSettings};
pub use error::EncoderError;
pub use probe::{AudioProbe, FfprobeAudioProbe};
pub use process::{EncoderHandle, ExitOutcome};
