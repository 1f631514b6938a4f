pub mod config;
pub mod encoder;
pub mod orchestrator;
pub mod prompt;
pub mod session;
pub mod shutdown;
pub mod status;
pub mod streams;

pub use config::Config;
pub use encoder::{
    AudioProbe, EncoderCommand, EncoderError, EncoderHandle, EncoderSettings, ExitOutcome,
};
pub use orchestrator::{Orchestrator, RunSummary};
pub use session::{EndReason, SessionConfig, SessionOutcome, SessionReport, StreamSession};
pub use shutdown::{Shutdown, ShutdownListener};
pub use status::{SessionStatus, StatusBoard, StatusKey};
pub use streams::{StreamEntry, StreamJob};
