use std::path::PathBuf;
use std::time::Duration;

use crate::config::Config;
use crate::encoder::EncoderSettings;

/// Settings shared by every session of a run
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Directory holding the videos and receiving the session logs
    pub base_dir: PathBuf,

    pub encoder: EncoderSettings,

    /// Spacing of duration ticks
    /// Default: 60 seconds
    pub tick_interval: Duration,

    /// How long a stopping encoder gets before it is killed
    /// Default: 10 seconds
    pub stop_grace: Duration,

    /// How long to wait for the encoder's output to close after it stopped
    /// Default: 5 seconds
    pub drain_timeout: Duration,
}

impl SessionConfig {
    pub fn from_config(config: &Config, base_dir: PathBuf) -> Self {
        Self {
            base_dir,
            encoder: config.encoder.clone(),
            tick_interval: config.timing.tick_interval(),
            stop_grace: config.timing.stop_grace(),
            drain_timeout: config.timing.drain_timeout(),
        }
    }
}
