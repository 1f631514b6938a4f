use anyhow::{bail, Context, Result};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Detects whether an input file carries an audio stream
///
/// Implementations:
/// - `FfprobeAudioProbe`: runs the configured probe executable
/// - tests plug in fixed answers
#[async_trait::async_trait]
pub trait AudioProbe: Send + Sync {
    async fn has_audio(&self, path: &Path) -> Result<bool>;

    /// Probe name for logging
    fn name(&self) -> &str;
}

/// Audio probe backed by an `ffprobe`-compatible executable
pub struct FfprobeAudioProbe {
    binary: String,
}

impl FfprobeAudioProbe {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn args(path: &Path) -> Vec<String> {
        vec![
            "-v".into(),
            "error".into(),
            "-select_streams".into(),
            "a".into(),
            "-show_entries".into(),
            "stream=codec_type".into(),
            "-of".into(),
            "default=noprint_wrappers=1:nokey=1".into(),
            path.display().to_string(),
        ]
    }
}

#[async_trait::async_trait]
impl AudioProbe for FfprobeAudioProbe {
    async fn has_audio(&self, path: &Path) -> Result<bool> {
        debug!("Probing audio streams of {}", path.display());

        let output = Command::new(&self.binary)
            .args(Self::args(path))
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| format!("Failed to run {}", self.binary))?;

        if !output.status.success() {
            bail!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        // One `audio` line per audio stream, nothing otherwise
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(!stdout.trim().is_empty())
    }

    fn name(&self) -> &str {
        &self.binary
    }
}
