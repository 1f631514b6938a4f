// Shared fixtures: fake encoder scripts and a fixed audio probe.

#![allow(dead_code)]

use anyhow::Result;
use loopcast::encoder::AudioProbe;
use loopcast::{EncoderSettings, SessionConfig, StreamEntry, StreamJob};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Encoder that logs a warning and then runs until signalled
pub const LONG_RUNNING: &str = "echo 'Connection error: broken pipe' >&2\nexec sleep 1000";

/// Encoder that ignores SIGTERM
pub const IGNORES_TERM: &str =
    "trap '' TERM\necho ready >&2\nwhile :; do sleep 0.1; done";

/// Encoder that crashes right away
pub const CRASHES: &str = "echo 'fatal error: cannot open output' >&2\nexit 3";

pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

pub fn touch_video(dir: &Path, name: &str) {
    std::fs::write(dir.join(name), b"not really a video").unwrap();
}

pub fn encoder_settings(binary: &Path) -> EncoderSettings {
    EncoderSettings {
        binary: binary.display().to_string(),
        probe_binary: "ffprobe".to_string(),
        nice_level: 0,
        video_codec: "copy".to_string(),
        audio_codec: "aac".to_string(),
        audio_bitrate: "128k".to_string(),
        threads: 1,
        format: "flv".to_string(),
        silent_audio: "anullsrc=channel_layout=stereo:sample_rate=44100".to_string(),
    }
}

pub fn session_config(
    base_dir: &Path,
    encoder: &Path,
    tick_interval: Duration,
    stop_grace: Duration,
) -> SessionConfig {
    SessionConfig {
        base_dir: base_dir.to_path_buf(),
        encoder: encoder_settings(encoder),
        tick_interval,
        stop_grace,
        drain_timeout: Duration::from_secs(2),
    }
}

pub fn job(index: usize, video: &str, duration_seconds: u64) -> StreamJob {
    StreamJob::new(
        index,
        StreamEntry {
            video_file: video.to_string(),
            stream_key: format!("key{}", index + 1),
        },
        format!("rtmp://127.0.0.1:1/live2/key{}", index + 1),
        duration_seconds,
    )
}

/// Probe with a fixed answer
pub struct FixedProbe(pub bool);

#[async_trait::async_trait]
impl AudioProbe for FixedProbe {
    async fn has_audio(&self, _path: &Path) -> Result<bool> {
        Ok(self.0)
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Probe that always fails
pub struct BrokenProbe;

#[async_trait::async_trait]
impl AudioProbe for BrokenProbe {
    async fn has_audio(&self, _path: &Path) -> Result<bool> {
        anyhow::bail!("probe exploded")
    }

    fn name(&self) -> &str {
        "broken"
    }
}

pub fn read_log(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_default()
}

pub fn count_status_lines(log: &str) -> usize {
    log.lines().filter(|line| line.contains("| Remaining:")).count()
}
