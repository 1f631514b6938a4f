use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::encoder::EncoderSettings;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub paths: PathsConfig,
    pub ingest: IngestConfig,
    pub encoder: EncoderSettings,
    pub timing: TimingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// Primary base directory holding videos, the stream list and log files
    pub base_dir: PathBuf,
    /// Used when the primary directory is missing or unreadable
    pub fallback_dir: PathBuf,
    /// Stream list file name, relative to the resolved base directory
    pub stream_list: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// Base ingestion URL; the stream key is appended as the last path segment
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimingConfig {
    pub tick_secs: u64,
    pub stagger_secs: u64,
    pub stop_grace_secs: u64,
    pub drain_timeout_secs: u64,
}

impl TimingConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_secs)
    }

    pub fn stagger(&self) -> Duration {
        Duration::from_secs(self.stagger_secs)
    }

    pub fn stop_grace(&self) -> Duration {
        Duration::from_secs(self.stop_grace_secs)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.drain_timeout_secs)
    }
}

impl Config {
    /// Load configuration from an optional file layered under `LOOPCAST__*` environment variables.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("paths.base_dir", "/storage/emulated/0/Live")?
            .set_default("paths.fallback_dir", "/Penyimpanan internal/Live")?
            .set_default("paths.stream_list", "StreamKeyYoutube.txt")?
            .set_default("ingest.url", "rtmp://a.rtmp.youtube.com/live2")?
            .set_default("encoder.binary", "ffmpeg")?
            .set_default("encoder.probe_binary", "ffprobe")?
            .set_default("encoder.nice_level", 5)?
            .set_default("encoder.video_codec", "copy")?
            .set_default("encoder.audio_codec", "aac")?
            .set_default("encoder.audio_bitrate", "128k")?
            .set_default("encoder.threads", 1)?
            .set_default("encoder.format", "flv")?
            .set_default(
                "encoder.silent_audio",
                "anullsrc=channel_layout=stereo:sample_rate=44100",
            )?
            .set_default("timing.tick_secs", 60)?
            .set_default("timing.stagger_secs", 5)?
            .set_default("timing.stop_grace_secs", 10)?
            .set_default("timing.drain_timeout_secs", 5)?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("LOOPCAST").separator("__"))
            .build()
            .with_context(|| format!("Failed to load config from {}", path))?;

        Ok(settings.try_deserialize()?)
    }

    /// Pick the base directory: primary when readable, otherwise the fallback.
    pub fn resolve_base_dir(&self) -> PathBuf {
        resolve_base_dir(&self.paths.base_dir, &self.paths.fallback_dir)
    }

    /// Destination URL for a stream key.
    pub fn destination_url(&self, stream_key: &str) -> String {
        format!("{}/{}", self.ingest.url.trim_end_matches('/'), stream_key)
    }
}

pub fn resolve_base_dir(primary: &Path, fallback: &Path) -> PathBuf {
    if is_readable_dir(primary) {
        info!("Using base directory {}", primary.display());
        return primary.to_path_buf();
    }

    if is_readable_dir(fallback) {
        println!(
            "[!] Base directory {} is missing or unreadable, using fallback: {}",
            primary.display(),
            fallback.display()
        );
        warn!("Falling back to {}", fallback.display());
    } else {
        eprintln!(
            "[✘] Neither {} nor {} is an accessible directory",
            primary.display(),
            fallback.display()
        );
    }

    fallback.to_path_buf()
}

fn is_readable_dir(path: &Path) -> bool {
    path.is_dir() && std::fs::read_dir(path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_config_file() {
        let cfg = Config::load("does/not/exist/loopcast").unwrap();

        assert_eq!(cfg.ingest.url, "rtmp://a.rtmp.youtube.com/live2");
        assert_eq!(cfg.paths.stream_list, "StreamKeyYoutube.txt");
        assert_eq!(cfg.encoder.binary, "ffmpeg");
        assert_eq!(cfg.encoder.nice_level, 5);
        assert_eq!(cfg.timing.tick_interval(), Duration::from_secs(60));
        assert_eq!(cfg.timing.stagger(), Duration::from_secs(5));
        assert_eq!(cfg.timing.stop_grace(), Duration::from_secs(10));
        assert_eq!(cfg.timing.drain_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[ingest]\nurl = \"rtmp://ingest.example/app\"\n\n[timing]\ntick_secs = 30\n",
        )
        .unwrap();

        let stem = dir.path().join("custom");
        let cfg = Config::load(stem.to_str().unwrap()).unwrap();

        assert_eq!(cfg.ingest.url, "rtmp://ingest.example/app");
        assert_eq!(cfg.timing.tick_secs, 30);
        assert_eq!(cfg.timing.stagger_secs, 5);
    }

    #[test]
    fn test_destination_url_joins_key() {
        let mut cfg = Config::load("does/not/exist/loopcast").unwrap();
        assert_eq!(
            cfg.destination_url("abcd-1234"),
            "rtmp://a.rtmp.youtube.com/live2/abcd-1234"
        );

        cfg.ingest.url = "rtmp://ingest.example/live/".to_string();
        assert_eq!(cfg.destination_url("k"), "rtmp://ingest.example/live/k");
    }

    #[test]
    fn test_resolve_base_dir_prefers_primary() {
        let primary = TempDir::new().unwrap();
        let fallback = TempDir::new().unwrap();

        let resolved = resolve_base_dir(primary.path(), fallback.path());
        assert_eq!(resolved, primary.path());
    }

    #[test]
    fn test_resolve_base_dir_uses_fallback() {
        let fallback = TempDir::new().unwrap();
        let missing = fallback.path().join("missing");

        let resolved = resolve_base_dir(&missing, fallback.path());
        assert_eq!(resolved, fallback.path());
    }
}
