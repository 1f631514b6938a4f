use std::path::{Path, PathBuf};

use super::list::StreamEntry;
use crate::config::Config;
use crate::status::StatusKey;

/// A single stream to run: one video file re-streamed to one destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamJob {
    /// Position in the stream list, used to keep status entries unique
    pub index: usize,

    /// Video file name, relative to the base directory
    pub video_file: String,

    pub stream_key: String,

    /// Full ingestion URL (`<ingest url>/<stream key>`)
    pub destination_url: String,

    /// How long to keep the stream running
    pub duration_seconds: u64,
}

impl StreamJob {
    pub fn new(
        index: usize,
        entry: StreamEntry,
        destination_url: String,
        duration_seconds: u64,
    ) -> Self {
        Self {
            index,
            video_file: entry.video_file,
            stream_key: entry.stream_key,
            destination_url,
            duration_seconds,
        }
    }

    /// Build one job per entry, in list order.
    pub fn from_entries(
        entries: Vec<StreamEntry>,
        config: &Config,
        duration_seconds: u64,
    ) -> Vec<StreamJob> {
        entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                let url = config.destination_url(&entry.stream_key);
                StreamJob::new(index, entry, url, duration_seconds)
            })
            .collect()
    }

    /// Absolute path of the video file under `base_dir`.
    pub fn video_path(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.video_file)
    }

    /// File stem of the video, used to name the session log.
    pub fn video_stem(&self) -> String {
        Path::new(&self.video_file)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.video_file.clone())
    }

    /// Key under which this job's status is published.
    pub fn status_key(&self) -> StatusKey {
        StatusKey {
            index: self.index,
            video_file: self.video_file.clone(),
        }
    }
}
