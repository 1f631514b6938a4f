use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

/// One `video_filename:stream_key` line of the stream list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEntry {
    pub video_file: String,
    pub stream_key: String,
}

/// Parse stream list contents.
///
/// Lines without a `:` are skipped silently. The line is split on the first
/// `:` only, so stream keys may themselves contain colons.
pub fn parse_stream_list(contents: &str) -> Vec<StreamEntry> {
    contents
        .lines()
        .filter_map(|line| {
            let (video, key) = line.trim().split_once(':')?;
            Some(StreamEntry {
                video_file: video.trim().to_string(),
                stream_key: key.trim().to_string(),
            })
        })
        .collect()
}

/// Read and parse the stream list file.
pub fn read_stream_list(path: impl AsRef<Path>) -> Result<Vec<StreamEntry>> {
    let path = path.as_ref();
    debug!("Reading stream list: {}", path.display());

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read stream list {}", path.display()))?;

    let entries = parse_stream_list(&contents);
    info!("Loaded {} stream entries from {}", entries.len(), path.display());

    Ok(entries)
}
