use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::streams::StreamJob;

/// Append-only, timestamped per-session log file
///
/// Every write reopens the file in append mode. Clones share one write lock
/// so lines from the monitor and the tracker never interleave.
#[derive(Debug, Clone)]
pub struct SessionLog {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl SessionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// `<base_dir>/<video stem>_<YYYYmmdd_HHMMSS>_log.txt`
    pub fn for_job(base_dir: &Path, job: &StreamJob, started_at: DateTime<Local>) -> Self {
        let name = format!(
            "{}_{}_log.txt",
            job.video_stem(),
            started_at.format("%Y%m%d_%H%M%S")
        );
        Self::new(base_dir.join(name))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one timestamped record. Multi-line text becomes one record per line.
    pub async fn append(&self, text: &str) -> Result<()> {
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let mut buf = String::new();
        for line in text.lines() {
            buf.push_str(&format!("[{}] {}\n", stamp, line));
        }
        if buf.is_empty() {
            return Ok(());
        }

        let _guard = self.write_lock.lock().await;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open log file {}", self.path.display()))?;

        file.write_all(buf.as_bytes())
            .await
            .with_context(|| format!("Failed to write log file {}", self.path.display()))?;
        file.flush().await?;

        Ok(())
    }
}
