use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Status map key: list position plus video file, so two jobs streaming the
/// same file stay distinct
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StatusKey {
    pub index: usize,
    pub video_file: String,
}

impl fmt::Display for StatusKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.index, self.video_file)
    }
}

/// Latest published status of one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub video_file: String,
    pub remaining_minutes: u64,
}

/// Status of all active sessions
///
/// Each session's tracker is the only writer of its own entry; the renderer
/// only reads. The lock is held for single map operations only.
#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    entries: Arc<Mutex<BTreeMap<StatusKey, SessionStatus>>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn update(&self, key: StatusKey, status: SessionStatus) {
        self.entries.lock().await.insert(key, status);
    }

    pub async fn remove(&self, key: &StatusKey) -> Option<SessionStatus> {
        self.entries.lock().await.remove(key)
    }

    pub async fn get(&self, key: &StatusKey) -> Option<SessionStatus> {
        self.entries.lock().await.get(key).cloned()
    }

    /// Copy of all entries, ordered by list position.
    pub async fn snapshot(&self) -> Vec<(StatusKey, SessionStatus)> {
        let entries = self.entries.lock().await;
        entries
            .iter()
            .map(|(key, status)| (key.clone(), status.clone()))
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
