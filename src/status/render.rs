use std::io::Write;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use super::board::{SessionStatus, StatusBoard, StatusKey};
use crate::shutdown::ShutdownListener;

/// Render the consolidated view of all active sessions.
pub fn render_board(entries: &[(StatusKey, SessionStatus)]) -> String {
    if entries.is_empty() {
        return "[♥] No active streams".to_string();
    }

    let mut out = format!("[♥] Active streams: {}", entries.len());
    for (_, status) in entries {
        out.push_str(&format!(
            "\n    {} | Remaining: {} min",
            status.video_file, status.remaining_minutes
        ));
    }
    out
}

/// Write the board to `out` every `period` until `stop` fires.
///
/// Nothing is written while no session is active.
pub fn spawn_renderer<W>(
    board: StatusBoard,
    period: Duration,
    mut stop: ShutdownListener,
    mut out: W,
) -> JoinHandle<()>
where
    W: Write + Send + 'static,
{
    tokio::spawn(async move {
        if period.is_zero() {
            stop.wait().await;
            return;
        }

        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let snapshot = board.snapshot().await;
                    if snapshot.is_empty() {
                        continue;
                    }
                    let written = writeln!(out, "{}", render_board(&snapshot))
                        .and_then(|_| out.flush());
                    if let Err(e) = written {
                        warn!("Failed to write status board: {}", e);
                    }
                }
                _ = stop.wait() => break,
            }
        }

        debug!("Status renderer stopped");
    })
}
