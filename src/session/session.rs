use super::config::SessionConfig;
use super::log::SessionLog;
use super::monitor::{monitor, MonitorSummary};
use super::stats::{EndReason, SessionOutcome, SessionReport};
use super::tracker::{DurationTracker, Tick};
use crate::encoder::{AudioProbe, EncoderHandle, ExitOutcome};
use crate::shutdown::ShutdownListener;
use crate::status::{SessionStatus, StatusBoard};
use crate::streams::StreamJob;
use anyhow::{anyhow, Result};
use chrono::{DateTime, Local};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout, Instant};
use tracing::{error, info, warn};

/// One supervised stream: encoder, output monitor and duration tracker
pub struct StreamSession {
    job: StreamJob,

    config: Arc<SessionConfig>,

    probe: Arc<dyn AudioProbe>,

    /// Shared status of all sessions; this session writes only its own entry
    board: StatusBoard,
}

impl StreamSession {
    pub fn new(
        job: StreamJob,
        config: Arc<SessionConfig>,
        probe: Arc<dyn AudioProbe>,
        board: StatusBoard,
    ) -> Self {
        Self {
            job,
            config,
            probe,
            board,
        }
    }

    pub fn job(&self) -> &StreamJob {
        &self.job
    }

    /// Run the full supervised lifecycle.
    ///
    /// The wait ends on whichever comes first: the duration elapsing, the
    /// encoder exiting on its own, or `shutdown`. The encoder is then stopped
    /// and reaped and the output monitor drained before returning. Errors
    /// never escape; they end up in the report and the session log.
    pub async fn run(self, mut shutdown: ShutdownListener) -> SessionReport {
        let started_at = Local::now();
        let launched_at = Instant::now();
        let job = &self.job;

        info!(
            "Starting session {} for {} ({}s)",
            job.index, job.video_file, job.duration_seconds
        );

        let mut handle = match EncoderHandle::launch(
            job,
            &self.config.base_dir,
            &self.config.encoder,
            self.probe.as_ref(),
        )
        .await
        {
            Ok(handle) => handle,
            Err(e) => {
                eprintln!("[✘] {}: {}", job.video_file, e);
                error!("Session for {} abandoned: {}", job.video_file, e);
                return self.report(
                    started_at,
                    launched_at,
                    None,
                    0,
                    SessionOutcome::Abandoned {
                        reason: e.to_string(),
                    },
                );
            }
        };

        println!(
            "[▶] Starting stream: {} -> {}",
            job.video_file, job.destination_url
        );

        let mut failure: Option<anyhow::Error> = None;

        let log = SessionLog::for_job(&self.config.base_dir, job, started_at);
        record(
            &mut failure,
            log.append(&format!(
                "[▶] Starting stream: {} -> {}",
                job.video_file, job.destination_url
            ))
            .await,
        );
        let mut monitor_task = handle
            .take_stderr()
            .map(|stderr| tokio::spawn(monitor(stderr, log.clone())));

        let key = job.status_key();
        let mut tracker = DurationTracker::new(
            Duration::from_secs(job.duration_seconds),
            self.config.tick_interval,
        );

        let end = tokio::select! {
            result = tracker.run(|tick| self.publish_tick(&log, tick)) => match result {
                Ok(ticks) => {
                    info!("{} reached its duration after {} ticks", job.video_file, ticks);
                    EndReason::DurationElapsed
                }
                Err(e) => {
                    error!("Duration tracking for {} failed: {:#}", job.video_file, e);
                    failure = Some(e);
                    EndReason::Error
                }
            },
            exited = handle.wait_exit() => {
                match exited {
                    Ok(status) => warn!("Encoder for {} exited early with {}", job.video_file, status),
                    Err(e) => warn!("Lost track of encoder for {}: {}", job.video_file, e),
                }
                EndReason::EncoderExited
            }
            _ = shutdown.wait() => EndReason::Interrupted,
        };

        self.board.remove(&key).await;

        match end {
            EndReason::Interrupted => {
                println!("[✋] Streaming stopped by user: {}", job.video_file);
                record(
                    &mut failure,
                    log.append("[✋] streaming stopped by user (interrupt)").await,
                );
            }
            EndReason::EncoderExited => {
                record(
                    &mut failure,
                    log.append("[!!] encoder exited before the run duration elapsed")
                        .await,
                );
            }
            EndReason::DurationElapsed | EndReason::Error => {}
        }

        let exit = match handle.stop(self.config.stop_grace).await {
            Ok(exit) => Some(exit),
            Err(e) => {
                error!("Failed to stop encoder for {}: {}", job.video_file, e);
                record(&mut failure, Err(e.into()));
                None
            }
        };

        let summary = match monitor_task.as_mut() {
            Some(task) => match timeout(self.config.drain_timeout, &mut *task).await {
                Ok(Ok(summary)) => summary,
                Ok(Err(e)) => {
                    warn!("Output monitor for {} panicked: {}", job.video_file, e);
                    MonitorSummary::default()
                }
                Err(_) => {
                    // Something else still holds the encoder's stderr open
                    warn!(
                        "Encoder output for {} still open after {:?}, abandoning monitor",
                        job.video_file, self.config.drain_timeout
                    );
                    task.abort();
                    MonitorSummary::default()
                }
            },
            None => MonitorSummary::default(),
        };
        if let Some(e) = &summary.log_error {
            record(&mut failure, Err(anyhow!("writing encoder warnings: {}", e)));
        }

        if let Some(exit) = &exit {
            record(&mut failure, self.log_exit(&log, exit, &summary).await);
        }

        let outcome = match (failure, exit) {
            (None, Some(exit)) => {
                println!("[✔] Live streaming finished: {}", job.video_file);
                SessionOutcome::Completed { end, exit }
            }
            (failure, exit) => {
                let error = failure
                    .map(|e| format!("{:#}", e))
                    .unwrap_or_else(|| "encoder stop failed".to_string());
                // Best effort: the log itself may be what failed
                let _ = log.append(&format!("[!!] unexpected error: {}", error)).await;
                eprintln!("[✘] {}: {}", job.video_file, error);
                SessionOutcome::Failed { error, exit }
            }
        };

        let ticks = tracker.ticks();
        self.report(
            started_at,
            launched_at,
            Some(log.path().to_path_buf()),
            ticks,
            outcome,
        )
    }

    async fn publish_tick(&self, log: &SessionLog, tick: Tick) -> Result<()> {
        let minutes = tick.remaining_minutes();

        self.board
            .update(
                self.job.status_key(),
                SessionStatus {
                    video_file: self.job.video_file.clone(),
                    remaining_minutes: minutes,
                },
            )
            .await;

        log.append(&format!(
            "[♥] Streaming: {} | Remaining: {} min",
            self.job.video_file, minutes
        ))
        .await
    }

    async fn log_exit(
        &self,
        log: &SessionLog,
        exit: &ExitOutcome,
        summary: &MonitorSummary,
    ) -> Result<()> {
        if exit.forced_kill {
            warn!("Encoder for {} had to be killed", self.job.video_file);
            log.append("[!!] encoder did not terminate gracefully, forced kill")
                .await?;
        }

        if !exit.success() {
            info!(
                "Encoder for {} exited with {}",
                self.job.video_file,
                exit.describe()
            );
            let mut text = format!("[!!] encoder exited with {}", exit.describe());
            for line in &summary.tail {
                text.push('\n');
                text.push_str(line);
            }
            log.append(&text).await?;
        }

        Ok(())
    }

    fn report(
        &self,
        started_at: DateTime<Local>,
        launched_at: Instant,
        log_path: Option<std::path::PathBuf>,
        ticks: usize,
        outcome: SessionOutcome,
    ) -> SessionReport {
        SessionReport {
            job_index: self.job.index,
            video_file: self.job.video_file.clone(),
            log_path,
            started_at,
            launched_at,
            finished_at: Local::now(),
            ticks,
            outcome,
        }
    }
}

/// Keep the first error of a session.
fn record(failure: &mut Option<anyhow::Error>, result: Result<()>) {
    if let Err(e) = result {
        warn!("Session error: {:#}", e);
        if failure.is_none() {
            *failure = Some(e);
        }
    }
}
