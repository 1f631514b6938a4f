//! Fan-out of stream jobs into supervised sessions

use futures::future::join_all;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::encoder::{AudioProbe, FfprobeAudioProbe};
use crate::session::{SessionConfig, SessionOutcome, SessionReport, StreamSession};
use crate::shutdown::Shutdown;
use crate::status::{spawn_renderer, StatusBoard};
use crate::streams::StreamJob;

/// Results of a whole run
#[derive(Debug, Default)]
pub struct RunSummary {
    /// One report per session that ran, in list order
    pub reports: Vec<SessionReport>,

    /// Sessions whose task panicked
    pub panicked: usize,

    /// Jobs never launched because of an interrupt during the stagger
    pub not_started: usize,
}

impl RunSummary {
    pub fn completed(&self) -> usize {
        self.count(|outcome| matches!(outcome, SessionOutcome::Completed { .. }))
    }

    pub fn abandoned(&self) -> usize {
        self.count(|outcome| matches!(outcome, SessionOutcome::Abandoned { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, SessionOutcome::Failed { .. })) + self.panicked
    }

    fn count(&self, pred: impl Fn(&SessionOutcome) -> bool) -> usize {
        self.reports.iter().filter(|r| pred(&r.outcome)).count()
    }
}

pub struct Orchestrator {
    session_config: Arc<SessionConfig>,
    probe: Arc<dyn AudioProbe>,
    board: StatusBoard,
    stagger: Duration,
    shutdown: Shutdown,
}

impl Orchestrator {
    pub fn new(
        session_config: SessionConfig,
        probe: Arc<dyn AudioProbe>,
        stagger: Duration,
    ) -> Self {
        Self {
            session_config: Arc::new(session_config),
            probe,
            board: StatusBoard::new(),
            stagger,
            shutdown: Shutdown::new(),
        }
    }

    pub fn from_config(config: &Config, base_dir: PathBuf) -> Self {
        let probe = Arc::new(FfprobeAudioProbe::new(config.encoder.probe_binary.clone()));
        Self::new(
            SessionConfig::from_config(config, base_dir),
            probe,
            config.timing.stagger(),
        )
    }

    /// Handle used to interrupt the run.
    pub fn shutdown(&self) -> Shutdown {
        self.shutdown.clone()
    }

    pub fn board(&self) -> StatusBoard {
        self.board.clone()
    }

    /// Run every job as its own session, launching them `stagger` apart, and
    /// wait until all of them have finished their full lifecycle.
    pub async fn run_all(&self, jobs: Vec<StreamJob>) -> RunSummary {
        let total = jobs.len();
        let mut summary = RunSummary::default();
        if total == 0 {
            info!("No stream jobs to run");
            return summary;
        }

        info!("Running {} stream sessions", total);

        let render_stop = Shutdown::new();
        let renderer = spawn_renderer(
            self.board.clone(),
            self.session_config.tick_interval,
            render_stop.listen(),
            std::io::stdout(),
        );

        let mut interrupt = self.shutdown.listen();
        let mut handles = Vec::with_capacity(total);

        for (n, job) in jobs.into_iter().enumerate() {
            if n > 0 {
                tokio::select! {
                    _ = tokio::time::sleep(self.stagger) => {}
                    _ = interrupt.wait() => {
                        summary.not_started = total - n;
                        warn!("Interrupted, {} streams not started", summary.not_started);
                        break;
                    }
                }
            } else if interrupt.in_progress() {
                summary.not_started = total;
                break;
            }

            let video_file = job.video_file.clone();
            let session = StreamSession::new(
                job,
                Arc::clone(&self.session_config),
                Arc::clone(&self.probe),
                self.board.clone(),
            );
            handles.push((video_file, tokio::spawn(session.run(self.shutdown.listen()))));
        }

        let (videos, tasks): (Vec<_>, Vec<_>) = handles.into_iter().unzip();
        for (video_file, result) in videos.into_iter().zip(join_all(tasks).await) {
            match result {
                Ok(report) => summary.reports.push(report),
                Err(e) => {
                    error!("Session for {} panicked: {}", video_file, e);
                    eprintln!("[✘] {}: session crashed", video_file);
                    summary.panicked += 1;
                }
            }
        }

        render_stop.trigger();
        if let Err(e) = renderer.await {
            warn!("Status renderer panicked: {}", e);
        }

        info!(
            "All sessions finished: {} completed, {} abandoned, {} failed",
            summary.completed(),
            summary.abandoned(),
            summary.failed()
        );

        summary
    }
}
