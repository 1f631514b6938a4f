// Integration tests for the session orchestrator
//
// These run on tokio's paused clock: ticks, stagger delays and grace periods
// elapse virtually while the stand-in encoders are real processes.

#![cfg(unix)]

mod common;

use anyhow::Result;
use common::*;
use loopcast::{EndReason, Orchestrator, SessionOutcome};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const MINUTE: Duration = Duration::from_secs(60);

fn orchestrator(temp_dir: &TempDir, encoder_body: &str, stagger: Duration) -> Orchestrator {
    let encoder = write_script(temp_dir.path(), "encoder", encoder_body);
    Orchestrator::new(
        session_config(temp_dir.path(), &encoder, MINUTE, Duration::from_secs(10)),
        Arc::new(FixedProbe(false)),
        stagger,
    )
}

#[tokio::test(start_paused = true)]
async fn test_two_streams_for_six_minutes() -> Result<()> {
    let temp_dir = TempDir::new()?;
    touch_video(temp_dir.path(), "a.mp4");
    touch_video(temp_dir.path(), "b.mp4");

    let orchestrator = orchestrator(&temp_dir, LONG_RUNNING, Duration::from_secs(5));
    // 0.1 hours
    let jobs = vec![job(0, "a.mp4", 360), job(1, "b.mp4", 360)];

    let summary = orchestrator.run_all(jobs).await;

    assert_eq!(summary.reports.len(), 2);
    assert_eq!(summary.completed(), 2);
    assert_eq!(summary.not_started, 0);

    for report in &summary.reports {
        assert_eq!(report.ticks, 6, "{}", report.video_file);
        match &report.outcome {
            SessionOutcome::Completed { end, .. } => assert_eq!(*end, EndReason::DurationElapsed),
            other => panic!("unexpected outcome: {:?}", other),
        }

        let log = read_log(report.log_path.as_deref().unwrap());
        assert_eq!(count_status_lines(&log), 6, "{}", report.video_file);
    }

    let first = &summary.reports[0];
    let second = &summary.reports[1];
    assert_eq!(first.video_file, "a.mp4");
    assert_eq!(second.video_file, "b.mp4");
    assert!(second.launched_at.duration_since(first.launched_at) >= Duration::from_secs(5));

    assert!(orchestrator.board().is_empty().await);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_launches_are_staggered() -> Result<()> {
    let temp_dir = TempDir::new()?;
    for video in ["a.mp4", "b.mp4", "c.mp4"] {
        touch_video(temp_dir.path(), video);
    }

    let orchestrator = orchestrator(&temp_dir, LONG_RUNNING, Duration::from_secs(5));
    let jobs = vec![job(0, "a.mp4", 60), job(1, "b.mp4", 60), job(2, "c.mp4", 60)];

    let summary = orchestrator.run_all(jobs).await;
    assert_eq!(summary.reports.len(), 3);

    let first = summary.reports[0].launched_at;
    for (n, report) in summary.reports.iter().enumerate() {
        assert_eq!(report.job_index, n);
        assert!(report.launched_at.duration_since(first) >= Duration::from_secs(5 * n as u64));
    }

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_missing_video_does_not_affect_siblings() -> Result<()> {
    let temp_dir = TempDir::new()?;
    touch_video(temp_dir.path(), "a.mp4");

    let orchestrator = orchestrator(&temp_dir, LONG_RUNNING, Duration::from_secs(5));
    let jobs = vec![job(0, "missing.mp4", 120), job(1, "a.mp4", 120)];

    let summary = orchestrator.run_all(jobs).await;

    assert_eq!(summary.reports.len(), 2);
    assert_eq!(summary.abandoned(), 1);
    assert_eq!(summary.completed(), 1);
    assert_eq!(summary.reports[1].ticks, 2);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_interrupt_during_stagger_skips_remaining_jobs() -> Result<()> {
    let temp_dir = TempDir::new()?;
    for video in ["a.mp4", "b.mp4", "c.mp4"] {
        touch_video(temp_dir.path(), video);
    }

    let orchestrator = orchestrator(&temp_dir, LONG_RUNNING, Duration::from_secs(30));
    let shutdown = orchestrator.shutdown();
    let trigger = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        shutdown.trigger();
    });

    let jobs = vec![job(0, "a.mp4", 3600), job(1, "b.mp4", 3600), job(2, "c.mp4", 3600)];
    let summary = orchestrator.run_all(jobs).await;
    trigger.await?;

    assert_eq!(summary.not_started, 2);
    assert_eq!(summary.reports.len(), 1);
    match &summary.reports[0].outcome {
        SessionOutcome::Completed { end, .. } => assert_eq!(*end, EndReason::Interrupted),
        other => panic!("unexpected outcome: {:?}", other),
    }

    Ok(())
}

#[tokio::test]
async fn test_no_jobs_no_sessions() {
    let temp_dir = TempDir::new().unwrap();
    let orchestrator = orchestrator(&temp_dir, LONG_RUNNING, Duration::from_secs(5));

    let summary = orchestrator.run_all(Vec::new()).await;

    assert!(summary.reports.is_empty());
    assert_eq!(summary.completed(), 0);
    assert_eq!(summary.not_started, 0);
}
