use anyhow::Result;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Tracker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    /// Time budget left after the interval currently being waited out
    Running { remaining: Duration },
    Finished,
}

/// One status tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// 1-based tick number
    pub number: usize,

    /// Remaining run time at the moment of the tick
    pub remaining: Duration,
}

impl Tick {
    pub fn remaining_minutes(&self) -> u64 {
        self.remaining.as_secs() / 60
    }
}

/// Counts a run duration down in fixed intervals
///
/// Emits `floor(duration / interval)` ticks, the first one immediately and
/// then one per interval. The sub-interval remainder is waited out without
/// a tick before the tracker reaches `Finished`.
#[derive(Debug)]
pub struct DurationTracker {
    state: TrackerState,
    interval: Duration,
    ticks: usize,
}

impl DurationTracker {
    pub fn new(duration: Duration, interval: Duration) -> Self {
        Self {
            state: TrackerState::Running {
                remaining: duration,
            },
            interval,
            ticks: 0,
        }
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn ticks(&self) -> usize {
        self.ticks
    }

    /// Advance by one interval, returning the tick to publish.
    ///
    /// Returns `None` once less than one full interval remains.
    pub fn next_tick(&mut self) -> Option<Tick> {
        let TrackerState::Running { remaining } = self.state else {
            return None;
        };

        if self.interval.is_zero() || remaining < self.interval {
            return None;
        }

        self.ticks += 1;
        self.state = TrackerState::Running {
            remaining: remaining - self.interval,
        };

        Some(Tick {
            number: self.ticks,
            remaining,
        })
    }

    /// Time left that is shorter than one interval.
    pub fn remainder(&self) -> Duration {
        match self.state {
            TrackerState::Running { remaining } if remaining < self.interval => remaining,
            TrackerState::Running { remaining } if self.interval.is_zero() => remaining,
            _ => Duration::ZERO,
        }
    }

    /// Run to completion, calling `on_tick` at every tick.
    ///
    /// Cancel-safe at every await point: dropping the future stops the countdown.
    pub async fn run<F, Fut>(&mut self, mut on_tick: F) -> Result<usize>
    where
        F: FnMut(Tick) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        while let Some(tick) = self.next_tick() {
            debug!(
                "Tick {}: {}s remaining",
                tick.number,
                tick.remaining.as_secs()
            );
            on_tick(tick).await?;
            tokio::time::sleep(self.interval).await;
        }

        let remainder = self.remainder();
        if !remainder.is_zero() {
            tokio::time::sleep(remainder).await;
        }

        self.state = TrackerState::Finished;
        Ok(self.ticks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    const MINUTE: Duration = Duration::from_secs(60);

    #[test]
    fn test_tick_count_is_floor_of_duration() {
        for (secs, expected) in [(360, 6), (90, 1), (60, 1), (59, 0), (0, 0), (3600, 60)] {
            let mut tracker = DurationTracker::new(Duration::from_secs(secs), MINUTE);
            let mut count = 0;
            while tracker.next_tick().is_some() {
                count += 1;
            }
            assert_eq!(count, expected, "duration {}s", secs);
        }
    }

    #[test]
    fn test_ticks_count_down_remaining_minutes() {
        let mut tracker = DurationTracker::new(Duration::from_secs(360), MINUTE);
        let minutes: Vec<u64> = std::iter::from_fn(|| tracker.next_tick())
            .map(|tick| tick.remaining_minutes())
            .collect();

        assert_eq!(minutes, vec![6, 5, 4, 3, 2, 1]);
        assert_eq!(
            tracker.state(),
            TrackerState::Running {
                remaining: Duration::ZERO
            }
        );
    }

    #[test]
    fn test_remainder_after_last_tick() {
        let mut tracker = DurationTracker::new(Duration::from_secs(150), MINUTE);
        assert_eq!(tracker.remainder(), Duration::ZERO);

        while tracker.next_tick().is_some() {}
        assert_eq!(tracker.ticks(), 2);
        assert_eq!(tracker.remainder(), Duration::from_secs(30));
    }

    #[test]
    fn test_zero_interval_never_ticks() {
        let mut tracker = DurationTracker::new(Duration::from_secs(10), Duration::ZERO);
        assert!(tracker.next_tick().is_none());
        assert_eq!(tracker.remainder(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_ticks_at_fixed_spacing() {
        let start = Instant::now();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let mut tracker = DurationTracker::new(Duration::from_secs(360), MINUTE);
        let ticks = tracker
            .run(|tick| {
                let seen = Arc::clone(&seen);
                async move {
                    seen.lock().unwrap().push((tick.number, start.elapsed().as_secs()));
                    Ok::<(), anyhow::Error>(())
                }
            })
            .await
            .unwrap();

        assert_eq!(ticks, 6);
        assert_eq!(tracker.state(), TrackerState::Finished);
        assert_eq!(start.elapsed(), Duration::from_secs(360));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![(1, 0), (2, 60), (3, 120), (4, 180), (5, 240), (6, 300)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_waits_out_remainder_without_tick() {
        let start = Instant::now();
        let mut tracker = DurationTracker::new(Duration::from_secs(45), MINUTE);

        let ticks = tracker.run(|_| async { Ok::<(), anyhow::Error>(()) }).await.unwrap();

        assert_eq!(ticks, 0);
        assert_eq!(start.elapsed(), Duration::from_secs(45));
        assert_eq!(tracker.state(), TrackerState::Finished);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_on_tick_error() {
        let mut tracker = DurationTracker::new(Duration::from_secs(300), MINUTE);

        let result = tracker
            .run(|tick| async move {
                if tick.number == 2 {
                    anyhow::bail!("disk full");
                }
                Ok::<(), anyhow::Error>(())
            })
            .await;

        assert!(result.is_err());
        assert_eq!(tracker.ticks(), 2);
        assert_ne!(tracker.state(), TrackerState::Finished);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_is_cancellable() {
        let mut tracker = DurationTracker::new(Duration::from_secs(3600), MINUTE);

        let finished = tokio::time::timeout(
            Duration::from_secs(150),
            tracker.run(|_| async { Ok::<(), anyhow::Error>(()) }),
        )
        .await;

        assert!(finished.is_err());
        assert_eq!(tracker.ticks(), 3);
    }
}
