//! Throughput and ETA tracking

use std::time::Duration;
use tokio::time::Instant;

/// Progress after one completed batch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    pub completed: usize,
    pub total: usize,
    pub batches_per_minute: f64,
    pub eta: Duration,
}

/// Counts completed batches against the run's start time
///
/// Uses tokio's clock so paused-time tests see virtual durations.
#[derive(Debug)]
pub struct ProgressTracker {
    started: Instant,
    total: usize,
    completed: usize,
}

impl ProgressTracker {
    pub fn new(total: usize) -> Self {
        Self {
            started: Instant::now(),
            total,
            completed: 0,
        }
    }

    /// Record one finished batch and return the updated figures
    pub fn record_batch(&mut self) -> ProgressSnapshot {
        self.completed += 1;
        snapshot(self.completed, self.total, self.started.elapsed())
    }
}

/// Rate and remaining time for `completed` of `total` batches after `elapsed`
pub fn snapshot(completed: usize, total: usize, elapsed: Duration) -> ProgressSnapshot {
    let minutes = elapsed.as_secs_f64() / 60.0;
    let batches_per_minute = if minutes > 0.0 {
        completed as f64 / minutes
    } else {
        0.0
    };

    let remaining = total.saturating_sub(completed);
    let eta = if batches_per_minute > 0.0 {
        Duration::from_secs_f64(remaining as f64 / batches_per_minute * 60.0)
    } else {
        Duration::ZERO
    };

    ProgressSnapshot {
        completed,
        total,
        batches_per_minute,
        eta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_rate_and_eta() {
        let snap = snapshot(2, 10, Duration::from_secs(60));
        assert!((snap.batches_per_minute - 2.0).abs() < f64::EPSILON);
        assert_eq!(snap.eta, Duration::from_secs(240));
    }

    #[test]
    fn test_snapshot_zero_elapsed() {
        let snap = snapshot(1, 3, Duration::ZERO);
        assert_eq!(snap.batches_per_minute, 0.0);
        assert_eq!(snap.eta, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tracker_uses_virtual_clock() {
        let mut tracker = ProgressTracker::new(3);
        tokio::time::sleep(Duration::from_secs(30)).await;
        let snap = tracker.record_batch();
        assert_eq!(snap.completed, 1);
        assert!((snap.batches_per_minute - 2.0).abs() < 1e-9);
        assert_eq!(snap.eta, Duration::from_secs(60));
    }
}
