//! Rolling call-outcome statistics.

use derive_getters::Getters;
use serde::Serialize;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

/// Outcome of one call through a breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum CallOutcome {
    /// The wrapped operation completed successfully.
    Success,
    /// The wrapped operation returned an error.
    Failure,
    /// The wrapped operation exceeded the timeout budget.
    Timeout,
    /// The call was rejected without invoking the operation.
    Rejection,
}

/// Trailing window of call outcomes.
///
/// Outcomes older than the window duration are pruned on every record and
/// snapshot, so the stats reset implicitly as time passes rather than via an
/// explicit reset event.
#[derive(Debug)]
pub struct RollingStats {
    window: Duration,
    entries: VecDeque<(Instant, CallOutcome)>,
}

impl RollingStats {
    /// Creates an empty window of the given duration.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            entries: VecDeque::new(),
        }
    }

    /// Records one call outcome at the current instant.
    pub fn record(&mut self, outcome: CallOutcome) {
        self.prune();
        self.entries.push_back((Instant::now(), outcome));
    }

    /// Discards every recorded outcome.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Current counts within the window.
    pub fn snapshot(&mut self) -> StatsSnapshot {
        self.prune();
        let mut snapshot = StatsSnapshot::default();
        for (_, outcome) in &self.entries {
            match outcome {
                CallOutcome::Success => snapshot.successes += 1,
                CallOutcome::Failure => snapshot.failures += 1,
                CallOutcome::Timeout => snapshot.timeouts += 1,
                CallOutcome::Rejection => snapshot.rejections += 1,
            }
        }
        snapshot
    }

    fn prune(&mut self) {
        let Some(cutoff) = Instant::now().checked_sub(self.window) else {
            return;
        };
        while let Some((recorded, _)) = self.entries.front() {
            if *recorded < cutoff {
                self.entries.pop_front();
            } else {
                break;
            }
        }
    }
}

/// Counts of call outcomes within the rolling window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Getters)]
pub struct StatsSnapshot {
    /// Successful calls
    successes: u64,
    /// Failed calls
    failures: u64,
    /// Timed-out calls
    timeouts: u64,
    /// Fail-fast rejections (the operation was never invoked)
    rejections: u64,
}

impl StatsSnapshot {
    /// Attempts that actually reached the dependency.
    ///
    /// Rejections are excluded; a rejected call says nothing about the
    /// dependency's health.
    pub fn total(&self) -> u64 {
        self.successes + self.failures + self.timeouts
    }

    /// Failure percentage among attempts that reached the dependency.
    ///
    /// Timeouts count as failures. Returns 0.0 for an empty window.
    pub fn failure_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.failures + self.timeouts) as f64 * 100.0 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn snapshot_counts_outcomes() {
        let mut stats = RollingStats::new(Duration::from_secs(60));
        stats.record(CallOutcome::Success);
        stats.record(CallOutcome::Failure);
        stats.record(CallOutcome::Timeout);
        stats.record(CallOutcome::Rejection);

        let snapshot = stats.snapshot();
        assert_eq!(*snapshot.successes(), 1);
        assert_eq!(*snapshot.failures(), 1);
        assert_eq!(*snapshot.timeouts(), 1);
        assert_eq!(*snapshot.rejections(), 1);
        assert_eq!(snapshot.total(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_rate_excludes_rejections() {
        let mut stats = RollingStats::new(Duration::from_secs(60));
        stats.record(CallOutcome::Success);
        stats.record(CallOutcome::Failure);
        stats.record(CallOutcome::Rejection);
        stats.record(CallOutcome::Rejection);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.failure_rate(), 50.0);
    }

    #[tokio::test(start_paused = true)]
    async fn outcomes_age_out_of_the_window() {
        let mut stats = RollingStats::new(Duration::from_secs(10));
        stats.record(CallOutcome::Failure);

        tokio::time::sleep(Duration::from_secs(11)).await;
        stats.record(CallOutcome::Success);

        let snapshot = stats.snapshot();
        assert_eq!(*snapshot.failures(), 0);
        assert_eq!(*snapshot.successes(), 1);
    }

    #[test]
    fn empty_window_has_zero_rate() {
        let mut stats = RollingStats::new(Duration::from_secs(60));
        assert_eq!(stats.snapshot().failure_rate(), 0.0);
    }
}
