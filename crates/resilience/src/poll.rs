// crates/resilience/src/poll.rs
//! Bounded polling for conditions that are observed rather than awaited

use crate::error::{ResilienceError, ResilienceResult};
use std::time::Duration;

/// How long to poll and how often
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    budget: Duration,
    interval: Duration,
}

impl PollPolicy {
    /// Creates a policy polling every `interval` for at most `budget`
    pub fn new(budget: Duration, interval: Duration) -> Self {
        Self {
            budget,
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of sleeps the budget allows, at least one
    pub fn max_polls(&self) -> usize {
        let polls = self.budget.as_millis() / self.interval.as_millis();
        (polls as usize).max(1)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(2), Duration::from_millis(100))
    }
}

/// Sleeps in `policy.interval()` steps until `condition` returns true.
///
/// The condition is checked before the first sleep, so an already-true
/// condition returns immediately. Returns the number of sleeps taken.
pub async fn poll_until<F>(policy: PollPolicy, mut condition: F) -> ResilienceResult<usize>
where
    F: FnMut() -> bool,
{
    if condition() {
        return Ok(0);
    }

    let max_polls = policy.max_polls();
    for attempt in 1..=max_polls {
        tokio::time::sleep(policy.interval()).await;
        if condition() {
            return Ok(attempt);
        }
    }

    Err(ResilienceError::PollExhausted {
        attempts: max_polls,
        budget: policy.budget(),
    })
}
