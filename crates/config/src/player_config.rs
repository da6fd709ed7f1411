//! Player configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};

/// Transport timings and session lifetime
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    /// How long a voice connect may take before giving up
    pub connect_timeout_secs: u64,

    /// How long play() waits for the previous source to report its stop
    pub stop_wait_ms: u64,

    /// Poll interval while waiting for that stop
    pub stop_poll_interval_ms: u64,

    /// Period of the progress reporter
    pub progress_interval_secs: u64,

    /// Step used by the rewind/forward controls
    pub scrub_step_secs: u64,

    /// Sessions neither playing nor touched for this long are closed (0 = never)
    pub idle_timeout_secs: u64,

    /// Connect attempts made when resuming after the voice link dropped
    pub resume_reconnect_attempts: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 20,
            stop_wait_ms: 2000,
            stop_poll_interval_ms: 100,
            progress_interval_secs: 5,
            scrub_step_secs: 30,
            idle_timeout_secs: 1800,
            resume_reconnect_attempts: 2,
        }
    }
}

impl ConfigSection for PlayerConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut results = vec![
            Validator::in_range(self.connect_timeout_secs, 1, 120, "player.connect_timeout_secs"),
            Validator::in_range(self.stop_wait_ms, 100, 30_000, "player.stop_wait_ms"),
            Validator::in_range(
                self.stop_poll_interval_ms,
                10,
                1000,
                "player.stop_poll_interval_ms",
            ),
            Validator::in_range(
                self.progress_interval_secs,
                1,
                300,
                "player.progress_interval_secs",
            ),
            Validator::in_range(self.scrub_step_secs, 1, 3600, "player.scrub_step_secs"),
            Validator::in_range(
                self.resume_reconnect_attempts,
                1,
                10,
                "player.resume_reconnect_attempts",
            ),
        ];

        if self.stop_poll_interval_ms > self.stop_wait_ms {
            results.push(Err(ValidationError::with_value(
                "player.stop_poll_interval_ms",
                "must not exceed player.stop_wait_ms",
                self.stop_poll_interval_ms,
            )));
        }

        Validator::collect_errors(results)
    }

    fn merge(&mut self, other: Self) {
        self.connect_timeout_secs = other.connect_timeout_secs;
        self.stop_wait_ms = other.stop_wait_ms;
        self.stop_poll_interval_ms = other.stop_poll_interval_ms;
        self.progress_interval_secs = other.progress_interval_secs;
        self.scrub_step_secs = other.scrub_step_secs;
        self.idle_timeout_secs = other.idle_timeout_secs;
        self.resume_reconnect_attempts = other.resume_reconnect_attempts;
    }

    fn section_name(&self) -> &'static str {
        "player"
    }
}
