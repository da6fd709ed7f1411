//! Runtime settings for the transport controller

use chaptercast_config::{Config, PlayerConfig};
use chaptercast_resilience::{PollPolicy, RetryPolicy};
use std::path::PathBuf;
use std::time::Duration;

/// Timings and switches the transport controller runs with
#[derive(Debug, Clone)]
pub struct TransportSettings {
    /// Upper bound on a voice connect
    pub connect_timeout: Duration,
    /// How play() waits for the previous source to report its stop
    pub stop_wait: PollPolicy,
    /// Period of the progress reporter
    pub progress_interval: Duration,
    /// Step of the rewind/forward controls
    pub scrub_step: Duration,
    /// Idle sessions are evicted after this; `None` keeps them forever
    pub idle_timeout: Option<Duration>,
    /// Reconnect attempts when resuming on a dropped link
    pub resume_reconnect: RetryPolicy,
    /// Whether to publish presence text
    pub presence_enabled: bool,
    /// Library root scanned by open_player
    pub library_root: PathBuf,
}

impl TransportSettings {
    pub fn from_config(config: &Config) -> Self {
        let mut settings = Self::from(&config.player);
        settings.presence_enabled = config.app.presence_enabled;
        settings.library_root = config.library.root.clone();
        settings
    }

    pub fn with_library_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.library_root = root.into();
        self
    }

    pub fn with_presence(mut self, enabled: bool) -> Self {
        self.presence_enabled = enabled;
        self
    }
}

impl From<&PlayerConfig> for TransportSettings {
    fn from(config: &PlayerConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            stop_wait: PollPolicy::new(
                Duration::from_millis(config.stop_wait_ms),
                Duration::from_millis(config.stop_poll_interval_ms),
            ),
            progress_interval: Duration::from_secs(config.progress_interval_secs.max(1)),
            scrub_step: Duration::from_secs(config.scrub_step_secs),
            idle_timeout: (config.idle_timeout_secs > 0)
                .then(|| Duration::from_secs(config.idle_timeout_secs)),
            resume_reconnect: RetryPolicy::new(config.resume_reconnect_attempts as usize)
                .with_initial_delay(Duration::from_millis(500)),
            presence_enabled: true,
            library_root: PathBuf::from("audiobooks"),
        }
    }
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self::from(&PlayerConfig::default())
    }
}
