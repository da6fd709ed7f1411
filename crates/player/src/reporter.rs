//! Periodic status updates while a room plays

use crate::render::render;
use crate::room::RoomSession;
use chaptercast_core::{MessageHandle, Notifier, StatusView};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::time::Instant;

/// Result of one reporter pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Updated { edited: usize, pruned: usize },
    /// Nothing plays (or the session is gone)
    Idle,
}

/// Edits every tracked status message of one room on a fixed period
pub struct ProgressReporter {
    room: Weak<RoomSession>,
    notifier: Arc<dyn Notifier>,
    interval: Duration,
}

impl ProgressReporter {
    pub fn new(room: &Arc<RoomSession>, notifier: Arc<dyn Notifier>, interval: Duration) -> Self {
        Self {
            room: Arc::downgrade(room),
            notifier,
            interval,
        }
    }

    /// Renders the session at `now` and pushes it to every tracked handle
    pub async fn tick(&self, now: Instant) -> Tick {
        let Some(room) = self.room.upgrade() else {
            return Tick::Idle;
        };
        let view = room.with_state(|s| s.is_playing().then(|| render(s, now)));
        match view {
            Some(view) => {
                let (edited, pruned) = publish(&room, self.notifier.as_ref(), &view).await;
                Tick::Updated { edited, pruned }
            }
            None => Tick::Idle,
        }
    }

    /// Ticks until the room stops playing. `id` is the reporter slot token.
    pub(crate) async fn run(self, id: u64) {
        loop {
            if self.tick(Instant::now()).await == Tick::Idle {
                match self.room.upgrade() {
                    Some(room) if !room.retire_reporter(id) => {}
                    _ => break,
                }
            }
            tokio::time::sleep(self.interval).await;
        }
        log::debug!("progress reporter {} exited", id);
    }

    /// Starts the reporter for `room` unless one is already running
    pub(crate) fn ensure_running(room: &Arc<RoomSession>, notifier: &Arc<dyn Notifier>, interval: Duration) {
        let started = room.start_reporter(|id| {
            let reporter = ProgressReporter::new(room, Arc::clone(notifier), interval);
            tokio::spawn(reporter.run(id))
        });
        if started {
            log::debug!("{}: progress reporter started", room.room());
        }
    }
}

/// Edits every tracked handle of `room` to show `view`.
///
/// Handles whose edit fails permanently are dropped from the session;
/// transient failures keep the handle. Returns (edited, pruned).
pub(crate) async fn publish(room: &RoomSession, notifier: &dyn Notifier, view: &StatusView) -> (usize, usize) {
    let handles: Vec<MessageHandle> = room.with_state(|s| s.tracked_handles().to_vec());
    let mut edited = 0;
    let mut dead = Vec::new();

    for handle in handles {
        match notifier.edit(&handle, view).await {
            Ok(()) => edited += 1,
            Err(e) if e.is_handle_dead() => {
                log::debug!("{}: dropping status message {} ({})", room.room(), handle, e);
                dead.push(handle);
            }
            Err(e) => log::warn!("{}: status update for {} failed: {}", room.room(), handle, e),
        }
    }

    if !dead.is_empty() {
        room.with_state(|s| s.untrack_handles(&dead));
    }
    (edited, dead.len())
}
