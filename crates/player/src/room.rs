//! Shared handle to one room's session
//!
//! Lock order: `ops` (async, held across awaits) before `reporter` before
//! `state`/`source`. The std mutexes are never held across an await.
//!
//! Once a room is closed every operation still queued on `ops` fails
//! instead of running against the torn-down session.

use crate::session::Session;
use chaptercast_core::{AppError, MediaSource, Result, RoomId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

struct ActiveSource {
    generation: u64,
    source: Box<dyn MediaSource>,
}

#[derive(Default)]
struct ReporterSlot {
    next_id: u64,
    current: Option<(u64, JoinHandle<()>)>,
}

/// Exclusive right to run one transport operation on a room
pub(crate) struct OpPermit<'a> {
    _ops: tokio::sync::MutexGuard<'a, ()>,
    cancel: watch::Receiver<u64>,
}

impl OpPermit<'_> {
    /// Resolves once the room is quit while this operation runs
    pub(crate) fn cancellation(&self) -> watch::Receiver<u64> {
        self.cancel.clone()
    }
}

/// A session plus the machinery that drives it
pub struct RoomSession {
    room: RoomId,
    state: Mutex<Session>,
    ops: tokio::sync::Mutex<()>,
    source: Mutex<Option<ActiveSource>>,
    reporter: Mutex<ReporterSlot>,
    cancel: watch::Sender<u64>,
    closed: AtomicBool,
}

fn relock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RoomSession {
    pub fn new(room: RoomId, now: Instant) -> Self {
        let (cancel, _) = watch::channel(0);
        Self {
            room,
            state: Mutex::new(Session::new(room, now)),
            ops: tokio::sync::Mutex::new(()),
            source: Mutex::new(None),
            reporter: Mutex::new(ReporterSlot::default()),
            cancel,
            closed: AtomicBool::new(false),
        }
    }

    pub fn room(&self) -> RoomId {
        self.room
    }

    /// A consistent copy of the session
    pub fn snapshot(&self) -> Session {
        relock(&self.state).clone()
    }

    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        f(&mut relock(&self.state))
    }

    /// Serializes transport operations on this room
    pub(crate) async fn lock_ops(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.ops.lock().await
    }

    /// Waits for the operation lock on behalf of `operation`.
    ///
    /// Fails with `SessionNotFound` if the room was closed while waiting and
    /// with `Cancelled` if a quit was requested after the call.
    pub(crate) async fn begin_op(&self, operation: &str) -> Result<OpPermit<'_>> {
        let cancel = self.cancel.subscribe();
        let ops = self.ops.lock().await;

        if self.is_closed() {
            return Err(AppError::SessionNotFound { room: self.room });
        }
        if cancel.has_changed().unwrap_or(true) {
            log::debug!("{}: {} dropped, room is shutting down", self.room, operation);
            return Err(AppError::Cancelled {
                operation: operation.to_string(),
            });
        }
        Ok(OpPermit { _ops: ops, cancel })
    }

    /// Marks the room torn down. Caller holds the operation lock.
    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub(crate) fn install_source(&self, generation: u64, source: Box<dyn MediaSource>) {
        *relock(&self.source) = Some(ActiveSource { generation, source });
    }

    /// Asks the current source to stop. Returns false if there is none.
    pub(crate) fn stop_source(&self) -> bool {
        match relock(&self.source).as_ref() {
            Some(active) => {
                log::debug!("{}: stopping source generation {}", self.room, active.generation);
                active.source.stop();
                true
            }
            None => false,
        }
    }

    pub(crate) fn pause_source(&self) {
        if let Some(active) = relock(&self.source).as_ref() {
            active.source.pause();
        }
    }

    pub(crate) fn resume_source(&self) {
        if let Some(active) = relock(&self.source).as_ref() {
            active.source.resume();
        }
    }

    pub(crate) fn discard_source(&self) -> bool {
        relock(&self.source).take().is_some()
    }

    /// Abandons any in-flight voice connect on this room
    pub(crate) fn cancel_pending(&self) {
        self.cancel.send_modify(|epoch| *epoch += 1);
    }

    /// Starts a reporter unless one is already running
    pub(crate) fn start_reporter(&self, spawn: impl FnOnce(u64) -> JoinHandle<()>) -> bool {
        let mut slot = relock(&self.reporter);
        if let Some((_, handle)) = &slot.current {
            if !handle.is_finished() {
                return false;
            }
        }
        slot.next_id += 1;
        let id = slot.next_id;
        slot.current = Some((id, spawn(id)));
        true
    }

    /// Called by reporter `id` when it sees nothing playing. Returns true if
    /// it should exit; false if playback restarted in the meantime.
    pub(crate) fn retire_reporter(&self, id: u64) -> bool {
        let mut slot = relock(&self.reporter);
        match &slot.current {
            Some((current, _)) if *current == id => {
                if self.with_state(|s| s.is_playing()) {
                    return false;
                }
                slot.current = None;
                true
            }
            _ => true,
        }
    }

    pub(crate) fn stop_reporter(&self) {
        if let Some((_, handle)) = relock(&self.reporter).current.take() {
            handle.abort();
        }
    }

    pub fn reporter_running(&self) -> bool {
        relock(&self.reporter)
            .current
            .as_ref()
            .map(|(_, handle)| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl std::fmt::Debug for RoomSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomSession")
            .field("room", &self.room)
            .field("state", &*relock(&self.state))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_permit_sees_later_cancels_only() {
        let room = RoomSession::new(RoomId::new(1), Instant::now());
        room.cancel_pending();

        let permit = room.begin_op("test").await.unwrap();
        let mut rx = permit.cancellation();
        let before = tokio::time::timeout(Duration::from_millis(10), rx.changed()).await;
        assert!(before.is_err(), "earlier cancels are not observed");

        room.cancel_pending();
        assert!(rx.changed().await.is_ok());
    }

    #[tokio::test]
    async fn test_queued_op_is_cancelled_by_quit() {
        let room = std::sync::Arc::new(RoomSession::new(RoomId::new(1), Instant::now()));
        let held = room.lock_ops().await;

        let queued = {
            let room = std::sync::Arc::clone(&room);
            tokio::spawn(async move { room.begin_op("scrub").await.map(|_| ()) })
        };
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }

        room.cancel_pending();
        drop(held);
        assert!(matches!(queued.await.unwrap(), Err(AppError::Cancelled { .. })));
    }

    #[tokio::test]
    async fn test_closed_room_rejects_ops() {
        let room = RoomSession::new(RoomId::new(1), Instant::now());
        {
            let _ops = room.lock_ops().await;
            room.close();
        }
        assert!(room.is_closed());
        assert!(matches!(
            room.begin_op("pause").await,
            Err(AppError::SessionNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_reporter_slot_lifecycle() {
        let room = RoomSession::new(RoomId::new(1), Instant::now());

        assert!(room.start_reporter(|_| tokio::spawn(std::future::pending())));
        assert!(room.reporter_running());
        assert!(!room.start_reporter(|_| tokio::spawn(std::future::pending())));

        assert!(room.retire_reporter(1));
        assert!(!room.reporter_running());
    }

    #[tokio::test]
    async fn test_superseded_reporter_exits() {
        let room = RoomSession::new(RoomId::new(1), Instant::now());
        room.start_reporter(|_| tokio::spawn(std::future::pending()));
        room.stop_reporter();
        room.start_reporter(|_| tokio::spawn(std::future::pending()));

        assert!(room.retire_reporter(1));
        assert!(room.reporter_running(), "the newer reporter keeps its slot");
    }
}
