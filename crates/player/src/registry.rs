//! Per-room session registry

use crate::room::RoomSession;
use chaptercast_core::RoomId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// All live sessions, at most one per room
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<RoomId, Arc<RoomSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<RoomId, Arc<RoomSession>>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, room: RoomId) -> Option<Arc<RoomSession>> {
        self.sessions().get(&room).cloned()
    }

    /// Returns the room's session, creating an empty one on first use
    pub fn get_or_create(&self, room: RoomId) -> Arc<RoomSession> {
        self.sessions()
            .entry(room)
            .or_insert_with(|| {
                log::debug!("{}: new session", room);
                Arc::new(RoomSession::new(room, Instant::now()))
            })
            .clone()
    }

    pub fn remove(&self, room: RoomId) -> Option<Arc<RoomSession>> {
        self.sessions().remove(&room)
    }

    pub fn contains(&self, room: RoomId) -> bool {
        self.sessions().contains_key(&room)
    }

    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions().is_empty()
    }

    /// Rooms with a session, in ascending order
    pub fn rooms(&self) -> Vec<RoomId> {
        let mut rooms: Vec<RoomId> = self.sessions().keys().copied().collect();
        rooms.sort();
        rooms
    }

    /// Rooms whose session has been idle for at least `timeout`
    pub fn idle_rooms(&self, now: Instant, timeout: Duration) -> Vec<RoomId> {
        // Snapshot first; session state locks are never taken under the map lock.
        let sessions: Vec<Arc<RoomSession>> = self.sessions().values().cloned().collect();
        let mut idle: Vec<RoomId> = sessions
            .iter()
            .filter(|session| session.with_state(|s| s.is_idle(now, timeout)))
            .map(|session| session.room())
            .collect();
        idle.sort();
        idle
    }
}
