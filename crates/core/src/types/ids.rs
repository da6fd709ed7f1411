//! Identifiers for rooms, voice targets and outbound messages

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifies one voice room (a guild, a server, a house).
///
/// Every playback session is keyed by its room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(u64);

impl RoomId {
    /// Creates a room id from its raw value
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "room:{}", self.0)
    }
}

/// Identifies a voice destination (a channel inside a room)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoiceTarget(u64);

impl VoiceTarget {
    /// Creates a voice target from its raw value
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for VoiceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "voice:{}", self.0)
    }
}

/// Opaque reference to a message the notifier has delivered.
///
/// The core never looks inside a handle; it only stores it and hands it back
/// to the notifier for edits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageHandle(String);

impl MessageHandle {
    /// Wraps a notifier-issued token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Generates a fresh random handle, for notifiers without their own ids
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the raw token
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
