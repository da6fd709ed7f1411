//! Traits for the collaborators the player core talks to
//!
//! The player never decodes audio, never talks to a chat service and never
//! walks the filesystem itself. It drives these traits instead, so hosts can
//! plug in a real voice/chat backend and tests can plug in fakes.

use crate::error::Result;
use crate::types::{ChapterMetadata, LibraryEntry, MessageHandle, RoomId, StatusView, VoiceTarget};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Reads chapter metadata from audio files.
///
/// Implementations must not fail: a file without readable tags yields
/// [`ChapterMetadata::fallback`].
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn probe(&self, path: &Path) -> ChapterMetadata;
}

/// Turns a library root into books and series
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Scans `root` (laid out as Author/Book or Author/Series/Book)
    async fn scan(&self, root: &Path) -> Result<Vec<LibraryEntry>>;

    /// Lists the chapter files directly inside a book directory
    async fn list_chapters(&self, book: &Path) -> Result<Vec<PathBuf>>;
}

/// Failure reported by a media source
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MediaError {
    #[error("cannot open media: {0}")]
    Open(String),

    #[error("decode failed: {0}")]
    Decode(String),

    #[error("stream failed: {0}")]
    Stream(String),
}

/// How a media source finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// Reached the end or was stopped; the source cannot tell which
    Ended,
    /// Stopped because of an error
    Failed(MediaError),
}

/// Called exactly once when a media source finishes
pub type CompletionCallback = Box<dyn FnOnce(PlaybackOutcome) + Send + 'static>;

/// One playable stream, created at a fixed start offset
pub trait MediaSource: Send + Sync {
    /// Starts streaming. `on_complete` fires asynchronously, exactly once.
    fn play(&self, on_complete: CompletionCallback) -> std::result::Result<(), MediaError>;

    /// Requests a stop. The completion callback fires with
    /// [`PlaybackOutcome::Ended`].
    fn stop(&self);

    /// Suspends output without ending the stream
    fn pause(&self) {}

    /// Continues output after [`MediaSource::pause`]
    fn resume(&self) {}
}

/// Builds media sources. There is no seek: seeking means building a new
/// source at a new offset.
pub trait MediaSourceFactory: Send + Sync {
    fn create(
        &self,
        room: RoomId,
        path: &Path,
        start_offset: Duration,
    ) -> std::result::Result<Box<dyn MediaSource>, MediaError>;
}

/// Failure reported by the voice gateway
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VoiceError {
    #[error("voice target {0} unavailable")]
    Unavailable(VoiceTarget),

    #[error("voice gateway error: {0}")]
    Gateway(String),
}

/// Voice connection management per room
#[async_trait]
pub trait VoiceGateway: Send + Sync {
    /// Joins `target`. May take a long time; callers bound it with a timeout.
    async fn connect(&self, room: RoomId, target: VoiceTarget) -> std::result::Result<(), VoiceError>;

    /// Leaves whatever target the room is connected to
    async fn disconnect(&self, room: RoomId);

    /// The target the room is currently connected to, if any
    fn connected_target(&self, room: RoomId) -> Option<VoiceTarget>;

    fn is_connected(&self, room: RoomId) -> bool {
        self.connected_target(room).is_some()
    }
}

/// Failure reported by the notifier
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotifyError {
    #[error("message not found")]
    NotFound,

    #[error("forbidden")]
    Forbidden,

    #[error("message handle expired")]
    HandleExpired,

    #[error("transport error: {0}")]
    Transport(String),
}

impl NotifyError {
    /// True when the handle will never accept edits again
    pub fn is_handle_dead(&self) -> bool {
        matches!(self, Self::NotFound | Self::Forbidden | Self::HandleExpired)
    }
}

/// Outbound chat channel
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends a new status message and returns its handle
    async fn send(&self, room: RoomId, view: &StatusView) -> std::result::Result<MessageHandle, NotifyError>;

    /// Replaces the content of a previously sent status message
    async fn edit(&self, handle: &MessageHandle, view: &StatusView) -> std::result::Result<(), NotifyError>;

    /// Delivers a one-line notice. Fire-and-forget.
    async fn notice(&self, room: RoomId, text: &str);

    /// Sets or clears the presence line
    async fn set_presence(&self, _text: Option<&str>) {}
}
