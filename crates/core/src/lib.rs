//! chaptercast core: domain types, the error taxonomy and the traits of the
//! collaborators the player drives.

pub mod error;
pub mod ports;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, ErrorSeverity, RecoveryAction, Result};
pub use ports::{
    CatalogProvider, CompletionCallback, MediaError, MediaSource, MediaSourceFactory,
    MetadataProvider, Notifier, NotifyError, PlaybackOutcome, VoiceError, VoiceGateway,
};
pub use types::{
    format_progress, format_timestamp, natural_cmp, sort_chapters, sort_entries, BookEntry,
    ChapterEntry, ChapterMetadata, ControlsView, LibraryEntry, MessageHandle, PlayerState, RoomId,
    SelectOption, SeriesEntry, StatusView, VoiceTarget,
};
