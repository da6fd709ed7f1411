//! Error types and recovery strategies for chaptercast
//!
//! Errors fall into three severity tiers:
//! - **Recoverable**: transient I/O that a reconnect or retry fixes (voice
//!   connect timeout, dropped voice link, notifier hiccups)
//! - **Degraded**: the current action fails but the session stays usable
//!   (media failure, no adjacent chapter, nothing playing)
//! - **Fatal**: the process cannot run as configured (invalid configuration)
//!
//! Nothing at the session level is fatal. Every error carries a one-line
//! `user_message()` suitable for a chat notice.

use crate::types::{RoomId, VoiceTarget};
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Recovery actions that can be taken when an error occurs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Retry the operation immediately
    RetryImmediate,
    /// Reconnect to the voice target, then retry
    Reconnect,
    /// Ask the user to pick something else (another chapter, another book)
    SelectAgain,
    /// Nothing to do, log and move on
    Ignore,
    /// No automatic recovery, user intervention required
    UserIntervention,
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RetryImmediate => write!(f, "Retrying immediately"),
            Self::Reconnect => write!(f, "Reconnecting"),
            Self::SelectAgain => write!(f, "Awaiting a new selection"),
            Self::Ignore => write!(f, "Ignoring"),
            Self::UserIntervention => write!(f, "User intervention required"),
        }
    }
}

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Error can be automatically recovered from
    Recoverable,
    /// The action failed but the session continues
    Degraded,
    /// Requires operator action
    Fatal,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recoverable => write!(f, "Recoverable"),
            Self::Degraded => write!(f, "Degraded"),
            Self::Fatal => write!(f, "Fatal"),
        }
    }
}

/// Main error type for chaptercast
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Voice Connection Errors =====
    /// Connecting to a voice target did not finish in time
    #[error("Voice connection to {target} timed out after {seconds}s")]
    ConnectionTimeout { target: VoiceTarget, seconds: u64 },

    /// No voice target configured for the room
    #[error("No voice target selected")]
    NoTargetSelected,

    /// The room is not in any voice channel
    #[error("Not connected to voice")]
    NotConnected,

    /// The voice link dropped while an operation was in flight
    #[error("Voice connection lost: {message}")]
    ConnectionLost { message: String },

    /// The voice gateway refused or failed an operation
    #[error("Voice error: {message}")]
    VoiceError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ===== Transport Errors =====
    /// Pause/scrub requested while nothing plays
    #[error("Nothing is playing")]
    NothingPlaying,

    /// Resume requested while not paused
    #[error("Playback is not paused")]
    NotPaused,

    /// Pause requested while already paused
    #[error("Playback is already paused")]
    AlreadyPaused,

    /// Next/previous ran off either end of the chapter list
    #[error("No chapter in direction {direction} from index {index:?}")]
    NoAdjacentChapter { index: Option<usize>, direction: i8 },

    /// A chapter operation without a current chapter
    #[error("No chapter selected")]
    NoChapterSelected,

    /// Chapter index outside the chapter list
    #[error("Chapter index {index} out of range ({count} chapters)")]
    ChapterOutOfRange { index: usize, count: usize },

    /// A book operation without a selected book
    #[error("No book selected")]
    NoBookSelected,

    /// The room has no session
    #[error("No session for {room}")]
    SessionNotFound { room: RoomId },

    // ===== Media Errors =====
    /// The media source could not be created or failed to start
    #[error("Media failure for {path}: {message}")]
    MediaFailure {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ===== Notifier Errors =====
    /// The notifier could not deliver a message
    #[error("Notifier error: {message}")]
    NotifierError { message: String },

    // ===== Library Errors =====
    /// A file could not be probed for metadata
    #[error("Metadata unavailable for {file}: {reason}")]
    MetadataUnavailable { file: PathBuf, reason: String },

    /// The library directory could not be scanned
    #[error("Catalog error at {path}: {reason}")]
    CatalogError { path: PathBuf, reason: String },

    /// File not found
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Permission denied for file operation
    #[error("Permission denied: {operation} on {path}")]
    PermissionDenied { operation: String, path: PathBuf },

    /// General I/O error
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: io::Error,
    },

    // ===== Configuration Errors =====
    /// Invalid configuration
    #[error("Invalid configuration: {setting} = '{value}' ({reason})")]
    InvalidConfiguration {
        setting: String,
        value: String,
        reason: String,
    },

    // ===== Generic Errors =====
    /// Generic internal error
    #[error("Internal error: {message}")]
    InternalError { message: String },

    /// Operation abandoned because the session went away
    #[error("Operation cancelled: {operation}")]
    Cancelled { operation: String },
}

impl AppError {
    /// Returns the severity level of this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ConnectionTimeout { .. }
            | Self::ConnectionLost { .. }
            | Self::VoiceError { .. }
            | Self::NotifierError { .. } => ErrorSeverity::Recoverable,

            Self::InvalidConfiguration { .. } => ErrorSeverity::Fatal,

            _ => ErrorSeverity::Degraded,
        }
    }

    /// Returns the recommended recovery action for this error
    pub fn recovery_action(&self) -> RecoveryAction {
        match self {
            Self::ConnectionTimeout { .. } | Self::ConnectionLost { .. } => {
                RecoveryAction::Reconnect
            }

            Self::VoiceError { .. } => RecoveryAction::RetryImmediate,

            Self::NoAdjacentChapter { .. }
            | Self::NoChapterSelected
            | Self::ChapterOutOfRange { .. }
            | Self::NoBookSelected
            | Self::MediaFailure { .. }
            | Self::MetadataUnavailable { .. }
            | Self::FileNotFound { .. } => RecoveryAction::SelectAgain,

            Self::NothingPlaying
            | Self::NotConnected
            | Self::NotPaused
            | Self::AlreadyPaused
            | Self::NotifierError { .. }
            | Self::Cancelled { .. } => RecoveryAction::Ignore,

            _ => RecoveryAction::UserIntervention,
        }
    }

    /// Returns a one-line message suitable for a chat notice
    pub fn user_message(&self) -> String {
        match self {
            Self::ConnectionTimeout { .. } => {
                "Could not join the voice channel in time. Please try again.".to_string()
            }
            Self::NoTargetSelected => "Join a voice channel first.".to_string(),
            Self::NotConnected => "I'm not currently in a voice channel.".to_string(),
            Self::ConnectionLost { .. } => {
                "The voice connection dropped. Press play to reconnect.".to_string()
            }
            Self::VoiceError { .. } => "The voice channel is unavailable right now.".to_string(),

            Self::NothingPlaying => "Nothing is playing.".to_string(),
            Self::NotPaused => "Playback is not paused.".to_string(),
            Self::AlreadyPaused => "Playback is already paused.".to_string(),
            Self::NoAdjacentChapter { direction, .. } => {
                if *direction < 0 {
                    "This is the first chapter.".to_string()
                } else {
                    "This is the last chapter.".to_string()
                }
            }
            Self::NoChapterSelected => "Pick a chapter first.".to_string(),
            Self::ChapterOutOfRange { .. } => "That chapter does not exist.".to_string(),
            Self::NoBookSelected => "Pick a book first.".to_string(),
            Self::SessionNotFound { .. } => {
                "No player is open here. Open the player first.".to_string()
            }

            Self::MediaFailure { .. } => {
                "This chapter could not be played. It may be damaged.".to_string()
            }
            Self::NotifierError { .. } => "Could not update the player message.".to_string(),

            Self::MetadataUnavailable { .. } => {
                "Cannot read this file's information.".to_string()
            }
            Self::CatalogError { .. } => "The library could not be read.".to_string(),
            Self::FileNotFound { .. } => {
                "The file was not found. It may have been moved or deleted.".to_string()
            }
            Self::PermissionDenied { .. } => "The library files are not readable.".to_string(),
            Self::IoError { .. } => "A file operation failed. Please try again.".to_string(),

            Self::InvalidConfiguration { setting, .. } => {
                format!("Invalid setting: {}. Please check your configuration.", setting)
            }

            Self::InternalError { .. } => {
                "An unexpected error occurred. Please try again.".to_string()
            }
            Self::Cancelled { .. } => "Operation was cancelled.".to_string(),
        }
    }

    /// Returns true if this error should be logged at ERROR level
    pub fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Fatal
    }

    /// Returns true if this error can be automatically retried
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.recovery_action(),
            RecoveryAction::RetryImmediate | RecoveryAction::Reconnect
        )
    }

    /// Helper to create a media failure from any error type
    pub fn media<E: std::error::Error + Send + Sync + 'static>(
        path: impl Into<PathBuf>,
        source: E,
    ) -> Self {
        Self::MediaFailure {
            path: path.into(),
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Helper to create a voice error from any error type
    pub fn voice<E: std::error::Error + Send + Sync + 'static>(
        message: impl Into<String>,
        source: E,
    ) -> Self {
        Self::VoiceError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Convenience type alias for Results using AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::FileNotFound {
                path: PathBuf::from("unknown"),
            },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                operation: "file operation".to_string(),
                path: PathBuf::from("unknown"),
            },
            _ => Self::IoError {
                message: err.to_string(),
                source: err,
            },
        }
    }
}
