use chaptercast_core::AppError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Library root not found: {0}")]
    RootNotFound(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Cannot walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Cannot read tags from {path}: {source}")]
    Tags {
        path: PathBuf,
        #[source]
        source: lofty::error::LoftyError,
    },

    #[error("Background task failed: {0}")]
    Join(String),
}

pub type LibraryResult<T> = std::result::Result<T, LibraryError>;

impl From<LibraryError> for AppError {
    fn from(err: LibraryError) -> Self {
        match err {
            LibraryError::RootNotFound(path) => AppError::FileNotFound { path },
            LibraryError::NotADirectory(path) => AppError::CatalogError {
                path,
                reason: "not a directory".to_string(),
            },
            LibraryError::Walk { path, source } => AppError::CatalogError {
                path,
                reason: source.to_string(),
            },
            LibraryError::Tags { path, source } => AppError::MetadataUnavailable {
                file: path,
                reason: source.to_string(),
            },
            LibraryError::Join(message) => AppError::InternalError { message },
        }
    }
}
