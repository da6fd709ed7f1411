//! Library, book and chapter domain models

use crate::types::common::natural_cmp;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A directory that directly contains chapter files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookEntry {
    pub title: String,
    pub author: String,
    pub path: PathBuf,
}

impl BookEntry {
    pub fn new(title: impl Into<String>, author: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            path: path.into(),
        }
    }
}

/// A directory whose subdirectories are books by the same author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesEntry {
    pub title: String,
    pub author: String,
    pub path: PathBuf,
    pub books: Vec<BookEntry>,
}

/// One item of the library tree, as produced by a catalog provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LibraryEntry {
    Book(BookEntry),
    Series(SeriesEntry),
}

impl LibraryEntry {
    pub fn title(&self) -> &str {
        match self {
            Self::Book(book) => &book.title,
            Self::Series(series) => &series.title,
        }
    }

    pub fn author(&self) -> &str {
        match self {
            Self::Book(book) => &book.author,
            Self::Series(series) => &series.author,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Book(book) => &book.path,
            Self::Series(series) => &series.path,
        }
    }

    pub fn is_series(&self) -> bool {
        matches!(self, Self::Series(_))
    }
}

/// Sorts entries by title in natural order, and the books inside every series
pub fn sort_entries(entries: &mut [LibraryEntry]) {
    entries.sort_by(|a, b| natural_cmp(a.title(), b.title()));
    for entry in entries.iter_mut() {
        if let LibraryEntry::Series(series) = entry {
            series.books.sort_by(|a, b| natural_cmp(&a.title, &b.title));
        }
    }
}

/// One playable file of a book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterEntry {
    pub filename: String,
    pub path: PathBuf,
    pub title: String,
    pub track: u32,
}

impl ChapterEntry {
    pub fn new(path: impl Into<PathBuf>, title: impl Into<String>, track: u32) -> Self {
        let path = path.into();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            filename,
            path,
            title: title.into(),
            track,
        }
    }
}

/// Sorts chapters by track number, keeping file order among equal tracks
pub fn sort_chapters(chapters: &mut [ChapterEntry]) {
    // slice::sort_by_key is stable
    chapters.sort_by_key(|c| c.track);
}

/// What a metadata provider knows about one chapter file
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChapterMetadata {
    pub title: String,
    pub track: u32,
    pub duration: Duration,
    pub synopsis: Option<String>,
    #[serde(skip)]
    pub cover: Option<Vec<u8>>,
}

impl ChapterMetadata {
    /// Metadata for a file whose tags could not be read: the file stem as
    /// title, track zero and zero duration
    pub fn fallback(path: &Path) -> Self {
        Self {
            title: title_from_path(path),
            ..Default::default()
        }
    }
}

/// Derives a display title from a file name
pub fn title_from_path(path: &Path) -> String {
    path.file_stem()
        .or_else(|| path.file_name())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// A selectable option in the interactive front-end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SelectOption {
    Book(BookEntry),
    Series(SeriesEntry),
    Chapter(ChapterEntry),
}

impl SelectOption {
    /// Primary text of the option
    pub fn label(&self) -> String {
        match self {
            Self::Book(book) => book.title.clone(),
            Self::Series(series) => format!("{} (series)", series.title),
            Self::Chapter(chapter) => format!("{}. {}", chapter.track, chapter.title),
        }
    }

    /// Secondary text of the option
    pub fn description(&self) -> String {
        match self {
            Self::Book(book) => book.author.clone(),
            Self::Series(series) => format!("{} - {} books", series.author, series.books.len()),
            Self::Chapter(chapter) => chapter.filename.clone(),
        }
    }
}

impl From<LibraryEntry> for SelectOption {
    fn from(entry: LibraryEntry) -> Self {
        match entry {
            LibraryEntry::Book(book) => Self::Book(book),
            LibraryEntry::Series(series) => Self::Series(series),
        }
    }
}

impl From<ChapterEntry> for SelectOption {
    fn from(chapter: ChapterEntry) -> Self {
        Self::Chapter(chapter)
    }
}
