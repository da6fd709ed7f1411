//! Directory-backed catalog
//!
//! The library root is laid out as `Author/Book/*.m4b` for standalone books
//! and `Author/Series/Book/*.m4b` for series. A directory that holds chapter
//! files and no subdirectories is a book; one with subdirectories is a series.

use crate::error::{LibraryError, LibraryResult};
use async_trait::async_trait;
use chaptercast_config::LibraryConfig;
use chaptercast_core::{
    natural_cmp, sort_entries, BookEntry, CatalogProvider, LibraryEntry, Result, SeriesEntry,
};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Reads books and series straight from the filesystem
#[derive(Debug, Clone)]
pub struct DirectoryCatalog {
    extensions: HashSet<String>,
    skip_hidden: bool,
}

impl DirectoryCatalog {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            skip_hidden: true,
        }
    }

    pub fn from_config(config: &LibraryConfig) -> Self {
        let mut catalog = Self::new(&config.chapter_extensions);
        catalog.skip_hidden = config.skip_hidden;
        catalog
    }

    pub fn with_skip_hidden(mut self, skip: bool) -> Self {
        self.skip_hidden = skip;
        self
    }

    /// True if `path` has one of the configured chapter extensions
    pub fn is_chapter_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.contains(&ext.to_ascii_lowercase()))
            .unwrap_or(false)
    }

    /// Blocking scan of a library root
    pub fn scan_root(&self, root: &Path) -> LibraryResult<Vec<LibraryEntry>> {
        if !root.exists() {
            return Err(LibraryError::RootNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(LibraryError::NotADirectory(root.to_path_buf()));
        }

        let mut entries = Vec::new();

        for author_dir in self.subdirectories(root)? {
            let author = dir_name(&author_dir);

            for item in self.subdirectories(&author_dir)? {
                match self.classify(&item, &author)? {
                    Some(entry) => entries.push(entry),
                    None => debug!("Skipping {}: no chapters and no books", item.display()),
                }
            }
        }

        sort_entries(&mut entries);
        info!(
            "Found {} items (books and series) under {}",
            entries.len(),
            root.display()
        );
        Ok(entries)
    }

    /// Blocking listing of the chapter files directly inside `book`
    pub fn chapter_files(&self, book: &Path) -> LibraryResult<Vec<PathBuf>> {
        if !book.is_dir() {
            return Err(LibraryError::NotADirectory(book.to_path_buf()));
        }

        let mut files: Vec<PathBuf> = self
            .children(book)?
            .into_iter()
            .filter(|entry| entry.file_type().is_file())
            .map(DirEntry::into_path)
            .filter(|path| self.is_chapter_file(path))
            .collect();

        files.sort_by(|a, b| natural_cmp(&dir_name(a), &dir_name(b)));
        Ok(files)
    }

    fn classify(&self, item: &Path, author: &str) -> LibraryResult<Option<LibraryEntry>> {
        let subdirs = self.subdirectories(item)?;
        let title = dir_name(item);

        if subdirs.is_empty() {
            if self.chapter_files(item)?.is_empty() {
                return Ok(None);
            }
            return Ok(Some(LibraryEntry::Book(BookEntry::new(title, author, item))));
        }

        let books: Vec<BookEntry> = subdirs
            .into_iter()
            .map(|book| BookEntry::new(dir_name(&book), author, book))
            .collect();

        Ok(Some(LibraryEntry::Series(SeriesEntry {
            title,
            author: author.to_string(),
            path: item.to_path_buf(),
            books,
        })))
    }

    fn subdirectories(&self, dir: &Path) -> LibraryResult<Vec<PathBuf>> {
        Ok(self
            .children(dir)?
            .into_iter()
            .filter(|entry| entry.file_type().is_dir())
            .map(DirEntry::into_path)
            .collect())
    }

    fn children(&self, dir: &Path) -> LibraryResult<Vec<DirEntry>> {
        let mut out = Vec::new();
        let walker = WalkDir::new(dir).min_depth(1).max_depth(1);

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(source) if source.depth() > 0 => {
                    warn!("Skipping unreadable entry in {}: {}", dir.display(), source);
                    continue;
                }
                Err(source) => {
                    return Err(LibraryError::Walk {
                        path: dir.to_path_buf(),
                        source,
                    })
                }
            };

            if self.skip_hidden && is_hidden(&entry) {
                continue;
            }
            out.push(entry);
        }

        Ok(out)
    }
}

impl Default for DirectoryCatalog {
    fn default() -> Self {
        Self::from_config(&LibraryConfig::default())
    }
}

#[async_trait]
impl CatalogProvider for DirectoryCatalog {
    async fn scan(&self, root: &Path) -> Result<Vec<LibraryEntry>> {
        let catalog = self.clone();
        let root = root.to_path_buf();
        let entries = tokio::task::spawn_blocking(move || catalog.scan_root(&root))
            .await
            .map_err(|e| LibraryError::Join(e.to_string()))??;
        Ok(entries)
    }

    async fn list_chapters(&self, book: &Path) -> Result<Vec<PathBuf>> {
        let catalog = self.clone();
        let book = book.to_path_buf();
        let files = tokio::task::spawn_blocking(move || catalog.chapter_files(&book))
            .await
            .map_err(|e| LibraryError::Join(e.to_string()))??;
        Ok(files)
    }
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}
