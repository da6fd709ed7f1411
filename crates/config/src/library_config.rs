//! Library configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the audiobooks live and what counts as a chapter file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LibraryConfig {
    /// Library root, laid out as Author/Book or Author/Series/Book
    pub root: PathBuf,

    /// File extensions treated as chapter files
    pub chapter_extensions: Vec<String>,

    /// Skip hidden files and directories (names starting with '.')
    pub skip_hidden: bool,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("audiobooks"),
            chapter_extensions: vec![
                "mp3".to_string(),
                "m4a".to_string(),
                "m4b".to_string(),
                "ogg".to_string(),
                "opus".to_string(),
                "flac".to_string(),
                "wav".to_string(),
            ],
            skip_hidden: true,
        }
    }
}

impl ConfigSection for LibraryConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut results = Vec::new();

        if self.root.as_os_str().is_empty() {
            results.push(Err(ValidationError::new("library.root", "must not be empty")));
        }

        if self.chapter_extensions.is_empty() {
            results.push(Err(ValidationError::new(
                "library.chapter_extensions",
                "must list at least one extension",
            )));
        }

        for (i, ext) in self.chapter_extensions.iter().enumerate() {
            results.push(Validator::not_empty(
                ext,
                &format!("library.chapter_extensions[{}]", i),
            ));
        }

        Validator::collect_errors(results)
    }

    fn merge(&mut self, other: Self) {
        self.root = other.root;
        self.chapter_extensions = other.chapter_extensions;
        self.skip_hidden = other.skip_hidden;
    }

    fn section_name(&self) -> &'static str {
        "library"
    }
}
