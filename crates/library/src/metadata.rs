//! Chapter metadata via lofty

use crate::error::{LibraryError, LibraryResult};
use async_trait::async_trait;
use chaptercast_core::{ChapterMetadata, MetadataProvider};
use lofty::file::TaggedFile;
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::Tag;
use log::{debug, warn};
use std::path::Path;

/// Reads title, track, duration, synopsis and cover art from audio tags
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyMetadataProvider;

impl LoftyMetadataProvider {
    pub fn new() -> Self {
        Self
    }

    /// Reads tags, failing on unreadable files
    pub fn read(path: &Path) -> LibraryResult<ChapterMetadata> {
        let tagged_file = Probe::open(path)
            .and_then(|probe| probe.read())
            .map_err(|source| LibraryError::Tags {
                path: path.to_path_buf(),
                source,
            })?;

        let mut metadata = ChapterMetadata::fallback(path);
        metadata.duration = tagged_file.properties().duration();

        if let Some(tag) = best_tag(&tagged_file) {
            if let Some(title) = tag.title().filter(|t| !t.trim().is_empty()) {
                metadata.title = title.into_owned();
            }
            metadata.track = tag.track().unwrap_or(0);
            metadata.synopsis = synopsis(tag);
            metadata.cover = tag.pictures().first().map(|p| p.data().to_vec());
        } else {
            debug!("No tags in {}", path.display());
        }

        Ok(metadata)
    }
}

#[async_trait]
impl MetadataProvider for LoftyMetadataProvider {
    async fn probe(&self, path: &Path) -> ChapterMetadata {
        let owned = path.to_path_buf();
        let result = tokio::task::spawn_blocking(move || Self::read(&owned)).await;

        match result {
            Ok(Ok(metadata)) => metadata,
            Ok(Err(e)) => {
                warn!("{}, using filename", e);
                ChapterMetadata::fallback(path)
            }
            Err(e) => {
                warn!("Metadata probe for {} failed: {}", path.display(), e);
                ChapterMetadata::fallback(path)
            }
        }
    }
}

fn best_tag(file: &TaggedFile) -> Option<&Tag> {
    file.primary_tag().or_else(|| file.first_tag())
}

/// Synopsis, falling back to description and then comment
fn synopsis(tag: &Tag) -> Option<String> {
    tag.get_string(&ItemKey::Unknown("synopsis".to_string()))
        .or_else(|| tag.get_string(&ItemKey::Description))
        .map(str::to_string)
        .or_else(|| tag.comment().map(|c| c.into_owned()))
        .map(|text| text.replace("\\n", "\n"))
        .filter(|text| !text.trim().is_empty())
}
