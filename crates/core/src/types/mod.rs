//! Domain types for chaptercast
//!
//! - `ids`: room, voice target and message handle identifiers
//! - `library`: library entries, chapters, chapter metadata and front-end options
//! - `view`: status views rendered for the notifier
//! - `common`: time formatting and natural ordering

mod common;
mod ids;
mod library;
mod view;

pub use common::{format_progress, format_timestamp, natural_cmp};
pub use ids::{MessageHandle, RoomId, VoiceTarget};
pub use library::{
    sort_chapters, sort_entries, title_from_path, BookEntry, ChapterEntry, ChapterMetadata,
    LibraryEntry, SelectOption, SeriesEntry,
};
pub use view::{ControlsView, PlayerState, StatusView};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_types_are_exported() {
        let _room = RoomId::new(1);
        let _target = VoiceTarget::new(2);
        let _handle = MessageHandle::generate();
        let _view = StatusView::idle();
    }
}
