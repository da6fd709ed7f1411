//! Render output handed to the notifier and the front-end

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Coarse player state used for iconography
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    Idle,
    Playing,
    Paused,
}

impl PlayerState {
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Idle => "⏹",
            Self::Playing => "▶",
            Self::Paused => "⏸",
        }
    }
}

/// Which transport controls are usable in the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ControlsView {
    pub previous: bool,
    pub rewind: bool,
    pub play_pause: bool,
    pub forward: bool,
    pub next: bool,
    pub back_to_chapters: bool,
}

/// Everything the front-end needs to draw one status message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusView {
    pub state: PlayerState,
    pub book_title: Option<String>,
    pub chapter_title: Option<String>,
    /// `elapsed/duration` as `HH:MM:SS.mmm/HH:MM:SS.mmm`
    pub progress: Option<String>,
    pub synopsis: Option<String>,
    /// Embedded picture of the book, shared with the session
    #[serde(skip)]
    pub cover: Option<Arc<[u8]>>,
    pub controls: ControlsView,
}

impl StatusView {
    /// A view with nothing selected
    pub fn idle() -> Self {
        Self {
            state: PlayerState::Idle,
            book_title: None,
            chapter_title: None,
            progress: None,
            synopsis: None,
            cover: None,
            controls: ControlsView::default(),
        }
    }

    /// Plain-text rendering, one line per field
    pub fn to_text(&self) -> String {
        let mut lines = Vec::new();

        let headline = match (&self.chapter_title, self.state) {
            (Some(chapter), PlayerState::Playing) => format!("{} Now playing: {}", self.state.icon(), chapter),
            (Some(chapter), PlayerState::Paused) => format!("{} Paused: {}", self.state.icon(), chapter),
            (Some(chapter), PlayerState::Idle) => format!("{} Selected: {}", self.state.icon(), chapter),
            (None, _) => format!("{} Nothing playing", self.state.icon()),
        };
        lines.push(headline);

        if let Some(book) = &self.book_title {
            lines.push(format!("Book: {}", book));
        }
        if let Some(progress) = &self.progress {
            lines.push(progress.clone());
        }

        lines.join("\n")
    }
}

impl Default for StatusView {
    fn default() -> Self {
        Self::idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_text() {
        assert_eq!(StatusView::idle().to_text(), "⏹ Nothing playing");
    }

    #[test]
    fn test_playing_text() {
        let view = StatusView {
            state: PlayerState::Playing,
            book_title: Some("Dune".into()),
            chapter_title: Some("Chapter 1".into()),
            progress: Some("00:00:01.000/00:10:00.000".into()),
            synopsis: None,
            cover: None,
            controls: ControlsView::default(),
        };
        let text = view.to_text();
        assert!(text.starts_with("▶ Now playing: Chapter 1"));
        assert!(text.contains("Book: Dune"));
        assert!(text.ends_with("00:00:01.000/00:10:00.000"));
    }

    #[test]
    fn test_paused_icon() {
        assert_eq!(PlayerState::Paused.icon(), "⏸");
    }
}
