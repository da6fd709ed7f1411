//! Pure rendering of a session into what the front-end draws

use crate::session::Session;
use chaptercast_core::{
    format_progress, format_timestamp, ControlsView, LibraryEntry, PlayerState, SelectOption,
    StatusView,
};
use std::time::Duration;
use tokio::time::Instant;

const PRESENCE_CHAPTER_MAX: usize = 30;
const PRESENCE_BOOK_MAX: usize = 25;
const PRESENCE_ELAPSED_AFTER: Duration = Duration::from_secs(300);

/// Builds the status view of `session` at `now`
pub fn render(session: &Session, now: Instant) -> StatusView {
    let state = player_state(session);
    let playing = session.is_playing();

    let progress = playing.then(|| {
        let elapsed = session.compute_elapsed(now);
        let shown = if session.duration().is_zero() {
            elapsed
        } else {
            elapsed.min(session.duration())
        };
        format_progress(shown, session.duration())
    });

    StatusView {
        state,
        book_title: session.book_title().map(str::to_string),
        chapter_title: session.current_chapter().map(|c| c.title.clone()),
        progress,
        synopsis: session.synopsis().map(str::to_string),
        cover: session.cover().cloned(),
        controls: ControlsView {
            previous: playing && session.adjacent_index(-1).is_some(),
            rewind: playing,
            play_pause: playing,
            forward: playing,
            next: playing && session.adjacent_index(1).is_some(),
            back_to_chapters: !session.chapters().is_empty(),
        },
    }
}

fn player_state(session: &Session) -> PlayerState {
    match (session.is_playing(), session.is_paused()) {
        (true, true) => PlayerState::Paused,
        (true, false) => PlayerState::Playing,
        _ => PlayerState::Idle,
    }
}

/// Chapter picker options of the selected book
pub fn chapter_options(session: &Session) -> Vec<SelectOption> {
    session
        .chapters()
        .iter()
        .cloned()
        .map(SelectOption::from)
        .collect()
}

/// Library browser options
pub fn library_options(entries: &[LibraryEntry]) -> Vec<SelectOption> {
    entries.iter().cloned().map(SelectOption::from).collect()
}

/// One-line presence text, or `None` when nothing plays
pub fn presence_text(session: &Session, now: Instant) -> Option<String> {
    if !session.is_playing() {
        return None;
    }
    let chapter = session.current_chapter()?;
    let book = session.book_title().unwrap_or_default();

    let base = format!(
        "{} - {}",
        truncate(&chapter.title, PRESENCE_CHAPTER_MAX),
        truncate(book, PRESENCE_BOOK_MAX)
    );

    if session.is_paused() {
        return Some(format!("{} {}", PlayerState::Paused.icon(), base));
    }

    let elapsed = session.compute_elapsed(now);
    if elapsed > PRESENCE_ELAPSED_AFTER {
        Some(format!("🎧 {} ({})", base, format_timestamp(elapsed)))
    } else {
        Some(format!("🎧 {}", base))
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}
