//! Per-room playback state
//!
//! A [`Session`] is plain data. Only the transport controller mutates it, so
//! the mutators are crate-private; everything else reads through the
//! accessors or a cloned snapshot.

use chaptercast_core::{ChapterEntry, MessageHandle, RoomId, VoiceTarget};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Playback state of one voice room
#[derive(Debug, Clone)]
pub struct Session {
    room: RoomId,

    book_title: Option<String>,
    selected_book_path: Option<PathBuf>,
    synopsis: Option<String>,
    cover: Option<Arc<[u8]>>,
    chapters: Vec<ChapterEntry>,
    current_index: Option<usize>,
    current_chapter_path: Option<PathBuf>,

    current_seek: Duration,
    play_start: Option<Instant>,
    pause_start: Option<Instant>,
    is_playing: bool,
    is_paused: bool,
    manual_stop_requested: bool,
    duration: Duration,

    /// Bumped for every media source created
    generation: u64,
    /// Generation whose completion has not fired yet
    active_generation: Option<u64>,

    tracked_handles: Vec<MessageHandle>,
    voice_target: Option<VoiceTarget>,
    last_activity: Instant,
}

impl Session {
    pub fn new(room: RoomId, now: Instant) -> Self {
        Self {
            room,
            book_title: None,
            selected_book_path: None,
            synopsis: None,
            cover: None,
            chapters: Vec::new(),
            current_index: None,
            current_chapter_path: None,
            current_seek: Duration::ZERO,
            play_start: None,
            pause_start: None,
            is_playing: false,
            is_paused: false,
            manual_stop_requested: false,
            duration: Duration::ZERO,
            generation: 0,
            active_generation: None,
            tracked_handles: Vec::new(),
            voice_target: None,
            last_activity: now,
        }
    }

    pub fn room(&self) -> RoomId {
        self.room
    }

    pub fn book_title(&self) -> Option<&str> {
        self.book_title.as_deref()
    }

    pub fn selected_book_path(&self) -> Option<&Path> {
        self.selected_book_path.as_deref()
    }

    pub fn synopsis(&self) -> Option<&str> {
        self.synopsis.as_deref()
    }

    pub fn cover(&self) -> Option<&Arc<[u8]>> {
        self.cover.as_ref()
    }

    pub fn chapters(&self) -> &[ChapterEntry] {
        &self.chapters
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn current_chapter(&self) -> Option<&ChapterEntry> {
        self.current_index.and_then(|i| self.chapters.get(i))
    }

    pub fn current_chapter_path(&self) -> Option<&Path> {
        self.current_chapter_path.as_deref()
    }

    pub fn current_seek(&self) -> Duration {
        self.current_seek
    }

    pub fn play_start(&self) -> Option<Instant> {
        self.play_start
    }

    pub fn pause_start(&self) -> Option<Instant> {
        self.pause_start
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    pub fn manual_stop_requested(&self) -> bool {
        self.manual_stop_requested
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True while a media source has been started and has not completed
    pub fn has_active_source(&self) -> bool {
        self.active_generation.is_some()
    }

    pub fn active_generation(&self) -> Option<u64> {
        self.active_generation
    }

    pub fn tracked_handles(&self) -> &[MessageHandle] {
        &self.tracked_handles
    }

    pub fn voice_target(&self) -> Option<VoiceTarget> {
        self.voice_target
    }

    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }

    /// Position in the chapter
    ///
    /// `seek + (pause_start - play_start)` while paused, `seek + (now -
    /// play_start)` otherwise, zero when no attempt has started. Never
    /// negative.
    pub fn compute_elapsed(&self, now: Instant) -> Duration {
        let Some(start) = self.play_start else {
            return Duration::ZERO;
        };

        let until = match (self.is_paused, self.pause_start) {
            (true, Some(paused_at)) => paused_at,
            _ => now,
        };

        self.current_seek + until.saturating_duration_since(start)
    }

    /// Clamps a seek target in seconds into `[0, duration]`
    pub fn clamp_seek(&self, target_secs: f64) -> Duration {
        if target_secs.is_nan() || target_secs <= 0.0 {
            return Duration::ZERO;
        }
        let max = self.duration.as_secs_f64();
        if target_secs >= max {
            return self.duration;
        }
        Duration::from_secs_f64(target_secs)
    }

    /// Scrub target for `delta_secs` from the current position
    pub fn scrub_target(&self, now: Instant, delta_secs: i64) -> Duration {
        let elapsed = self.compute_elapsed(now).as_secs_f64();
        self.clamp_seek(elapsed + delta_secs as f64)
    }

    /// Where a re-play of the current chapter starts: the elapsed position,
    /// clamped into the chapter
    pub fn resume_position(&self, now: Instant) -> Duration {
        self.clamp_seek(self.compute_elapsed(now).as_secs_f64())
    }

    /// Time left in the chapter, saturating at zero
    pub fn remaining(&self, now: Instant) -> Duration {
        self.duration.saturating_sub(self.compute_elapsed(now))
    }

    /// Chapter index `direction` steps away, if it exists
    pub fn adjacent_index(&self, direction: i8) -> Option<usize> {
        let index = self.current_index?;
        let target = if direction < 0 {
            index.checked_sub(1)?
        } else {
            index + 1
        };
        (target < self.chapters.len()).then_some(target)
    }

    /// Not playing and untouched for at least `timeout`
    pub fn is_idle(&self, now: Instant, timeout: Duration) -> bool {
        !self.is_playing && now.saturating_duration_since(self.last_activity) >= timeout
    }

    pub(crate) fn touch(&mut self, now: Instant) {
        self.last_activity = now;
    }

    pub(crate) fn set_voice_target(&mut self, target: VoiceTarget) {
        self.voice_target = Some(target);
    }

    /// Replaces the chapter fields wholesale; no chapter is current afterwards
    pub(crate) fn load_book(
        &mut self,
        path: PathBuf,
        title: String,
        synopsis: Option<String>,
        chapters: Vec<ChapterEntry>,
    ) {
        self.selected_book_path = Some(path);
        self.book_title = Some(title);
        self.synopsis = synopsis;
        self.cover = None;
        self.chapters = chapters;
        self.current_index = None;
        self.current_chapter_path = None;
    }

    pub(crate) fn set_cover(&mut self, cover: Option<Arc<[u8]>>) {
        self.cover = cover;
    }

    pub(crate) fn select_index(&mut self, index: usize) -> Option<PathBuf> {
        let path = self.chapters.get(index)?.path.clone();
        self.current_index = Some(index);
        self.current_chapter_path = Some(path.clone());
        Some(path)
    }

    pub(crate) fn set_manual_stop(&mut self, manual: bool) {
        self.manual_stop_requested = manual;
    }

    /// Starts a new attempt and returns its generation
    pub(crate) fn begin_attempt(
        &mut self,
        path: PathBuf,
        seek: Duration,
        duration: Duration,
        now: Instant,
    ) -> u64 {
        self.generation += 1;
        self.current_chapter_path = Some(path);
        self.current_seek = seek;
        self.duration = duration;
        self.play_start = Some(now);
        self.pause_start = None;
        self.is_playing = true;
        self.is_paused = false;
        self.manual_stop_requested = false;
        self.active_generation = Some(self.generation);
        self.last_activity = now;
        self.generation
    }

    /// Marks `generation` as finished. Returns false if it was not the
    /// active one.
    pub(crate) fn finish_generation(&mut self, generation: u64) -> bool {
        if self.active_generation == Some(generation) {
            self.active_generation = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn forget_active_source(&mut self) {
        self.active_generation = None;
    }

    pub(crate) fn mark_paused(&mut self, now: Instant) {
        self.is_paused = true;
        self.pause_start = Some(now);
        self.last_activity = now;
    }

    /// Shifts the start forward by the time spent paused
    pub(crate) fn mark_resumed(&mut self, now: Instant) {
        if let (Some(start), Some(paused_at)) = (self.play_start, self.pause_start) {
            self.play_start = Some(start + now.saturating_duration_since(paused_at));
        }
        self.is_paused = false;
        self.pause_start = None;
        self.last_activity = now;
    }

    pub(crate) fn mark_not_playing(&mut self) {
        self.is_playing = false;
        self.is_paused = false;
        self.pause_start = None;
    }

    /// Zeroes playback fields, keeping the book and chapter selection.
    ///
    /// Also bumps the generation so an auto-advance already queued for the
    /// previous attempt finds it superseded. The manual-stop flag is left
    /// for the pending completion to consume.
    pub(crate) fn end_attempt(&mut self) {
        self.mark_not_playing();
        self.current_seek = Duration::ZERO;
        self.play_start = None;
        self.duration = Duration::ZERO;
        self.generation += 1;
    }

    pub(crate) fn track_handle(&mut self, handle: MessageHandle) {
        if !self.tracked_handles.contains(&handle) {
            self.tracked_handles.push(handle);
        }
    }

    pub(crate) fn untrack_handles(&mut self, dead: &[MessageHandle]) {
        self.tracked_handles.retain(|h| !dead.contains(h));
    }

    pub(crate) fn clear_handles(&mut self) {
        self.tracked_handles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn playing(seek: u64, duration: u64, now: Instant) -> Session {
        let mut session = Session::new(RoomId::new(1), now);
        session.begin_attempt(
            PathBuf::from("/lib/a.m4b"),
            Duration::from_secs(seek),
            Duration::from_secs(duration),
            now,
        );
        session
    }

    #[test]
    fn test_elapsed_without_attempt_is_zero() {
        let now = Instant::now();
        let session = Session::new(RoomId::new(1), now);
        assert_eq!(session.compute_elapsed(now + Duration::from_secs(9)), Duration::ZERO);
    }

    #[test]
    fn test_elapsed_counts_from_seek() {
        let start = Instant::now();
        let session = playing(100, 200, start);
        assert_eq!(
            session.compute_elapsed(start + Duration::from_secs(50)),
            Duration::from_secs(150)
        );
    }

    #[test]
    fn test_elapsed_frozen_while_paused() {
        let start = Instant::now();
        let mut session = playing(0, 600, start);
        session.mark_paused(start + Duration::from_secs(10));

        let later = start + Duration::from_secs(300);
        assert_eq!(session.compute_elapsed(later), Duration::from_secs(10));
    }

    #[test]
    fn test_resume_preserves_elapsed() {
        let start = Instant::now();
        let mut session = playing(0, 600, start);
        let paused_at = start + Duration::from_secs(10);
        session.mark_paused(paused_at);
        let resumed_at = paused_at + Duration::from_secs(45);
        session.mark_resumed(resumed_at);

        assert_eq!(session.compute_elapsed(resumed_at), Duration::from_secs(10));
        assert_eq!(
            session.compute_elapsed(resumed_at + Duration::from_secs(5)),
            Duration::from_secs(15)
        );
    }

    #[test]
    fn test_scrub_clamp() {
        let start = Instant::now();
        let session = playing(100, 200, start);
        let now = start + Duration::from_secs(50);

        assert_eq!(session.scrub_target(now, -500), Duration::ZERO);
        assert_eq!(session.scrub_target(now, 500), Duration::from_secs(200));
        assert_eq!(session.scrub_target(now, 30), Duration::from_secs(180));
    }

    #[test]
    fn test_clamp_seek_nan() {
        let session = playing(0, 10, Instant::now());
        assert_eq!(session.clamp_seek(f64::NAN), Duration::ZERO);
    }

    #[test]
    fn test_resume_position_stays_in_chapter() {
        let now = Instant::now();
        let session = playing(100, 200, now);

        assert_eq!(session.resume_position(now + Duration::from_secs(50)), Duration::from_secs(150));
        assert_eq!(session.resume_position(now + Duration::from_secs(500)), Duration::from_secs(200));
    }

    #[test]
    fn test_remaining_saturates() {
        let start = Instant::now();
        let session = playing(0, 10, start);
        assert_eq!(session.remaining(start + Duration::from_secs(60)), Duration::ZERO);
    }

    #[test]
    fn test_adjacent_index_bounds() {
        let now = Instant::now();
        let mut session = Session::new(RoomId::new(1), now);
        session.load_book(
            PathBuf::from("/lib/b"),
            "B".into(),
            None,
            vec![
                ChapterEntry::new("/lib/b/1.m4b", "One", 1),
                ChapterEntry::new("/lib/b/2.m4b", "Two", 2),
            ],
        );
        assert_eq!(session.adjacent_index(1), None);

        session.select_index(0);
        assert_eq!(session.adjacent_index(-1), None);
        assert_eq!(session.adjacent_index(1), Some(1));

        session.select_index(1);
        assert_eq!(session.adjacent_index(1), None);
        assert_eq!(session.adjacent_index(-1), Some(0));
    }

    #[test]
    fn test_stale_generation_does_not_finish() {
        let now = Instant::now();
        let mut session = playing(0, 10, now);
        let old = session.generation();
        session.begin_attempt(PathBuf::from("/lib/b.m4b"), Duration::ZERO, Duration::from_secs(5), now);

        assert!(!session.finish_generation(old));
        assert!(session.has_active_source());
        assert!(session.finish_generation(old + 1));
        assert!(!session.has_active_source());
    }

    #[test]
    fn test_end_attempt_supersedes_generation() {
        let now = Instant::now();
        let mut session = playing(30, 600, now);
        let generation = session.generation();
        session.set_manual_stop(true);
        session.end_attempt();

        assert!(!session.is_playing());
        assert_eq!(session.current_seek(), Duration::ZERO);
        assert!(session.generation() > generation);
        assert!(session.manual_stop_requested());
        assert!(session.finish_generation(generation), "the pending source still reports");
    }

    #[test]
    fn test_handles_are_a_set() {
        let mut session = Session::new(RoomId::new(1), Instant::now());
        let handle = MessageHandle::new("m1");
        session.track_handle(handle.clone());
        session.track_handle(handle.clone());
        assert_eq!(session.tracked_handles().len(), 1);

        session.untrack_handles(&[handle]);
        assert!(session.tracked_handles().is_empty());
    }

    #[test]
    fn test_idle_only_when_not_playing() {
        let start = Instant::now();
        let session = playing(0, 10, start);
        assert!(!session.is_idle(start + Duration::from_secs(3600), Duration::from_secs(60)));

        let fresh = Session::new(RoomId::new(2), start);
        assert!(fresh.is_idle(start + Duration::from_secs(60), Duration::from_secs(60)));
        assert!(!fresh.is_idle(start + Duration::from_secs(59), Duration::from_secs(60)));
    }

    proptest! {
        #[test]
        fn prop_elapsed_is_seek_plus_wall_time(seek in 0u64..10_000, a in 0u64..100_000, b in 0u64..100_000) {
            let start = Instant::now();
            let session = playing(seek, 20_000, start);
            let (t1, t2) = (a.min(b), a.max(b));

            let e1 = session.compute_elapsed(start + Duration::from_millis(t1));
            let e2 = session.compute_elapsed(start + Duration::from_millis(t2));

            prop_assert_eq!(e1, Duration::from_secs(seek) + Duration::from_millis(t1));
            prop_assert!(e2 >= e1);
        }

        #[test]
        fn prop_clamp_stays_in_bounds(duration in 0u64..100_000, target in -1.0e6f64..1.0e6) {
            let session = playing(0, duration, Instant::now());
            let clamped = session.clamp_seek(target);
            prop_assert!(clamped <= Duration::from_secs(duration));
            if target <= 0.0 {
                prop_assert_eq!(clamped, Duration::ZERO);
            }
        }

        #[test]
        fn prop_pause_resume_keeps_position(play_ms in 0u64..50_000, pause_ms in 0u64..50_000) {
            let start = Instant::now();
            let mut session = playing(0, 100_000, start);
            let paused_at = start + Duration::from_millis(play_ms);
            session.mark_paused(paused_at);
            let before = session.compute_elapsed(paused_at);

            let resumed_at = paused_at + Duration::from_millis(pause_ms);
            session.mark_resumed(resumed_at);
            prop_assert_eq!(session.compute_elapsed(resumed_at), before);
        }
    }
}
