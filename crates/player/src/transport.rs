//! Transport controller
//!
//! Every operation on a room runs under that room's operation lock, so
//! play, pause, scrub and friends never interleave. Media completion
//! callbacks only take the short state lock; anything that needs the
//! operation lock (auto-advance, notices) is spawned onto the runtime.

use crate::completion::{classify, Completion};
use crate::registry::SessionRegistry;
use crate::render::{chapter_options, presence_text, render};
use crate::reporter::{publish, ProgressReporter};
use crate::room::{OpPermit, RoomSession};
use crate::session::Session;
use crate::settings::TransportSettings;
use chaptercast_core::{
    sort_chapters, AppError, CatalogProvider, ChapterEntry, CompletionCallback, LibraryEntry,
    MediaSourceFactory, MessageHandle, MetadataProvider, Notifier, PlaybackOutcome, Result,
    RoomId, SelectOption, StatusView, VoiceGateway, VoiceTarget,
};
use chaptercast_resilience::{poll_until, with_retry, with_timeout};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// The collaborators a controller drives
#[derive(Clone)]
pub struct Ports {
    pub voice: Arc<dyn VoiceGateway>,
    pub media: Arc<dyn MediaSourceFactory>,
    pub metadata: Arc<dyn MetadataProvider>,
    pub catalog: Arc<dyn CatalogProvider>,
    pub notifier: Arc<dyn Notifier>,
}

/// Who asked for a playback attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    User,
    /// Failures are logged instead of reported to the room
    AutoAdvance,
}

struct Inner {
    ports: Ports,
    registry: Arc<SessionRegistry>,
    settings: TransportSettings,
}

/// Serializes and executes transport operations for every room
#[derive(Clone)]
pub struct TransportController {
    inner: Arc<Inner>,
}

impl TransportController {
    pub fn new(ports: Ports, registry: Arc<SessionRegistry>, settings: TransportSettings) -> Self {
        Self {
            inner: Arc::new(Inner {
                ports,
                registry,
                settings,
            }),
        }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.inner.registry
    }

    pub fn settings(&self) -> &TransportSettings {
        &self.inner.settings
    }

    /// A copy of the room's session, if it has one
    pub fn snapshot(&self, room: RoomId) -> Option<Session> {
        self.inner.registry.get(room).map(|s| s.snapshot())
    }

    /// The status view of the room right now
    pub fn view(&self, room: RoomId) -> StatusView {
        self.snapshot(room)
            .map(|s| render(&s, Instant::now()))
            .unwrap_or_else(StatusView::idle)
    }

    /// Chapter picker options of the room's selected book
    pub fn chapter_options(&self, room: RoomId) -> Vec<SelectOption> {
        self.snapshot(room).map(|s| chapter_options(&s)).unwrap_or_default()
    }

    fn session(&self, room: RoomId) -> Result<Arc<RoomSession>> {
        self.inner
            .registry
            .get(room)
            .ok_or(AppError::SessionNotFound { room })
    }

    // ===== Entry points =====

    /// Binds the room to `target`, scans the library and posts a status
    /// message. Returns the library entries to browse.
    pub async fn open_player(&self, room: RoomId, target: VoiceTarget) -> Result<Vec<LibraryEntry>> {
        let root = self.inner.settings.library_root.clone();
        let entries = self.inner.ports.catalog.scan(&root).await?;
        if entries.is_empty() {
            return Err(AppError::CatalogError {
                path: root,
                reason: "no audiobooks found".into(),
            });
        }

        self.set_voice_target(room, target).await?;

        let session = self.inner.registry.get_or_create(room);
        if let Err(e) = self.send_status(&session).await {
            log::warn!("{}: could not post status message: {}", room, e);
        }

        log::info!("{}: player opened with {} library entries", room, entries.len());
        Ok(entries)
    }

    /// Posts a fresh status message for a playing room and tracks it
    pub async fn reopen_controls(&self, room: RoomId) -> Result<MessageHandle> {
        let session = self.inner.registry.get(room).ok_or(AppError::NothingPlaying)?;
        if !session.with_state(|s| s.is_playing()) {
            return Err(AppError::NothingPlaying);
        }
        self.send_status(&session).await
    }

    /// Loads a book's chapters into the room's session. Any playback stops.
    pub async fn select_book(&self, room: RoomId, book: &Path) -> Result<Vec<ChapterEntry>> {
        let files = self.inner.ports.catalog.list_chapters(book).await?;

        let mut chapters = Vec::with_capacity(files.len());
        let mut synopsis = None;
        let mut cover: Option<Arc<[u8]>> = None;
        for file in files {
            let metadata = self.inner.ports.metadata.probe(&file).await;
            if synopsis.is_none() {
                synopsis = metadata.synopsis;
            }
            if cover.is_none() {
                cover = metadata.cover.map(Arc::from);
            }
            chapters.push(ChapterEntry::new(file, metadata.title, metadata.track));
        }
        if chapters.is_empty() {
            return Err(AppError::CatalogError {
                path: book.to_path_buf(),
                reason: "no chapter files".into(),
            });
        }
        sort_chapters(&mut chapters);

        let title = book
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| book.display().to_string());

        let session = self.inner.registry.get_or_create(room);
        let _op = session.begin_op("select book").await?;
        if self.halt_locked(&session) {
            self.clear_presence().await;
        }
        session.with_state(|s| {
            s.load_book(book.to_path_buf(), title.clone(), synopsis, chapters.clone());
            s.set_cover(cover);
            s.touch(Instant::now());
        });

        log::info!("{}: selected '{}' ({} chapters)", room, title, chapters.len());
        Ok(chapters)
    }

    /// Plays chapter `index` of the selected book from the start
    pub async fn select_chapter(&self, room: RoomId, index: usize) -> Result<()> {
        let session = self.session(room)?;
        let op = session.begin_op("select chapter").await?;

        let path = session.with_state(|s| {
            let count = s.chapters().len();
            if count == 0 {
                return Err(AppError::NoBookSelected);
            }
            s.select_index(index)
                .ok_or(AppError::ChapterOutOfRange { index, count })
        })?;

        self.play_locked(&session, &op, path, Duration::ZERO, Origin::User).await
    }

    /// Plays `path` from `seek` in the room
    pub async fn play(&self, room: RoomId, path: &Path, seek: Duration) -> Result<()> {
        let session = self.session(room)?;
        let op = session.begin_op("play").await?;

        session.with_state(|s| {
            if let Some(index) = s.chapters().iter().position(|c| c.path == path) {
                s.select_index(index);
            }
        });
        self.play_locked(&session, &op, path.to_path_buf(), seek, Origin::User).await
    }

    /// Joins `target` without starting playback
    pub async fn connect(&self, room: RoomId, target: VoiceTarget) -> Result<()> {
        let session = self.inner.registry.get_or_create(room);
        let op = session.begin_op("connect").await?;
        session.with_state(|s| s.set_voice_target(target));
        self.connect_locked(&session, &op, target).await
    }

    /// Changes the room's voice target. A room that is playing (and not
    /// paused) continues on the new target from the current position.
    pub async fn set_voice_target(&self, room: RoomId, target: VoiceTarget) -> Result<()> {
        let session = self.inner.registry.get_or_create(room);
        let op = session.begin_op("change voice target").await?;
        let now = Instant::now();

        let (previous, replay) = session.with_state(|s| {
            let previous = s.voice_target();
            s.set_voice_target(target);
            s.touch(now);
            let replay = (s.is_playing() && !s.is_paused())
                .then(|| s.current_chapter_path().map(|p| (p.to_path_buf(), s.resume_position(now))))
                .flatten();
            (previous, replay)
        });

        if previous == Some(target) {
            return Ok(());
        }
        log::info!("{}: voice target set to {}", room, target);

        match replay {
            Some((path, elapsed)) => self.play_locked(&session, &op, path, elapsed, Origin::User).await,
            None => Ok(()),
        }
    }

    pub async fn pause(&self, room: RoomId) -> Result<()> {
        let session = self.session(room)?;
        let _op = session.begin_op("pause").await?;
        let now = Instant::now();

        session.with_state(|s| {
            if !s.is_playing() {
                Err(AppError::NothingPlaying)
            } else if s.is_paused() {
                Err(AppError::AlreadyPaused)
            } else {
                s.mark_paused(now);
                Ok(())
            }
        })?;
        session.pause_source();

        log::info!("{}: paused", room);
        self.publish_presence(&session).await;
        Ok(())
    }

    /// Resumes a paused room. If the voice link dropped meanwhile, reconnects
    /// and re-plays from the frozen position instead.
    pub async fn resume(&self, room: RoomId) -> Result<()> {
        let session = self.session(room)?;
        let op = session.begin_op("resume").await?;
        let now = Instant::now();

        let (target, path, alive) = session.with_state(|s| {
            if !s.is_playing() {
                return Err(AppError::NothingPlaying);
            }
            if !s.is_paused() {
                return Err(AppError::NotPaused);
            }
            let path = s.current_chapter_path().map(Path::to_path_buf).ok_or(AppError::NoChapterSelected)?;
            Ok((s.voice_target(), path, s.has_active_source()))
        })?;

        let voice = &self.inner.ports.voice;
        let linked = match target {
            Some(target) => voice.connected_target(room) == Some(target),
            None => voice.is_connected(room),
        };

        if linked && alive {
            session.with_state(|s| s.mark_resumed(now));
            session.resume_source();
            log::info!("{}: resumed", room);
            self.publish_presence(&session).await;
            return Ok(());
        }

        let elapsed = session.with_state(|s| s.resume_position(now));
        log::info!("{}: voice link lost while paused, re-playing at {:?}", room, elapsed);

        if !linked {
            let target = target
                .or_else(|| voice.connected_target(room))
                .ok_or(AppError::NoTargetSelected)?;
            with_retry(
                &self.inner.settings.resume_reconnect,
                |e: &AppError| e.is_retryable(),
                || self.connect_locked(&session, &op, target),
            )
            .await?;
        }

        self.play_locked(&session, &op, path, elapsed, Origin::User).await
    }

    /// Plays pause when playing and resume when paused
    pub async fn toggle_pause(&self, room: RoomId) -> Result<()> {
        let paused = self.session(room)?.with_state(|s| s.is_paused());
        if paused {
            self.resume(room).await
        } else {
            self.pause(room).await
        }
    }

    /// Moves the play position by `delta_secs`, clamped to the chapter
    pub async fn scrub(&self, room: RoomId, delta_secs: i64) -> Result<()> {
        let session = self.session(room)?;
        let op = session.begin_op("scrub").await?;
        let now = Instant::now();

        let (path, target) = session.with_state(|s| {
            if !s.is_playing() {
                return Err(AppError::NothingPlaying);
            }
            let path = s.current_chapter_path().map(Path::to_path_buf).ok_or(AppError::NoChapterSelected)?;
            Ok((path, s.scrub_target(now, delta_secs)))
        })?;

        log::debug!("{}: scrub {:+}s to {:?}", room, delta_secs, target);
        self.play_locked(&session, &op, path, target, Origin::User).await
    }

    pub async fn rewind(&self, room: RoomId) -> Result<()> {
        self.scrub(room, -(self.inner.settings.scrub_step.as_secs() as i64)).await
    }

    pub async fn forward(&self, room: RoomId) -> Result<()> {
        self.scrub(room, self.inner.settings.scrub_step.as_secs() as i64).await
    }

    /// Plays the next (`direction > 0`) or previous chapter from the start
    pub async fn advance_track(&self, room: RoomId, direction: i8) -> Result<()> {
        let session = self.session(room)?;
        let op = session.begin_op("change chapter").await?;

        let path = session.with_state(|s| {
            let index = s.current_index().ok_or(AppError::NoChapterSelected)?;
            let next = (direction != 0)
                .then(|| s.adjacent_index(direction))
                .flatten()
                .ok_or(AppError::NoAdjacentChapter {
                    index: Some(index),
                    direction,
                })?;
            s.select_index(next).ok_or(AppError::NoChapterSelected)
        })?;

        self.play_locked(&session, &op, path, Duration::ZERO, Origin::User).await
    }

    pub async fn next_chapter(&self, room: RoomId) -> Result<()> {
        self.advance_track(room, 1).await
    }

    pub async fn previous_chapter(&self, room: RoomId) -> Result<()> {
        self.advance_track(room, -1).await
    }

    /// Asks the current source to stop.
    ///
    /// A manual stop leaves the room stopped with its selection kept. A
    /// non-manual one looks like a natural end, so the next chapter plays.
    pub async fn stop(&self, room: RoomId, manual: bool) -> Result<()> {
        let session = self.session(room)?;
        let _op = session.begin_op("stop").await?;
        if !self.stop_locked(&session, manual) {
            return Err(AppError::NothingPlaying);
        }
        if manual {
            session.stop_reporter();
            session.with_state(|s| s.end_attempt());
            self.clear_presence().await;
        }
        Ok(())
    }

    /// Stops playback and returns to the chapter picker of the same book
    pub async fn return_to_chapter_list(&self, room: RoomId) -> Result<Vec<SelectOption>> {
        let session = self.session(room)?;
        let _op = session.begin_op("return to chapter list").await?;

        self.halt_locked(&session);
        self.clear_presence().await;
        publish(&session, self.inner.ports.notifier.as_ref(), &render(&session.snapshot(), Instant::now())).await;

        let options = session.with_state(|s| chapter_options(s));
        if options.is_empty() {
            return Err(AppError::NoBookSelected);
        }
        Ok(options)
    }

    /// Stops, disconnects and forgets the room. Requires a voice connection.
    pub async fn stop_command(&self, room: RoomId) -> Result<()> {
        if !self.inner.ports.voice.is_connected(room) {
            return Err(AppError::NotConnected);
        }
        self.quit(room).await
    }

    /// Tears the room down: cancels any in-flight connect, stops the source,
    /// leaves voice and drops the session.
    pub async fn quit(&self, room: RoomId) -> Result<()> {
        let Some(session) = self.inner.registry.get(room) else {
            if self.inner.ports.voice.is_connected(room) {
                self.inner.ports.voice.disconnect(room).await;
                return Ok(());
            }
            return Err(AppError::SessionNotFound { room });
        };

        session.cancel_pending();
        let _ops = session.lock_ops().await;
        if session.is_closed() {
            return Err(AppError::SessionNotFound { room });
        }
        self.shutdown_locked(&session).await;
        Ok(())
    }

    /// Quits every room idle for longer than the configured timeout.
    /// Returns the rooms that were evicted.
    pub async fn evict_idle(&self, now: Instant) -> Vec<RoomId> {
        let Some(timeout) = self.inner.settings.idle_timeout else {
            return Vec::new();
        };

        let mut evicted = Vec::new();
        for room in self.inner.registry.idle_rooms(now, timeout) {
            let Some(session) = self.inner.registry.get(room) else {
                continue;
            };
            let _ops = session.lock_ops().await;
            // Playback may have started, or the room quit, while we waited.
            if session.is_closed() || !session.with_state(|s| s.is_idle(now, timeout)) {
                continue;
            }
            self.shutdown_locked(&session).await;
            log::info!("{}: evicted after {:?} idle", room, timeout);
            evicted.push(room);
        }
        evicted
    }

    /// Runs [`TransportController::evict_idle`] every `period`. Returns
    /// `None` when idle eviction is disabled.
    pub fn spawn_idle_sweeper(&self, period: Duration) -> Option<JoinHandle<()>> {
        if self.inner.settings.idle_timeout.is_none() {
            return None;
        }
        let controller = self.clone();
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let evicted = controller.evict_idle(Instant::now()).await;
                if !evicted.is_empty() {
                    log::debug!("idle sweep evicted {} sessions", evicted.len());
                }
            }
        }))
    }

    // ===== Locked helpers (caller holds the room's operation lock) =====

    async fn connect_locked(&self, session: &RoomSession, op: &OpPermit<'_>, target: VoiceTarget) -> Result<()> {
        let room = session.room();
        let voice = &self.inner.ports.voice;

        match voice.connected_target(room) {
            Some(current) if current == target => return Ok(()),
            Some(current) => {
                log::info!("{}: moving from {} to {}", room, current, target);
                voice.disconnect(room).await;
            }
            None => {}
        }

        let timeout = self.inner.settings.connect_timeout;
        let mut cancelled = op.cancellation();
        tokio::select! {
            result = with_timeout(timeout, voice.connect(room, target)) => match result {
                Ok(Ok(())) => {
                    log::info!("{}: connected to {}", room, target);
                    Ok(())
                }
                Ok(Err(e)) => Err(AppError::voice(format!("cannot join {}", target), e)),
                Err(_) => Err(AppError::ConnectionTimeout {
                    target,
                    seconds: timeout.as_secs(),
                }),
            },
            _ = cancelled.changed() => {
                log::info!("{}: connect to {} abandoned", room, target);
                Err(AppError::Cancelled {
                    operation: format!("voice connect to {}", target),
                })
            }
        }
    }

    async fn play_locked(
        &self,
        session: &Arc<RoomSession>,
        op: &OpPermit<'_>,
        path: PathBuf,
        seek: Duration,
        origin: Origin,
    ) -> Result<()> {
        let room = session.room();
        let ports = &self.inner.ports;

        let target = session
            .with_state(|s| s.voice_target())
            .or_else(|| ports.voice.connected_target(room))
            .ok_or(AppError::NoTargetSelected)?;
        self.connect_locked(session, op, target).await?;

        self.retire_previous(session).await;

        let metadata = ports.metadata.probe(&path).await;
        let generation = session.with_state(|s| s.begin_attempt(path.clone(), seek, metadata.duration, Instant::now()));

        if !ports.voice.is_connected(room) {
            self.abandon_attempt(session, generation);
            return Err(AppError::ConnectionLost {
                message: format!("voice link dropped before {} started", path.display()),
            });
        }

        let on_complete = match self.completion_callback(session, generation, origin) {
            Ok(callback) => callback,
            Err(e) => {
                self.abandon_attempt(session, generation);
                return Err(e);
            }
        };
        let started = ports
            .media
            .create(room, &path, seek)
            .and_then(|source| source.play(on_complete).map(|()| source));
        let source = match started {
            Ok(source) => source,
            Err(e) => {
                self.abandon_attempt(session, generation);
                return Err(AppError::media(&path, e));
            }
        };
        session.install_source(generation, source);

        log::info!(
            "{}: playing {} from {:?} (generation {})",
            room,
            path.display(),
            seek,
            generation
        );

        ProgressReporter::ensure_running(session, &ports.notifier, self.inner.settings.progress_interval);
        self.publish_presence(session).await;
        Ok(())
    }

    /// Stops the active source, if any, and waits a bounded time for its
    /// completion report. Proceeds regardless once the budget runs out.
    async fn retire_previous(&self, session: &RoomSession) {
        let active = session.with_state(|s| {
            let active = s.has_active_source();
            if active {
                s.set_manual_stop(true);
            }
            active
        });
        if !active {
            session.discard_source();
            return;
        }

        session.stop_source();
        let settled = poll_until(self.inner.settings.stop_wait, || {
            session.with_state(|s| !s.has_active_source())
        })
        .await;
        if let Err(e) = settled {
            log::warn!("{}: previous source did not report its stop ({}); continuing", session.room(), e);
            session.with_state(|s| s.forget_active_source());
        }
        session.discard_source();
    }

    fn abandon_attempt(&self, session: &RoomSession, generation: u64) {
        session.with_state(|s| {
            if s.finish_generation(generation) {
                s.end_attempt();
            }
        });
    }

    /// Asks the source to stop. Returns false if none is active.
    fn stop_locked(&self, session: &RoomSession, manual: bool) -> bool {
        let active = session.with_state(|s| {
            let active = s.has_active_source();
            if active {
                s.set_manual_stop(manual);
            }
            active
        });
        if active {
            session.stop_source();
        }
        active
    }

    /// Manual stop plus a return to the stopped-but-selectable state.
    /// Returns true if anything was playing.
    fn halt_locked(&self, session: &RoomSession) -> bool {
        self.stop_locked(session, true);
        session.stop_reporter();
        session.with_state(|s| {
            let was_playing = s.is_playing();
            s.end_attempt();
            was_playing
        })
    }

    async fn shutdown_locked(&self, session: &RoomSession) {
        let room = session.room();
        session.close();
        self.stop_locked(session, true);
        session.discard_source();
        self.inner.ports.voice.disconnect(room).await;

        session.with_state(|s| {
            s.end_attempt();
            s.forget_active_source();
            s.clear_handles();
        });
        session.stop_reporter();
        self.inner.registry.remove(room);
        self.clear_presence().await;

        log::info!("{}: session closed", room);
    }

    // ===== Completion handling =====

    fn completion_callback(
        &self,
        session: &Arc<RoomSession>,
        generation: u64,
        origin: Origin,
    ) -> Result<CompletionCallback> {
        let runtime = Handle::try_current().map_err(|e| AppError::InternalError {
            message: format!("no async runtime for completion handling: {}", e),
        })?;
        let inner: Weak<Inner> = Arc::downgrade(&self.inner);
        let room: Weak<RoomSession> = Arc::downgrade(session);

        Ok(Box::new(move |outcome: PlaybackOutcome| {
            let (Some(inner), Some(session)) = (inner.upgrade(), room.upgrade()) else {
                return;
            };
            let completion = session.with_state(|s| classify(s, generation, outcome));
            let controller = TransportController { inner };
            controller.on_completion(&runtime, session, generation, origin, completion);
        }))
    }

    fn on_completion(
        self,
        runtime: &Handle,
        session: Arc<RoomSession>,
        generation: u64,
        origin: Origin,
        completion: Completion,
    ) {
        let room = session.room();
        match completion {
            Completion::Stale => {
                log::debug!("{}: ignoring report from superseded generation {}", room, generation);
            }
            Completion::EndedManual => {
                log::debug!("{}: generation {} stopped", room, generation);
            }
            Completion::Interrupted => {
                log::info!("{}: stream ended while paused; resume will re-play", room);
            }
            Completion::Errored(error) => {
                log::error!("{}: playback failed: {}", room, error);
                runtime.spawn(async move {
                    let current = session.with_state(|s| {
                        (s.generation() == generation).then(|| s.current_chapter_path().map(Path::to_path_buf))
                    });
                    let Some(path) = current else {
                        log::debug!("{}: failure of generation {} superseded", room, generation);
                        return;
                    };
                    if origin == Origin::User {
                        let message = AppError::media(path.unwrap_or_default(), error).user_message();
                        self.inner.ports.notifier.notice(room, &message).await;
                    }
                    self.clear_presence().await;
                });
            }
            Completion::EndedNatural => {
                log::debug!("{}: generation {} reached its end", room, generation);
                runtime.spawn(async move { self.auto_advance(session, generation).await });
            }
        }
    }

    /// Plays the next chapter after a natural end, or finishes the book
    async fn auto_advance(self, session: Arc<RoomSession>, generation: u64) {
        let room = session.room();
        let op = match session.begin_op("auto-advance").await {
            Ok(op) => op,
            Err(e) => {
                log::debug!("{}: auto-advance for generation {} dropped: {}", room, generation, e);
                return;
            }
        };

        enum Next {
            Superseded,
            Chapter(PathBuf),
            EndOfBook(Option<String>),
        }

        let next = session.with_state(|s| {
            if s.generation() != generation || s.has_active_source() || s.is_playing() {
                return Next::Superseded;
            }
            match s.adjacent_index(1).and_then(|index| s.select_index(index)) {
                Some(path) => Next::Chapter(path),
                None => {
                    s.end_attempt();
                    Next::EndOfBook(s.book_title().map(str::to_string))
                }
            }
        });

        match next {
            Next::Superseded => {
                log::debug!("{}: auto-advance for generation {} superseded", room, generation);
            }
            Next::Chapter(path) => {
                log::info!("{}: advancing to {}", room, path.display());
                if let Err(e) = self.play_locked(&session, &op, path, Duration::ZERO, Origin::AutoAdvance).await {
                    log::warn!("{}: auto-advance failed: {}", room, e);
                }
            }
            Next::EndOfBook(title) => {
                session.stop_reporter();
                self.clear_presence().await;
                publish(&session, self.inner.ports.notifier.as_ref(), &render(&session.snapshot(), Instant::now())).await;

                let notice = match title {
                    Some(title) => format!("Finished \"{}\".", title),
                    None => "Finished the book.".to_string(),
                };
                log::info!("{}: {}", room, notice);
                self.inner.ports.notifier.notice(room, &notice).await;
            }
        }
    }

    // ===== Notifier helpers =====

    async fn send_status(&self, session: &RoomSession) -> Result<MessageHandle> {
        let view = render(&session.snapshot(), Instant::now());
        let handle = self
            .inner
            .ports
            .notifier
            .send(session.room(), &view)
            .await
            .map_err(|e| AppError::NotifierError { message: e.to_string() })?;
        session.with_state(|s| s.track_handle(handle.clone()));
        Ok(handle)
    }

    async fn publish_presence(&self, session: &RoomSession) {
        if !self.inner.settings.presence_enabled {
            return;
        }
        let text = session.with_state(|s| presence_text(s, Instant::now()));
        self.inner.ports.notifier.set_presence(text.as_deref()).await;
    }

    async fn clear_presence(&self) {
        if self.inner.settings.presence_enabled {
            self.inner.ports.notifier.set_presence(None).await;
        }
    }
}

impl std::fmt::Debug for TransportController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportController")
            .field("rooms", &self.inner.registry.len())
            .field("settings", &self.inner.settings)
            .finish()
    }
}
