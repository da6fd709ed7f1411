//! In-memory collaborators for transport tests

#![allow(dead_code)]

use async_trait::async_trait;
use chaptercast_core::{
    BookEntry, CatalogProvider, ChapterMetadata, CompletionCallback, LibraryEntry, MediaError,
    MediaSource, MediaSourceFactory, MessageHandle, MetadataProvider, Notifier, NotifyError,
    PlaybackOutcome, Result, RoomId, StatusView, VoiceError, VoiceGateway, VoiceTarget,
};
use chaptercast_player::{Ports, SessionRegistry, TransportController, TransportSettings};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const ROOM: RoomId = RoomId::new(100);
pub const TARGET: VoiceTarget = VoiceTarget::new(200);
pub const CHAPTER_SECS: u64 = 600;

// ===== Voice =====

#[derive(Default)]
pub struct FakeVoice {
    links: Mutex<HashMap<RoomId, VoiceTarget>>,
    pub connects: AtomicUsize,
    pub disconnects: AtomicUsize,
    /// Connect never completes
    pub hang: AtomicBool,
    /// Errors returned by the next connects, in order
    pub failures: Mutex<Vec<VoiceError>>,
}

impl FakeVoice {
    /// Simulates the link dropping underneath the player
    pub fn drop_link(&self, room: RoomId) {
        self.links.lock().unwrap().remove(&room);
    }
}

#[async_trait]
impl VoiceGateway for FakeVoice {
    async fn connect(&self, room: RoomId, target: VoiceTarget) -> std::result::Result<(), VoiceError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        let failure = {
            let mut failures = self.failures.lock().unwrap();
            (!failures.is_empty()).then(|| failures.remove(0))
        };
        if let Some(e) = failure {
            return Err(e);
        }
        self.links.lock().unwrap().insert(room, target);
        Ok(())
    }

    async fn disconnect(&self, room: RoomId) {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        self.links.lock().unwrap().remove(&room);
    }

    fn connected_target(&self, room: RoomId) -> Option<VoiceTarget> {
        self.links.lock().unwrap().get(&room).copied()
    }
}

// ===== Media =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopMode {
    /// The stop is reported before `stop()` returns
    Immediate,
    /// The stop is reported after a delay
    Delayed(Duration),
    /// The stop is never reported
    Never,
    /// The stop is reported as a stream failure, like a killed decoder
    Fails,
}

pub struct SourceState {
    pub path: PathBuf,
    pub seek: Duration,
    callback: Mutex<Option<CompletionCallback>>,
    pub stop_requested: AtomicBool,
    pub paused: AtomicBool,
    stop_mode: StopMode,
    active: Arc<AtomicUsize>,
}

impl SourceState {
    /// Fires the completion callback. Returns false if it already fired.
    pub fn finish(&self, outcome: PlaybackOutcome) -> bool {
        let callback = self.callback.lock().unwrap().take();
        match callback {
            Some(callback) => {
                self.active.fetch_sub(1, Ordering::SeqCst);
                callback(outcome);
                true
            }
            None => false,
        }
    }

    pub fn is_live(&self) -> bool {
        self.callback.lock().unwrap().is_some()
    }
}

struct FakeSource(Arc<SourceState>);

impl MediaSource for FakeSource {
    fn play(&self, on_complete: CompletionCallback) -> std::result::Result<(), MediaError> {
        *self.0.callback.lock().unwrap() = Some(on_complete);
        self.0.active.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) {
        self.0.stop_requested.store(true, Ordering::SeqCst);
        match self.0.stop_mode {
            StopMode::Immediate => {
                self.0.finish(PlaybackOutcome::Ended);
            }
            StopMode::Delayed(delay) => {
                let state = Arc::clone(&self.0);
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    state.finish(PlaybackOutcome::Ended);
                });
            }
            StopMode::Never => {}
            StopMode::Fails => {
                self.0.finish(PlaybackOutcome::Failed(MediaError::Stream("killed".into())));
            }
        }
    }

    fn pause(&self) {
        self.0.paused.store(true, Ordering::SeqCst);
    }

    fn resume(&self) {
        self.0.paused.store(false, Ordering::SeqCst);
    }
}

pub struct FakeMedia {
    sources: Mutex<Vec<Arc<SourceState>>>,
    stop_mode: Mutex<StopMode>,
    pub fail_create: AtomicBool,
    active: Arc<AtomicUsize>,
    max_active: AtomicUsize,
}

impl Default for FakeMedia {
    fn default() -> Self {
        Self {
            sources: Mutex::new(Vec::new()),
            stop_mode: Mutex::new(StopMode::Immediate),
            fail_create: AtomicBool::new(false),
            active: Arc::new(AtomicUsize::new(0)),
            max_active: AtomicUsize::new(0),
        }
    }
}

impl FakeMedia {
    pub fn set_stop_mode(&self, mode: StopMode) {
        *self.stop_mode.lock().unwrap() = mode;
    }

    pub fn created(&self) -> usize {
        self.sources.lock().unwrap().len()
    }

    pub fn source(&self, index: usize) -> Arc<SourceState> {
        Arc::clone(&self.sources.lock().unwrap()[index])
    }

    pub fn last(&self) -> Arc<SourceState> {
        Arc::clone(self.sources.lock().unwrap().last().expect("no source created"))
    }

    pub fn live(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously started sources, sampled at creation
    pub fn max_live(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

impl MediaSourceFactory for FakeMedia {
    fn create(
        &self,
        _room: RoomId,
        path: &Path,
        start_offset: Duration,
    ) -> std::result::Result<Box<dyn MediaSource>, MediaError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(MediaError::Open(path.display().to_string()));
        }
        self.max_active
            .fetch_max(self.active.load(Ordering::SeqCst) + 1, Ordering::SeqCst);

        let state = Arc::new(SourceState {
            path: path.to_path_buf(),
            seek: start_offset,
            callback: Mutex::new(None),
            stop_requested: AtomicBool::new(false),
            paused: AtomicBool::new(false),
            stop_mode: *self.stop_mode.lock().unwrap(),
            active: Arc::clone(&self.active),
        });
        self.sources.lock().unwrap().push(Arc::clone(&state));
        Ok(Box::new(FakeSource(state)))
    }
}

// ===== Notifier =====

#[derive(Default)]
pub struct FakeNotifier {
    pub sent: Mutex<Vec<(RoomId, StatusView, MessageHandle)>>,
    pub edits: Mutex<Vec<(MessageHandle, StatusView)>>,
    pub notices: Mutex<Vec<(RoomId, String)>>,
    pub presence: Mutex<Vec<Option<String>>>,
    /// Edits of these handles fail with the given error
    pub failing: Mutex<HashMap<MessageHandle, NotifyError>>,
}

impl FakeNotifier {
    pub fn fail_edits(&self, handle: &MessageHandle, error: NotifyError) {
        self.failing.lock().unwrap().insert(handle.clone(), error);
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().unwrap().iter().map(|(_, text)| text.clone()).collect()
    }

    pub fn edits_of(&self, handle: &MessageHandle) -> usize {
        self.edits.lock().unwrap().iter().filter(|(h, _)| h == handle).count()
    }

    pub fn last_presence(&self) -> Option<Option<String>> {
        self.presence.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn send(&self, room: RoomId, view: &StatusView) -> std::result::Result<MessageHandle, NotifyError> {
        let handle = MessageHandle::generate();
        self.sent.lock().unwrap().push((room, view.clone(), handle.clone()));
        Ok(handle)
    }

    async fn edit(&self, handle: &MessageHandle, view: &StatusView) -> std::result::Result<(), NotifyError> {
        if let Some(error) = self.failing.lock().unwrap().get(handle) {
            return Err(error.clone());
        }
        self.edits.lock().unwrap().push((handle.clone(), view.clone()));
        Ok(())
    }

    async fn notice(&self, room: RoomId, text: &str) {
        self.notices.lock().unwrap().push((room, text.to_string()));
    }

    async fn set_presence(&self, text: Option<&str>) {
        self.presence.lock().unwrap().push(text.map(str::to_string));
    }
}

// ===== Library =====

/// Chapter tags keyed by path; unknown paths get fallback metadata
/// with a [`CHAPTER_SECS`] duration
#[derive(Default)]
pub struct FakeMetadata {
    pub tags: Mutex<HashMap<PathBuf, ChapterMetadata>>,
    pub probes: AtomicUsize,
}

#[async_trait]
impl MetadataProvider for FakeMetadata {
    async fn probe(&self, path: &Path) -> ChapterMetadata {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.tags.lock().unwrap().get(path).cloned().unwrap_or_else(|| ChapterMetadata {
            duration: Duration::from_secs(CHAPTER_SECS),
            ..ChapterMetadata::fallback(path)
        })
    }
}

#[derive(Default)]
pub struct FakeCatalog {
    pub entries: Mutex<Vec<LibraryEntry>>,
    pub books: Mutex<HashMap<PathBuf, Vec<PathBuf>>>,
}

#[async_trait]
impl CatalogProvider for FakeCatalog {
    async fn scan(&self, _root: &Path) -> Result<Vec<LibraryEntry>> {
        Ok(self.entries.lock().unwrap().clone())
    }

    async fn list_chapters(&self, book: &Path) -> Result<Vec<PathBuf>> {
        Ok(self.books.lock().unwrap().get(book).cloned().unwrap_or_default())
    }
}

// ===== Harness =====

pub struct Harness {
    pub controller: TransportController,
    pub voice: Arc<FakeVoice>,
    pub media: Arc<FakeMedia>,
    pub notifier: Arc<FakeNotifier>,
    pub metadata: Arc<FakeMetadata>,
    pub catalog: Arc<FakeCatalog>,
}

pub fn book_path() -> PathBuf {
    PathBuf::from("/library/Frank Herbert/Dune")
}

pub fn chapter_path(n: usize) -> PathBuf {
    book_path().join(format!("{:02}.m4b", n))
}

impl Harness {
    pub fn new() -> Self {
        Self::with_settings(TransportSettings::default().with_library_root("/library"))
    }

    pub fn with_settings(settings: TransportSettings) -> Self {
        let voice = Arc::new(FakeVoice::default());
        let media = Arc::new(FakeMedia::default());
        let notifier = Arc::new(FakeNotifier::default());
        let metadata = Arc::new(FakeMetadata::default());
        let catalog = Arc::new(FakeCatalog::default());

        let ports = Ports {
            voice: voice.clone(),
            media: media.clone(),
            metadata: metadata.clone(),
            catalog: catalog.clone(),
            notifier: notifier.clone(),
        };
        let controller = TransportController::new(ports, Arc::new(SessionRegistry::new()), settings);

        Self {
            controller,
            voice,
            media,
            notifier,
            metadata,
            catalog,
        }
    }

    /// Stocks the library with one book of `chapters` chapters
    pub fn stock(&self, chapters: usize) {
        self.catalog.entries.lock().unwrap().push(LibraryEntry::Book(BookEntry::new(
            "Dune",
            "Frank Herbert",
            book_path(),
        )));
        let files = (1..=chapters).map(chapter_path).collect();
        self.catalog.books.lock().unwrap().insert(book_path(), files);
    }

    /// Opens the player and selects the stocked book
    pub async fn open_book(&self, chapters: usize) {
        self.stock(chapters);
        self.controller.open_player(ROOM, TARGET).await.unwrap();
        self.controller.select_book(ROOM, &book_path()).await.unwrap();
    }

    /// Opens the stocked book and starts chapter `index`
    pub async fn playing(&self, chapters: usize, index: usize) {
        self.open_book(chapters).await;
        self.controller.select_chapter(ROOM, index).await.unwrap();
    }

    pub fn session(&self) -> chaptercast_player::Session {
        self.controller.snapshot(ROOM).expect("room has a session")
    }
}

/// Lets spawned tasks run without moving paused time past real timers
pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}
