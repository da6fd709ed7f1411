//! Console stand-ins for the chat service, the voice gateway and the audio
//! stream, so the player can run in a terminal.

use async_trait::async_trait;
use chaptercast_core::{
    CompletionCallback, MediaError, MediaSource, MediaSourceFactory, MessageHandle, Notifier,
    NotifyError, PlaybackOutcome, RoomId, StatusView, VoiceError, VoiceGateway, VoiceTarget,
};
use chaptercast_library::LoftyMetadataProvider;
use console::style;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

// ===== Notifier =====

/// Prints status messages and notices to stdout
pub struct ConsoleNotifier {
    name: String,
    next_id: AtomicU64,
}

impl ConsoleNotifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            next_id: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn send(&self, room: RoomId, view: &StatusView) -> Result<MessageHandle, NotifyError> {
        let handle = MessageHandle::new(format!("msg-{}", self.next_id.fetch_add(1, Ordering::Relaxed)));
        println!("\n{} {}", style(format!("[{} {}]", room, handle)).dim(), style(&self.name).bold());
        println!("{}", view.to_text());
        if let Some(synopsis) = &view.synopsis {
            println!("{}", style(synopsis).italic());
        }
        if let Some(cover) = &view.cover {
            println!("{}", style(format!("[cover art, {} bytes]", cover.len())).dim());
        }
        Ok(handle)
    }

    async fn edit(&self, handle: &MessageHandle, view: &StatusView) -> Result<(), NotifyError> {
        log::debug!("{} <- {}", handle, view.to_text().replace('\n', " | "));
        Ok(())
    }

    async fn notice(&self, room: RoomId, text: &str) {
        println!("{} {}", style(format!("[{}]", room)).dim(), style(text).yellow());
    }

    async fn set_presence(&self, text: Option<&str>) {
        match text {
            Some(text) => log::info!("presence: {}", text),
            None => log::info!("presence cleared"),
        }
    }
}

// ===== Voice =====

/// Remembers which target each room joined; connecting always succeeds
#[derive(Default)]
pub struct LoopbackVoice {
    links: Mutex<HashMap<RoomId, VoiceTarget>>,
}

impl LoopbackVoice {
    fn links(&self) -> std::sync::MutexGuard<'_, HashMap<RoomId, VoiceTarget>> {
        self.links.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl VoiceGateway for LoopbackVoice {
    async fn connect(&self, room: RoomId, target: VoiceTarget) -> Result<(), VoiceError> {
        log::info!("{} joined {}", room, target);
        self.links().insert(room, target);
        Ok(())
    }

    async fn disconnect(&self, room: RoomId) {
        if let Some(target) = self.links().remove(&room) {
            log::info!("{} left {}", room, target);
        }
    }

    fn connected_target(&self, room: RoomId) -> Option<VoiceTarget> {
        self.links().get(&room).copied()
    }
}

// ===== Media =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Idle,
    Playing,
    Paused,
    Stopped,
}

/// Builds [`ClockedSource`]s that "play" for the chapter's tagged duration
#[derive(Debug, Default)]
pub struct ClockedMediaFactory {
    fixed: Option<Duration>,
}

impl ClockedMediaFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every chapter lasts `duration`, regardless of its tags
    pub fn with_duration(duration: Duration) -> Self {
        Self { fixed: Some(duration) }
    }

    fn duration_of(&self, path: &Path) -> Result<Duration, MediaError> {
        if let Some(fixed) = self.fixed {
            return Ok(fixed);
        }
        let metadata = LoftyMetadataProvider::read(path).map_err(|e| MediaError::Open(e.to_string()))?;
        if metadata.duration.is_zero() {
            return Err(MediaError::Decode(format!("{}: unknown duration", path.display())));
        }
        Ok(metadata.duration)
    }
}

impl MediaSourceFactory for ClockedMediaFactory {
    fn create(&self, room: RoomId, path: &Path, start_offset: Duration) -> Result<Box<dyn MediaSource>, MediaError> {
        let duration = self.duration_of(path)?;
        log::debug!("{}: clocked source for {} at {:?}", room, path.display(), start_offset);
        Ok(Box::new(ClockedSource::new(path, duration.saturating_sub(start_offset))))
    }
}

/// A media source that ends once its remaining time has elapsed on the
/// tokio clock. Pausing stops the clock.
pub struct ClockedSource {
    path: PathBuf,
    remaining: Duration,
    control: watch::Sender<Control>,
}

impl ClockedSource {
    pub fn new(path: &Path, remaining: Duration) -> Self {
        let (control, _) = watch::channel(Control::Idle);
        Self {
            path: path.to_path_buf(),
            remaining,
            control,
        }
    }
}

impl MediaSource for ClockedSource {
    fn play(&self, on_complete: CompletionCallback) -> Result<(), MediaError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| MediaError::Stream(e.to_string()))?;
        let mut control = self.control.subscribe();
        let mut remaining = self.remaining;
        let path = self.path.clone();
        self.control.send_replace(Control::Playing);

        runtime.spawn(async move {
            loop {
                let state = *control.borrow_and_update();
                match state {
                    Control::Stopped => break,
                    Control::Idle | Control::Paused => {
                        if control.changed().await.is_err() {
                            break;
                        }
                    }
                    Control::Playing => {
                        let started = Instant::now();
                        tokio::select! {
                            _ = tokio::time::sleep(remaining) => {
                                log::debug!("{} finished", path.display());
                                break;
                            }
                            changed = control.changed() => {
                                remaining = remaining.saturating_sub(started.elapsed());
                                if changed.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                }
            }
            on_complete(PlaybackOutcome::Ended);
        });
        Ok(())
    }

    fn stop(&self) {
        self.control.send_replace(Control::Stopped);
    }

    fn pause(&self) {
        self.control.send_if_modified(|state| {
            let playing = *state == Control::Playing;
            if playing {
                *state = Control::Paused;
            }
            playing
        });
    }

    fn resume(&self) {
        self.control.send_if_modified(|state| {
            let paused = *state == Control::Paused;
            if paused {
                *state = Control::Playing;
            }
            paused
        });
    }
}
