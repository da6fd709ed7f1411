//! chaptercast player: per-room playback sessions and the transport
//! controller that drives them.
//!
//! - [`Session`]: the state of one room (book, chapter, position, flags)
//! - [`TransportController`]: play, pause, resume, scrub, chapter navigation, quit
//! - [`ProgressReporter`]: periodic status edits while a room plays
//! - [`render`]: pure session to view functions
//!
//! # Example
//!
//! ```rust,ignore
//! use chaptercast_player::{Ports, SessionRegistry, TransportController, TransportSettings};
//! use std::sync::Arc;
//!
//! let controller = TransportController::new(ports, Arc::new(SessionRegistry::new()), TransportSettings::default());
//! let books = controller.open_player(room, target).await?;
//! let chapters = controller.select_book(room, &book_path).await?;
//! controller.select_chapter(room, 0).await?;
//! ```

mod completion;
mod registry;
pub mod render;
mod reporter;
mod room;
mod session;
mod settings;
mod transport;

pub use completion::{classify, Completion};
pub use registry::SessionRegistry;
pub use reporter::{ProgressReporter, Tick};
pub use room::RoomSession;
pub use session::Session;
pub use settings::TransportSettings;
pub use transport::{Ports, TransportController};
