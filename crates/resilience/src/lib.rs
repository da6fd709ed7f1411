// crates/resilience/src/lib.rs
//! Resilience patterns for the player's suspension points
//!
//! - Bounded timeout around an awaited operation (voice connect)
//! - Bounded polling for a condition observed from elsewhere (stop confirmation)
//! - Retry with exponential backoff (reconnect on resume)
//!
//! # Example
//!
//! ```rust
//! use chaptercast_resilience::{PollPolicy, RetryPolicy, Timeout};
//! use std::time::Duration;
//!
//! let connect = Timeout::new(Duration::from_secs(20));
//! let stop_wait = PollPolicy::new(Duration::from_secs(2), Duration::from_millis(100));
//! let reconnect = RetryPolicy::new(2).with_initial_delay(Duration::from_millis(500));
//! # let _ = (connect, stop_wait, reconnect);
//! ```

mod error;
mod poll;
mod retry;
mod timeout;

pub use error::{ResilienceError, ResilienceResult};
pub use poll::{poll_until, PollPolicy};
pub use retry::{with_retry, RetryPolicy};
pub use timeout::{with_timeout, Timeout};
