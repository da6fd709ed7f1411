// crates/resilience/src/error.rs
//! Error types for resilience operations

use thiserror::Error;

/// Result type for resilience operations
pub type ResilienceResult<T> = Result<T, ResilienceError>;

/// Errors that can occur in resilience operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResilienceError {
    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// A polled condition never became true
    #[error("Condition not met after {attempts} polls over {budget:?}")]
    PollExhausted {
        attempts: usize,
        budget: std::time::Duration,
    },

    /// Operation was cancelled
    #[error("Operation was cancelled")]
    Cancelled,
}
