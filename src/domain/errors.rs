//! Error types for the live feed core.

use thiserror::Error;

/// Errors surfaced by the feed core.
///
/// Transport failures are recovered internally via bounded reconnection and
/// reach callers only as `connection`-category notifications; these variants
/// exist for the places where an error is a value (parse results, handler
/// returns), not for synchronous throwing.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The underlying channel failed (connect refused, socket dropped).
    #[error("transport failure: {0}")]
    Transport(String),

    /// An inbound frame failed JSON or shape parsing and was dropped.
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    /// The reconnect budget for this manager instance is spent.
    ///
    /// Terminal for the instance; construct a new manager to retry.
    #[error("retry budget exhausted after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    /// A subscriber callback reported a failure while processing an envelope.
    ///
    /// Logged by the dispatcher; never stops delivery to other subscribers.
    #[error("handler '{handler}' failed: {reason}")]
    HandlerFailed {
        handler: &'static str,
        reason: String,
    },
}

impl FeedError {
    /// Wraps a decode failure as a malformed-message error.
    pub fn malformed(err: impl std::fmt::Display) -> Self {
        FeedError::MalformedMessage(err.to_string())
    }

    /// Wraps a transport-level failure.
    pub fn transport(err: impl std::fmt::Display) -> Self {
        FeedError::Transport(err.to_string())
    }
}
