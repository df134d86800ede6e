//! Client-to-server message types for the feed protocol.
//!
//! Outbound traffic is best-effort by design: the platform only ever sends
//! non-critical pings and state requests upstream, so a message composed
//! while the connection is down is dropped, not queued.

use serde::Serialize;

use crate::domain::Timestamp;

/// All message types the client may send to the server.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Heartbeat request.
    Ping { timestamp: Timestamp },

    /// Request a full dashboard state push (after reconnection).
    RequestState,
}

impl ClientMessage {
    /// Builds a ping stamped with the current time.
    pub fn ping() -> Self {
        ClientMessage::Ping {
            timestamp: Timestamp::now(),
        }
    }
}

/// Named outcome of a send attempt.
///
/// The drop case is an expected policy outcome, not an error; it exists so
/// callers and tests can observe the drop instead of inferring it from
/// silence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The message was handed to the transport.
    Sent,
    /// The connection was not open; the message was discarded.
    DroppedDisconnected,
}

impl SendOutcome {
    /// True if the message reached the transport.
    pub fn is_sent(&self) -> bool {
        matches!(self, SendOutcome::Sent)
    }
}
