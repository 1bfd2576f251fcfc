//! Error types for actsync.

use thiserror::Error;

/// Errors that can occur when building or decoding actsync data.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A packet must carry at least one action
    #[error("packet has no actions")]
    EmptyPacket,

    /// JSON serialization failed
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// JSON deserialization failed
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// Inbound event name the protocol does not know
    #[error("unknown event: {0}")]
    UnknownEvent(String),

    /// Event that is known but cannot arrive in this direction
    #[error("unexpected {direction} event: {event}")]
    UnexpectedEvent {
        /// The event name received.
        event: String,
        /// "inbound" or "outbound".
        direction: &'static str,
    },
}
