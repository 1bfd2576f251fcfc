//! Transport abstraction for actsync.
//!
//! This module provides a pluggable channel layer that abstracts the
//! underlying connection mechanism (socket server, mock for testing).
//!
//! # Design
//!
//! The transport trait is async and event-oriented:
//! - `connect()` establishes a connection
//! - `emit()` sends a named event with a JSON body
//! - `next_event()` yields connect, message and disconnect notifications
//! - `close()` gracefully terminates
//!
//! Delivery is assumed at-least-once. Losses are recovered by the
//! synchronizer's resend on reconnect, never by the transport.
//!
//! # Example
//!
//! ```ignore
//! let transport = MockTransport::new();
//! transport.connect("ws://localhost:5000").await?;
//! transport.emit("sync", &body).await?;
//! let event = transport.next_event().await?;
//! ```

mod mock;

pub use mock::MockTransport;

use async_trait::async_trait;
use thiserror::Error;

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Not connected.
    #[error("not connected")]
    NotConnected,

    /// Connection closed; no further events will arrive.
    #[error("connection closed")]
    ConnectionClosed,

    /// Emit failed.
    #[error("emit failed: {0}")]
    EmitFailed(String),
}

/// Notification delivered by the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// The channel (re)connected.
    Connected,
    /// A named event with a JSON body.
    Message {
        /// Event name (e.g. `"synced"`).
        event: String,
        /// JSON body.
        payload: Vec<u8>,
    },
    /// The channel dropped.
    Disconnected {
        /// Reason reported by the transport.
        reason: String,
    },
}

/// Transport trait for the actsync channel.
///
/// Implementations deliver events one at a time, in order.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Connect to the backend at `address`.
    async fn connect(&self, address: &str) -> Result<(), TransportError>;

    /// Emit a named event with a JSON body.
    async fn emit(&self, event: &str, payload: &[u8]) -> Result<(), TransportError>;

    /// Wait for the next channel event.
    ///
    /// Returns [`TransportError::ConnectionClosed`] once the channel is
    /// closed for good.
    async fn next_event(&self) -> Result<ChannelEvent, TransportError>;

    /// Check if currently connected.
    fn is_connected(&self) -> bool;

    /// Close the connection gracefully.
    async fn close(&self) -> Result<(), TransportError>;
}
