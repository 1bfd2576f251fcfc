//! Channel messages for actsync.
//!
//! The channel carries named events with a JSON body. [`EventName`] is the
//! discriminator; [`Outbound`] and [`Inbound`] pair each name with its body.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ActionPacket, SessionId, SyncError};

/// Event names used on the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventName {
    /// Client asks to join the task room.
    Register,
    /// Backend confirms registration with the authoritative task state.
    Registered,
    /// Client sends an action packet.
    Sync,
    /// Backend broadcasts an acknowledged packet.
    Synced,
}

impl EventName {
    /// The name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::Register => "register",
            EventName::Registered => "registered",
            EventName::Sync => "sync",
            EventName::Synced => "synced",
        }
    }
}

impl TryFrom<&str> for EventName {
    type Error = SyncError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "register" => Ok(EventName::Register),
            "registered" => Ok(EventName::Registered),
            "sync" => Ok(EventName::Sync),
            "synced" => Ok(EventName::Synced),
            other => Err(SyncError::UnknownEvent(other.to_string())),
        }
    }
}

impl std::fmt::Display for EventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registration request sent after the channel connects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Project the task belongs to
    pub project_name: String,
    /// Index of the task within the project
    pub task_index: u64,
    /// Registering session
    pub session_id: SessionId,
    /// User identity
    pub user_id: String,
    /// Origin address of the client
    pub address: String,
    /// Always false for interactive clients
    pub bot: bool,
}

/// Registration confirmation carrying the authoritative task state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterAck {
    /// Task state as the backend currently holds it
    #[serde(default)]
    pub task_state: Value,
}

/// A packet submitted for synchronization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncRequest {
    /// Task the packet applies to
    pub task_id: String,
    /// Project the task belongs to
    pub project_name: String,
    /// Sending session
    pub session_id: SessionId,
    /// The packet
    pub actions: ActionPacket,
    /// Always false for interactive clients
    pub bot: bool,
}

/// Backend broadcast of an acknowledged packet.
///
/// Every session registered on the task receives it, including the sender.
/// It may be delivered more than once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncAck {
    /// Session that originally sent the packet
    pub session_id: SessionId,
    /// The acknowledged packet
    pub actions: ActionPacket,
}

/// Messages the client emits.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// Registration request
    Register(RegisterRequest),
    /// Packet submission
    Sync(SyncRequest),
}

impl Outbound {
    /// The channel event this message is emitted under.
    pub fn event(&self) -> EventName {
        match self {
            Outbound::Register(_) => EventName::Register,
            Outbound::Sync(_) => EventName::Sync,
        }
    }

    /// Serialize the body to JSON bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SyncError> {
        match self {
            Outbound::Register(body) => serde_json::to_vec(body),
            Outbound::Sync(body) => serde_json::to_vec(body),
        }
        .map_err(SyncError::Serialization)
    }
}

/// Messages the client receives.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Registration confirmed
    Registered(RegisterAck),
    /// Packet acknowledged
    Synced(SyncAck),
}

impl Inbound {
    /// Decode an inbound event body.
    ///
    /// # Errors
    ///
    /// Fails for unknown or outbound-only event names and malformed JSON.
    pub fn decode(event: &str, payload: &[u8]) -> Result<Self, SyncError> {
        match EventName::try_from(event)? {
            EventName::Registered => serde_json::from_slice(payload)
                .map(Inbound::Registered)
                .map_err(SyncError::Deserialization),
            EventName::Synced => serde_json::from_slice(payload)
                .map(Inbound::Synced)
                .map_err(SyncError::Deserialization),
            name @ (EventName::Register | EventName::Sync) => Err(SyncError::UnexpectedEvent {
                event: name.to_string(),
                direction: "inbound",
            }),
        }
    }

    /// The channel event this message arrives under.
    pub fn event(&self) -> EventName {
        match self {
            Inbound::Registered(_) => EventName::Registered,
            Inbound::Synced(_) => EventName::Synced,
        }
    }

    /// Serialize the body to JSON bytes (used by test backends).
    pub fn to_bytes(&self) -> Result<Vec<u8>, SyncError> {
        match self {
            Inbound::Registered(body) => serde_json::to_vec(body),
            Inbound::Synced(body) => serde_json::to_vec(body),
        }
        .map_err(SyncError::Serialization)
    }
}
