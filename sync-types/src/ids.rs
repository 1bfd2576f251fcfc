//! Identity types for actsync.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one client session.
///
/// Assigned by the host application (or generated at startup). Every action
/// records the session that produced it so that acknowledgments can tell
/// local edits apart from edits made elsewhere.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Create a SessionId from any string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create a random SessionId (UUID v4 text).
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Borrow the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", self.0)
    }
}

/// A unique identifier for an action packet.
///
/// UUID v4 format, generated client-side. The backend deduplicates
/// deliveries by this value, so it must never be reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PacketId(uuid::Uuid);

impl PacketId {
    /// Create a new random PacketId.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Create a PacketId from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        uuid::Uuid::from_slice(bytes).ok().map(Self)
    }

    /// Get the raw bytes of this PacketId.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for PacketId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PacketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for PacketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PacketId({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packet_id_is_uuid_v4() {
        let id = PacketId::new();
        assert_eq!(id.as_bytes().len(), 16);
        assert_eq!(id.as_uuid().get_version_num(), 4);
    }

    #[test]
    fn packet_ids_are_unique() {
        let ids: std::collections::HashSet<PacketId> = (0..1000).map(|_| PacketId::new()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn packet_id_from_invalid_length_fails() {
        assert!(PacketId::from_bytes(&[0u8; 8]).is_none());
    }

    #[test]
    fn packet_id_serializes_as_plain_string() {
        let id = PacketId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
    }

    #[test]
    fn session_id_display_is_raw_text() {
        let id = SessionId::from("s1");
        assert_eq!(id.to_string(), "s1");
        assert_eq!(format!("{:?}", id), "SessionId(s1)");
    }

    #[test]
    fn random_session_ids_differ() {
        assert_ne!(SessionId::random(), SessionId::random());
    }
}
