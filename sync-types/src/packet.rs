//! Action packets: the unit of transmission and acknowledgment.

use serde::{Deserialize, Serialize};

use crate::{Action, PacketId, SyncError};

/// An immutable batch of actions sent and acknowledged together.
///
/// `trigger_id` points at the packet whose acknowledgment caused this one to
/// be created (for example a compute result answering a user edit).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPacket {
    id: PacketId,
    actions: Vec<Action>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trigger_id: Option<PacketId>,
}

impl ActionPacket {
    /// Create a packet with a fresh identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::EmptyPacket`] if `actions` is empty.
    pub fn new(actions: Vec<Action>) -> Result<Self, SyncError> {
        Self::with_trigger(actions, None)
    }

    /// Create a packet correlated to the packet `trigger_id`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::EmptyPacket`] if `actions` is empty.
    pub fn with_trigger(
        actions: Vec<Action>,
        trigger_id: Option<PacketId>,
    ) -> Result<Self, SyncError> {
        if actions.is_empty() {
            return Err(SyncError::EmptyPacket);
        }
        Ok(Self {
            id: PacketId::new(),
            actions,
            trigger_id,
        })
    }

    /// The packet identifier.
    pub fn id(&self) -> PacketId {
        self.id
    }

    /// The actions, in the order they were queued.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// The packet this one answers, if any.
    pub fn trigger_id(&self) -> Option<PacketId> {
        self.trigger_id
    }

    /// Consume the packet, returning its actions.
    pub fn into_actions(self) -> Vec<Action> {
        self.actions
    }

    /// Number of actions in the packet.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Always false for packets built through [`ActionPacket::new`]; decoded
    /// packets are not re-validated.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// True if any action submits the task.
    pub fn contains_submit(&self) -> bool {
        self.actions.iter().any(Action::is_submit)
    }
}
