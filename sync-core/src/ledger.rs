//! Ledger of backend-confirmed actions.
//!
//! The ledger records actions in the order acknowledgments arrive, which is
//! the backend's broadcast order, not the order this client created them.
//! It also remembers which packets were already processed so a re-delivered
//! acknowledgment is never applied twice.

use std::collections::HashSet;

use actsync_types::{Action, PacketId};

/// Append-only log of confirmed actions plus the processed-packet set.
#[derive(Debug, Default)]
pub struct AckLedger {
    actions: Vec<Action>,
    processed: HashSet<PacketId>,
}

impl AckLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a packet's acknowledgment was already processed.
    pub fn is_processed(&self, id: &PacketId) -> bool {
        self.processed.contains(id)
    }

    /// Mark a packet as processed.
    ///
    /// Returns `false` if it already was; the caller must then skip it.
    pub fn mark_processed(&mut self, id: PacketId) -> bool {
        self.processed.insert(id)
    }

    /// Append a confirmed action.
    pub fn append(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Confirmed actions in backend order.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Number of confirmed actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Check if nothing was confirmed yet.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Number of distinct packets processed.
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }
}
