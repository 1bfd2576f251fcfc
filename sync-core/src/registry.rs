//! Registry of packets sent but not yet acknowledged.
//!
//! Order matters: reconnection replays and resends pending packets in the
//! order they were first sent. The registry therefore keeps an explicit list
//! of identifiers next to the lookup map and updates both together.

use std::collections::HashMap;

use actsync_types::{ActionPacket, PacketId};

/// Insertion-ordered map of in-flight packets.
#[derive(Debug, Default)]
pub struct PendingRegistry {
    /// Packet ids in original send order.
    order: Vec<PacketId>,
    /// Packets by id.
    packets: HashMap<PacketId, ActionPacket>,
}

impl PendingRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a packet as in flight.
    ///
    /// Identifiers are unique per packet, so re-inserting one is not
    /// expected. If it happens the stored packet is replaced and keeps its
    /// original position. Returns `false` in that case.
    pub fn insert(&mut self, packet: ActionPacket) -> bool {
        let id = packet.id();
        let fresh = self.packets.insert(id, packet).is_none();
        if fresh {
            self.order.push(id);
        }
        fresh
    }

    /// Remove an acknowledged packet. Removing an unknown id is a no-op.
    pub fn remove(&mut self, id: &PacketId) -> Option<ActionPacket> {
        let packet = self.packets.remove(id)?;
        self.order.retain(|pending| pending != id);
        Some(packet)
    }

    /// Check if a packet is still awaiting acknowledgment.
    pub fn contains(&self, id: &PacketId) -> bool {
        self.packets.contains_key(id)
    }

    /// Look up a pending packet.
    pub fn get(&self, id: &PacketId) -> Option<&ActionPacket> {
        self.packets.get(id)
    }

    /// Pending packets in original send order.
    pub fn iter(&self) -> impl Iterator<Item = &ActionPacket> + '_ {
        self.order.iter().filter_map(|id| self.packets.get(id))
    }

    /// Pending packets in original send order, collected.
    pub fn list_pending(&self) -> Vec<&ActionPacket> {
        self.iter().collect()
    }

    /// Number of pending packets.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if nothing is awaiting acknowledgment.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actsync_types::{Action, SessionId};
    use serde_json::Value;

    fn packet(name: &str) -> ActionPacket {
        ActionPacket::new(vec![Action::task(name, SessionId::from("s1"), Value::Null)]).unwrap()
    }

    fn names(registry: &PendingRegistry) -> Vec<String> {
        registry
            .iter()
            .map(|p| p.actions()[0].name.clone())
            .collect()
    }

    #[test]
    fn lists_in_insertion_order() {
        let mut registry = PendingRegistry::new();
        for name in ["p1", "p2", "p3", "p4"] {
            assert!(registry.insert(packet(name)));
        }

        assert_eq!(names(&registry), vec!["p1", "p2", "p3", "p4"]);
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn removal_keeps_relative_order() {
        let mut registry = PendingRegistry::new();
        let p1 = packet("p1");
        let p2 = packet("p2");
        let p3 = packet("p3");
        let id2 = p2.id();
        registry.insert(p1);
        registry.insert(p2);
        registry.insert(p3);

        let removed = registry.remove(&id2).unwrap();
        assert_eq!(removed.id(), id2);
        assert!(!registry.contains(&id2));
        assert_eq!(names(&registry), vec!["p1", "p3"]);
    }

    #[test]
    fn removing_unknown_id_is_no_op() {
        let mut registry = PendingRegistry::new();
        registry.insert(packet("p1"));

        assert!(registry.remove(&PacketId::new()).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn repeated_removal_is_safe() {
        let mut registry = PendingRegistry::new();
        let p1 = packet("p1");
        let id = p1.id();
        registry.insert(p1);

        assert!(registry.remove(&id).is_some());
        assert!(registry.remove(&id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn reinsert_keeps_original_position() {
        let mut registry = PendingRegistry::new();
        let p1 = packet("p1");
        let dup = p1.clone();
        registry.insert(p1);
        registry.insert(packet("p2"));

        assert!(!registry.insert(dup));
        assert_eq!(registry.len(), 2);
        assert_eq!(names(&registry), vec!["p1", "p2"]);
    }

    #[test]
    fn get_returns_pending_packet() {
        let mut registry = PendingRegistry::new();
        let p1 = packet("p1");
        let id = p1.id();
        registry.insert(p1);

        assert_eq!(registry.get(&id).map(|p| p.id()), Some(id));
        assert_eq!(registry.list_pending().len(), 1);
    }
}
