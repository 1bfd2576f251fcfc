//! Tracking of packets awaiting asynchronous backend compute.
//!
//! Some packets make the backend start work (a model prediction, for
//! example) whose result arrives later as a separate packet carrying the
//! triggering packet's id in `trigger_id`. The tracker holds the ids of
//! triggering packets until that answer is acknowledged.
//!
//! Which packets trigger compute is an application decision, expressed
//! through [`ComputeTrigger`].

use std::collections::HashSet;

use actsync_types::{ActionPacket, PacketId};

/// Decides whether a packet will start backend compute.
pub trait ComputeTrigger: Send + Sync {
    /// Return true if acknowledging `packet` makes the backend start compute.
    fn triggers_compute(&self, packet: &ActionPacket) -> bool;
}

impl<F> ComputeTrigger for F
where
    F: Fn(&ActionPacket) -> bool + Send + Sync,
{
    fn triggers_compute(&self, packet: &ActionPacket) -> bool {
        self(packet)
    }
}

/// Trigger that never fires.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverTriggers;

impl ComputeTrigger for NeverTriggers {
    fn triggers_compute(&self, _packet: &ActionPacket) -> bool {
        false
    }
}

/// Fires when any action in the packet has one of the configured names.
#[derive(Debug, Default, Clone)]
pub struct ActionNameTrigger {
    names: HashSet<String>,
}

impl ActionNameTrigger {
    /// Build from a list of action names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl ComputeTrigger for ActionNameTrigger {
    fn triggers_compute(&self, packet: &ActionPacket) -> bool {
        packet
            .actions()
            .iter()
            .any(|action| self.names.contains(&action.name))
    }
}

/// Set of packet ids whose compute has not finished.
#[derive(Debug, Default)]
pub struct PredictionTracker {
    awaiting: HashSet<PacketId>,
}

impl PredictionTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a triggering packet.
    pub fn track(&mut self, id: PacketId) {
        self.awaiting.insert(id);
    }

    /// Check if a packet is awaiting compute.
    pub fn contains(&self, id: &PacketId) -> bool {
        self.awaiting.contains(id)
    }

    /// Stop tracking a packet whose compute finished.
    ///
    /// Returns `false` if the id was not tracked.
    pub fn finish(&mut self, id: &PacketId) -> bool {
        self.awaiting.remove(id)
    }

    /// Number of packets awaiting compute.
    pub fn len(&self) -> usize {
        self.awaiting.len()
    }

    /// Check if no compute is outstanding.
    pub fn is_empty(&self) -> bool {
        self.awaiting.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actsync_types::{Action, SessionId};
    use serde_json::Value;

    fn packet(names: &[&str]) -> ActionPacket {
        ActionPacket::new(
            names
                .iter()
                .map(|n| Action::task(*n, SessionId::from("s1"), Value::Null))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn tracker_finish_removes() {
        let mut tracker = PredictionTracker::new();
        let id = PacketId::new();

        tracker.track(id);
        assert!(tracker.contains(&id));
        assert_eq!(tracker.len(), 1);

        assert!(tracker.finish(&id));
        assert!(!tracker.contains(&id));
        assert!(tracker.is_empty());
    }

    #[test]
    fn finishing_unknown_id_reports_false() {
        let mut tracker = PredictionTracker::new();
        assert!(!tracker.finish(&PacketId::new()));
    }

    #[test]
    fn name_trigger_matches_any_action() {
        let trigger = ActionNameTrigger::new(["predict"]);
        assert!(trigger.triggers_compute(&packet(&["move", "predict"])));
        assert!(!trigger.triggers_compute(&packet(&["move"])));
    }

    #[test]
    fn closures_are_triggers() {
        let trigger = |p: &ActionPacket| p.len() > 1;
        let boxed: Box<dyn ComputeTrigger> = Box::new(trigger);
        assert!(boxed.triggers_compute(&packet(&["a", "b"])));
        assert!(!boxed.triggers_compute(&packet(&["a"])));
    }

    #[test]
    fn never_triggers_never_fires() {
        assert!(!NeverTriggers.triggers_compute(&packet(&["predict"])));
    }
}
