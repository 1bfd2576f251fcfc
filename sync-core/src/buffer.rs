//! Action buffer for actsync.
//!
//! This module holds actions the user produced but that have not been
//! packaged into a packet yet:
//! - Compound actions are expanded into their leaves on the way in
//! - Leaves that must never reach the backend are filtered out
//! - The whole buffer is drained at once when a packet is cut
//!
//! Buffered actions survive disconnects untouched; they simply wait for the
//! next successful flush.

use actsync_types::{Action, SessionId};

/// FIFO of actions waiting to be packaged.
#[derive(Debug, Default)]
pub struct ActionBuffer {
    queue: Vec<Action>,
}

impl ActionBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an action produced by the application.
    ///
    /// Sequential actions are expanded first and every leaf is filtered on
    /// its own, so a mixed compound can partially survive. A leaf is dropped
    /// when it is frontend-only, manages the session, or was produced by a
    /// session other than `session_id`.
    ///
    /// Returns the number of actions that were buffered.
    pub fn enqueue(&mut self, action: Action, session_id: &SessionId) -> usize {
        let before = self.queue.len();
        self.queue.extend(
            action
                .flatten()
                .into_iter()
                .filter(|leaf| accepts(leaf, session_id)),
        );
        self.queue.len() - before
    }

    /// Remove and return every buffered action, in order.
    pub fn drain(&mut self) -> Vec<Action> {
        std::mem::take(&mut self.queue)
    }

    /// Buffered actions, in order.
    pub fn actions(&self) -> &[Action] {
        &self.queue
    }

    /// Number of buffered actions.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

fn accepts(action: &Action, session_id: &SessionId) -> bool {
    !action.frontend_only && !action.is_session() && &action.session_id == session_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn s1() -> SessionId {
        SessionId::from("s1")
    }

    fn task(name: &str, session: &str) -> Action {
        Action::task(name, SessionId::from(session), Value::Null)
    }

    #[test]
    fn buffer_keeps_task_actions_in_order() {
        let mut buffer = ActionBuffer::new();

        assert_eq!(buffer.enqueue(task("a", "s1"), &s1()), 1);
        assert_eq!(buffer.enqueue(task("b", "s1"), &s1()), 1);

        let names: Vec<&str> = buffer.actions().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn frontend_only_actions_are_dropped() {
        let mut buffer = ActionBuffer::new();
        let accepted = buffer.enqueue(task("a", "s1").frontend_only(), &s1());

        assert_eq!(accepted, 0);
        assert!(buffer.is_empty());
    }

    #[test]
    fn frontend_only_is_judged_per_leaf() {
        let mut buffer = ActionBuffer::new();
        let mut compound = Action::sequential(
            s1(),
            vec![task("a", "s1"), task("b", "s1").frontend_only()],
        );
        compound.frontend_only = true;

        assert_eq!(buffer.enqueue(compound, &s1()), 1);
        assert_eq!(buffer.actions()[0].name, "a");
    }

    #[test]
    fn marked_compound_drops_every_leaf() {
        let mut buffer = ActionBuffer::new();
        let compound =
            Action::sequential(s1(), vec![task("a", "s1"), task("b", "s1")]).frontend_only();

        assert_eq!(buffer.enqueue(compound, &s1()), 0);
        assert!(buffer.is_empty());
    }

    #[test]
    fn session_actions_are_dropped() {
        let mut buffer = ActionBuffer::new();
        assert_eq!(buffer.enqueue(Action::session("join", s1()), &s1()), 0);
        assert!(buffer.is_empty());
    }

    #[test]
    fn foreign_session_actions_are_dropped() {
        let mut buffer = ActionBuffer::new();
        assert_eq!(buffer.enqueue(task("a", "s2"), &s1()), 0);
        assert!(buffer.is_empty());
    }

    #[test]
    fn mixed_compound_partially_survives() {
        let mut buffer = ActionBuffer::new();
        let compound = Action::sequential(
            s1(),
            vec![
                task("keep-1", "s1"),
                Action::session("join", s1()),
                task("other-session", "s2"),
                task("local-only", "s1").frontend_only(),
                task("keep-2", "s1"),
            ],
        );

        assert_eq!(buffer.enqueue(compound, &s1()), 2);
        let names: Vec<&str> = buffer.actions().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["keep-1", "keep-2"]);
    }

    #[test]
    fn non_task_actions_from_own_session_are_kept() {
        let mut buffer = ActionBuffer::new();
        assert_eq!(buffer.enqueue(Action::other("select", s1()), &s1()), 1);
    }

    #[test]
    fn drain_empties_buffer() {
        let mut buffer = ActionBuffer::new();
        buffer.enqueue(task("a", "s1"), &s1());
        buffer.enqueue(task("b", "s1"), &s1());

        let drained = buffer.drain();
        assert_eq!(drained.len(), 2);
        assert!(buffer.is_empty());
        assert!(buffer.drain().is_empty());
    }
}
