//! Actions: the mutation records exchanged by actsync.
//!
//! An action is opaque to the protocol except for a handful of attributes:
//! the session that produced it, whether it is frontend-only, and its
//! [`ActionKind`]. The `payload` is never interpreted here.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::SessionId;

/// Name of the action synthesized on reconnect to carry the authoritative
/// remote task state.
pub const SET_TASK_STATE: &str = "set_task_state";

/// Type tag of an action, as far as synchronization cares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionKind {
    /// Session management (join, leave, presence). Never synchronized.
    Session,
    /// Mutates the shared task state.
    Task,
    /// Submits the task. Also task-affecting.
    Submit,
    /// Ordered bundle of sub-actions applied together.
    Sequential {
        /// The bundled actions, in application order.
        actions: Vec<Action>,
    },
    /// Anything else (UI state, navigation).
    Other,
}

/// A single mutation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Application-level action name (e.g. `"create_box"`).
    pub name: String,
    /// Session that produced the action.
    pub session_id: SessionId,
    /// Frontend-only actions are applied locally and never sent.
    #[serde(default)]
    pub frontend_only: bool,
    /// Type tag.
    #[serde(flatten)]
    pub kind: ActionKind,
    /// Opaque application payload.
    #[serde(default)]
    pub payload: Value,
}

impl Action {
    fn build(name: impl Into<String>, session_id: SessionId, kind: ActionKind) -> Self {
        Self {
            name: name.into(),
            session_id,
            frontend_only: false,
            kind,
            payload: Value::Null,
        }
    }

    /// A task-affecting action.
    pub fn task(name: impl Into<String>, session_id: SessionId, payload: Value) -> Self {
        Self::build(name, session_id, ActionKind::Task).with_payload(payload)
    }

    /// A submit action.
    pub fn submit(session_id: SessionId, payload: Value) -> Self {
        Self::build("submit", session_id, ActionKind::Submit).with_payload(payload)
    }

    /// A session-management action.
    pub fn session(name: impl Into<String>, session_id: SessionId) -> Self {
        Self::build(name, session_id, ActionKind::Session)
    }

    /// An action that neither manages the session nor touches the task.
    pub fn other(name: impl Into<String>, session_id: SessionId) -> Self {
        Self::build(name, session_id, ActionKind::Other)
    }

    /// A compound action bundling `actions` in order.
    pub fn sequential(session_id: SessionId, actions: Vec<Action>) -> Self {
        Self::build("sequential", session_id, ActionKind::Sequential { actions })
    }

    /// The action that replaces local task state with `state` from the backend.
    pub fn set_task_state(session_id: SessionId, state: Value) -> Self {
        Self::build(SET_TASK_STATE, session_id, ActionKind::Task)
            .with_payload(state)
            .frontend_only()
    }

    /// Set the payload.
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    /// Mark this action (and, for compounds, every sub-action) frontend-only.
    pub fn frontend_only(mut self) -> Self {
        self.mark_frontend_only();
        self
    }

    fn mark_frontend_only(&mut self) {
        self.frontend_only = true;
        if let ActionKind::Sequential { actions } = &mut self.kind {
            for action in actions.iter_mut() {
                action.mark_frontend_only();
            }
        }
    }

    /// True for session-management actions.
    pub fn is_session(&self) -> bool {
        matches!(self.kind, ActionKind::Session)
    }

    /// True for submit actions.
    pub fn is_submit(&self) -> bool {
        matches!(self.kind, ActionKind::Submit)
    }

    /// True if applying this action changes task state.
    ///
    /// A compound is task-affecting when any of its sub-actions is.
    pub fn affects_task(&self) -> bool {
        match &self.kind {
            ActionKind::Task | ActionKind::Submit => true,
            ActionKind::Sequential { actions } => actions.iter().any(Action::affects_task),
            ActionKind::Session | ActionKind::Other => false,
        }
    }

    /// Expand compounds (recursively) into their leaf actions, in order.
    pub fn flatten(self) -> Vec<Action> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(self, out: &mut Vec<Action>) {
        match self.kind {
            ActionKind::Sequential { actions } => {
                for action in actions {
                    action.flatten_into(out);
                }
            }
            _ => out.push(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn s1() -> SessionId {
        SessionId::from("s1")
    }

    #[test]
    fn submit_is_task_affecting() {
        let submit = Action::submit(s1(), Value::Null);
        assert!(submit.is_submit());
        assert!(submit.affects_task());
    }

    #[test]
    fn session_and_other_do_not_affect_task() {
        assert!(!Action::session("join", s1()).affects_task());
        assert!(!Action::other("scroll", s1()).affects_task());
    }

    #[test]
    fn flatten_expands_nested_compounds_in_order() {
        let inner = Action::sequential(
            s1(),
            vec![Action::task("b", s1(), Value::Null), Action::task("c", s1(), Value::Null)],
        );
        let outer = Action::sequential(
            s1(),
            vec![Action::task("a", s1(), Value::Null), inner, Action::task("d", s1(), Value::Null)],
        );

        let names: Vec<String> = outer.flatten().into_iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn flatten_leaf_is_itself() {
        let action = Action::task("a", s1(), json!({"x": 1}));
        assert_eq!(action.clone().flatten(), vec![action]);
    }

    #[test]
    fn frontend_only_reaches_sub_actions() {
        let compound = Action::sequential(s1(), vec![Action::task("a", s1(), Value::Null)]).frontend_only();
        assert!(compound.frontend_only);
        match compound.kind {
            ActionKind::Sequential { actions } => assert!(actions[0].frontend_only),
            _ => panic!("Expected Sequential"),
        }
    }

    #[test]
    fn compound_with_task_child_affects_task() {
        let compound = Action::sequential(
            s1(),
            vec![Action::session("join", s1()), Action::task("a", s1(), Value::Null)],
        );
        assert!(compound.affects_task());
    }

    #[test]
    fn set_task_state_is_frontend_only_task_action() {
        let action = Action::set_task_state(s1(), json!({"boxes": []}));
        assert_eq!(action.name, SET_TASK_STATE);
        assert!(action.frontend_only);
        assert!(action.affects_task());
    }

    #[test]
    fn json_shape_is_flat_with_kind_tag() {
        let action = Action::task("create_box", s1(), json!({"id": 7}));
        let value = serde_json::to_value(&action).unwrap();
        assert_eq!(value["kind"], "task");
        assert_eq!(value["session_id"], "s1");
        assert_eq!(value["payload"]["id"], 7);

        let restored: Action = serde_json::from_value(value).unwrap();
        assert_eq!(restored, action);
    }

    #[test]
    fn frontend_only_defaults_to_false_when_absent() {
        let action: Action =
            serde_json::from_value(json!({"name": "x", "session_id": "s2", "kind": "other"})).unwrap();
        assert!(!action.frontend_only);
        assert_eq!(action.payload, Value::Null);
    }
}
