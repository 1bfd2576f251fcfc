//! Registration state machine for actsync.
//!
//! This module provides a pure, side-effect-free state machine for the
//! channel's registration lifecycle. It takes events as input and produces a
//! new state plus the steps the [`Synchronizer`](crate::Synchronizer) must
//! carry out.
//!
//! The interesting distinction is between the first completed registration
//! (one-time session setup) and every later one (reconciliation after a
//! reconnect). The state carries that distinction explicitly.

/// Registration lifecycle - NO I/O, just state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No registration was ever requested.
    Unregistered,
    /// Registration requested, waiting for the backend.
    Registering {
        /// A previous registration completed; the next completion reconciles.
        resuming: bool,
    },
    /// Registered with the backend.
    Registered {
        /// This registration followed an earlier one.
        reconnected: bool,
    },
    /// Channel dropped; state is kept for the next registration.
    Disconnected {
        /// A previous registration completed.
        resuming: bool,
    },
}

impl ConnectionState {
    /// Create a new state machine in the Unregistered state.
    pub fn new() -> Self {
        Self::Unregistered
    }

    /// Process an event and return the new state plus the steps to run.
    pub fn on_event(self, event: LifecycleEvent) -> (Self, Vec<LifecycleStep>) {
        match event {
            LifecycleEvent::RegisterRequested => (
                Self::Registering {
                    resuming: self.has_registered(),
                },
                vec![LifecycleStep::SendRegistration],
            ),
            LifecycleEvent::RegistrationCompleted => {
                if self.has_registered() {
                    (
                        Self::Registered { reconnected: true },
                        vec![LifecycleStep::Reconcile],
                    )
                } else {
                    (
                        Self::Registered { reconnected: false },
                        vec![LifecycleStep::SetupSession],
                    )
                }
            }
            LifecycleEvent::Disconnected => (
                Self::Disconnected {
                    resuming: self.has_registered(),
                },
                vec![LifecycleStep::ReportReconnecting],
            ),
        }
    }

    /// True once any registration has completed.
    pub fn has_registered(&self) -> bool {
        match self {
            Self::Unregistered => false,
            Self::Registering { resuming } | Self::Disconnected { resuming } => *resuming,
            Self::Registered { .. } => true,
        }
    }

    /// Check if currently registered.
    pub fn is_registered(&self) -> bool {
        matches!(self, Self::Registered { .. })
    }

    /// Check if the last registration was a reconnect.
    pub fn is_reconnected(&self) -> bool {
        matches!(self, Self::Registered { reconnected: true })
    }
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Events that drive the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The client asked to register (usually on channel connect).
    RegisterRequested,
    /// The backend confirmed registration.
    RegistrationCompleted,
    /// The channel dropped.
    Disconnected,
}

/// Steps the synchronizer runs for a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleStep {
    /// Emit the registration request.
    SendRegistration,
    /// Run one-time session setup with the remote task state.
    SetupSession,
    /// Reapply remote state and pending edits, resend, flush.
    Reconcile,
    /// Tell observers the client is reconnecting.
    ReportReconnecting,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unregistered() {
        let state = ConnectionState::new();
        assert_eq!(state, ConnectionState::Unregistered);
        assert!(!state.has_registered());
    }

    #[test]
    fn register_request_transitions_to_registering() {
        let (state, steps) = ConnectionState::Unregistered.on_event(LifecycleEvent::RegisterRequested);

        assert_eq!(state, ConnectionState::Registering { resuming: false });
        assert_eq!(steps, vec![LifecycleStep::SendRegistration]);
    }

    #[test]
    fn first_completion_sets_up_session() {
        let state = ConnectionState::Registering { resuming: false };
        let (state, steps) = state.on_event(LifecycleEvent::RegistrationCompleted);

        assert_eq!(state, ConnectionState::Registered { reconnected: false });
        assert_eq!(steps, vec![LifecycleStep::SetupSession]);
    }

    #[test]
    fn completion_without_request_is_still_first_time() {
        let (state, steps) =
            ConnectionState::Unregistered.on_event(LifecycleEvent::RegistrationCompleted);

        assert!(state.is_registered());
        assert_eq!(steps, vec![LifecycleStep::SetupSession]);
    }

    #[test]
    fn full_reconnection_flow() {
        let state = ConnectionState::new();

        let (state, _) = state.on_event(LifecycleEvent::RegisterRequested);
        let (state, _) = state.on_event(LifecycleEvent::RegistrationCompleted);
        assert!(!state.is_reconnected());

        let (state, steps) = state.on_event(LifecycleEvent::Disconnected);
        assert_eq!(state, ConnectionState::Disconnected { resuming: true });
        assert_eq!(steps, vec![LifecycleStep::ReportReconnecting]);

        let (state, _) = state.on_event(LifecycleEvent::RegisterRequested);
        assert_eq!(state, ConnectionState::Registering { resuming: true });

        let (state, steps) = state.on_event(LifecycleEvent::RegistrationCompleted);
        assert!(state.is_reconnected());
        assert_eq!(steps, vec![LifecycleStep::Reconcile]);
    }

    #[test]
    fn disconnect_before_first_registration_keeps_first_time_setup() {
        let (state, _) = ConnectionState::Unregistered.on_event(LifecycleEvent::RegisterRequested);
        let (state, _) = state.on_event(LifecycleEvent::Disconnected);
        assert_eq!(state, ConnectionState::Disconnected { resuming: false });

        let (state, _) = state.on_event(LifecycleEvent::RegisterRequested);
        let (_, steps) = state.on_event(LifecycleEvent::RegistrationCompleted);
        assert_eq!(steps, vec![LifecycleStep::SetupSession]);
    }

    #[test]
    fn repeated_completion_while_registered_reconciles() {
        let state = ConnectionState::Registered { reconnected: false };
        let (state, steps) = state.on_event(LifecycleEvent::RegistrationCompleted);

        assert!(state.is_reconnected());
        assert_eq!(steps, vec![LifecycleStep::Reconcile]);
    }

    #[test]
    fn disconnect_from_any_state_reports_reconnecting() {
        for state in [
            ConnectionState::Unregistered,
            ConnectionState::Registering { resuming: true },
            ConnectionState::Registered { reconnected: true },
            ConnectionState::Disconnected { resuming: false },
        ] {
            let (_, steps) = state.on_event(LifecycleEvent::Disconnected);
            assert_eq!(steps, vec![LifecycleStep::ReportReconnecting]);
        }
    }
}
