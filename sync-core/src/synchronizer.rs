//! The action synchronizer.
//!
//! [`Synchronizer`] composes the buffer, pending registry, ack ledger,
//! prediction tracker and registration state machine, and implements the
//! protocol operations on top of them:
//!
//! ```text
//! enqueue → ActionBuffer ─flush→ ActionPacket → PendingRegistry ─send→ channel
//!                                     │
//!                              PredictionTracker
//!
//! channel ─ack→ dedup (AckLedger) → PendingRegistry.remove → AckLedger.append
//!                                                          → status updates
//! ```
//!
//! Every operation returns the [`Effect`]s to execute, in order. Nothing here
//! blocks or performs I/O; the caller owns the channel and the store.

use std::fmt;

use actsync_types::{
    Action, ActionPacket, Outbound, RegisterRequest, SessionId, SyncAck, SyncRequest,
};
use serde_json::Value;

use crate::{
    AckLedger, ActionBuffer, ComputeTrigger, ConnectionState, LifecycleEvent, LifecycleStep,
    NeverTriggers, PendingRegistry, PredictionTracker,
};

/// Identity of the session this synchronizer serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// Project the task belongs to.
    pub project_name: String,
    /// Index of the task within the project.
    pub task_index: u64,
    /// Task identifier used in sync requests.
    pub task_id: String,
    /// This client's session.
    pub session_id: SessionId,
    /// User identity sent at registration.
    pub user_id: String,
    /// Origin address sent at registration.
    pub address: String,
}

/// Behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Reconcile and flush automatically after a reconnect.
    pub autosave: bool,
    /// Track packets that start backend compute.
    pub compute_enabled: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            autosave: true,
            compute_enabled: false,
        }
    }
}

/// Status transitions reported to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncStatus {
    /// A packet without a submit action was sent.
    Saving,
    /// Every packet this session sent has been acknowledged.
    Saved,
    /// A packet with a submit action was sent.
    Submitting,
    /// A packet with a submit action was acknowledged.
    Submitted,
    /// The channel dropped; the client is waiting to re-register.
    Reconnecting,
    /// The backend started compute for a tracked packet.
    ComputeStarted,
    /// The last outstanding compute finished.
    ComputeFinished,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncStatus::Saving => "saving",
            SyncStatus::Saved => "saved",
            SyncStatus::Submitting => "submitting",
            SyncStatus::Submitted => "submitted",
            SyncStatus::Reconnecting => "reconnecting",
            SyncStatus::ComputeStarted => "compute-started",
            SyncStatus::ComputeFinished => "compute-finished",
        };
        f.write_str(name)
    }
}

/// One entry of an atomic dispatch to the application store.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// Apply an action to local state.
    Apply(Action),
    /// Report a status transition.
    Status(SyncStatus),
}

/// Instructions produced by the synchronizer.
///
/// These are instructions, not side effects. The client interprets them in
/// order and performs the actual I/O.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Emit a message on the channel.
    Emit(Outbound),
    /// Apply the updates to the store as one atomic dispatch, in order.
    Dispatch(Vec<Update>),
    /// Run one-time session setup from the authoritative task state.
    SetupSession(Value),
}

/// Client-side synchronization engine for one session.
pub struct Synchronizer {
    context: SessionContext,
    options: SyncOptions,
    trigger: Box<dyn ComputeTrigger>,
    state: ConnectionState,
    buffer: ActionBuffer,
    pending: PendingRegistry,
    ledger: AckLedger,
    predictions: PredictionTracker,
}

impl fmt::Debug for Synchronizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Synchronizer")
            .field("session_id", &self.context.session_id)
            .field("options", &self.options)
            .field("state", &self.state)
            .field("buffered", &self.buffer.len())
            .field("pending", &self.pending.len())
            .field("confirmed", &self.ledger.len())
            .field("predictions", &self.predictions.len())
            .finish()
    }
}

impl Synchronizer {
    /// Create a synchronizer. No packet triggers compute until a trigger is set.
    pub fn new(context: SessionContext, options: SyncOptions) -> Self {
        Self {
            context,
            options,
            trigger: Box::new(NeverTriggers),
            state: ConnectionState::new(),
            buffer: ActionBuffer::new(),
            pending: PendingRegistry::new(),
            ledger: AckLedger::new(),
            predictions: PredictionTracker::new(),
        }
    }

    /// Set the predicate deciding which packets start backend compute.
    pub fn with_trigger(mut self, trigger: impl ComputeTrigger + 'static) -> Self {
        self.trigger = Box::new(trigger);
        self
    }

    // ===========================================
    // Buffering and sending
    // ===========================================

    /// Buffer an action produced by the application.
    ///
    /// Returns how many leaf actions survived filtering.
    pub fn enqueue(&mut self, action: Action) -> usize {
        self.buffer.enqueue(action, &self.context.session_id)
    }

    /// Package the whole buffer into one packet and send it.
    ///
    /// A no-op while disconnected or when nothing is buffered; buffered
    /// actions then wait for the next flush.
    pub fn flush(&mut self, connected: bool) -> Vec<Effect> {
        if self.buffer.is_empty() {
            return Vec::new();
        }
        if !connected {
            tracing::debug!(
                "Flush deferred while disconnected ({} actions buffered)",
                self.buffer.len()
            );
            return Vec::new();
        }

        let Ok(packet) = ActionPacket::new(self.buffer.drain()) else {
            return Vec::new();
        };

        if self.options.compute_enabled && self.trigger.triggers_compute(&packet) {
            self.predictions.track(packet.id());
        }

        tracing::debug!(
            "Flushing packet {} ({} actions)",
            packet.id(),
            packet.len()
        );
        let effects = self.send_packet(&packet);
        self.pending.insert(packet);
        effects
    }

    /// Emit a packet on the channel.
    ///
    /// Does not check connectivity: resends during reconnection are
    /// speculative and the backend deduplicates by packet id.
    pub fn send_packet(&self, packet: &ActionPacket) -> Vec<Effect> {
        let status = if packet.contains_submit() {
            SyncStatus::Submitting
        } else {
            SyncStatus::Saving
        };

        vec![
            Effect::Emit(Outbound::Sync(SyncRequest {
                task_id: self.context.task_id.clone(),
                project_name: self.context.project_name.clone(),
                session_id: self.context.session_id.clone(),
                actions: packet.clone(),
                bot: false,
            })),
            Effect::Dispatch(vec![Update::Status(status)]),
        ]
    }

    // ===========================================
    // Connection lifecycle
    // ===========================================

    fn transition(&mut self, event: LifecycleEvent) -> Vec<LifecycleStep> {
        let (next, steps) = self.state.on_event(event);
        self.state = next;
        steps
    }

    /// Request registration with the backend.
    pub fn register(&mut self) -> Vec<Effect> {
        self.transition(LifecycleEvent::RegisterRequested)
            .into_iter()
            .filter(|step| *step == LifecycleStep::SendRegistration)
            .map(|_| Effect::Emit(Outbound::Register(self.registration_request())))
            .collect()
    }

    fn registration_request(&self) -> RegisterRequest {
        RegisterRequest {
            project_name: self.context.project_name.clone(),
            task_index: self.context.task_index,
            session_id: self.context.session_id.clone(),
            user_id: self.context.user_id.clone(),
            address: self.context.address.clone(),
            bot: false,
        }
    }

    /// Handle the backend's registration confirmation.
    ///
    /// The first completion sets the session up from `task_state`. Later
    /// completions are reconnects and reconcile instead.
    pub fn complete_registration(&mut self, task_state: Value, connected: bool) -> Vec<Effect> {
        let mut effects = Vec::new();
        for step in self.transition(LifecycleEvent::RegistrationCompleted) {
            match step {
                LifecycleStep::SetupSession => {
                    tracing::debug!("First registration for session {}", self.context.session_id);
                    effects.push(Effect::SetupSession(task_state.clone()));
                }
                LifecycleStep::Reconcile => {
                    effects.extend(self.reconcile(task_state.clone(), connected));
                }
                LifecycleStep::SendRegistration | LifecycleStep::ReportReconnecting => {}
            }
        }
        effects
    }

    fn reconcile(&mut self, task_state: Value, connected: bool) -> Vec<Effect> {
        tracing::debug!(
            "Reconciling after reconnect ({} packets pending, {} actions buffered)",
            self.pending.len(),
            self.buffer.len()
        );
        let mut effects = Vec::new();

        if self.options.autosave {
            let session = &self.context.session_id;
            let replay: Vec<Action> = self
                .pending
                .iter()
                .flat_map(|packet| packet.actions().iter())
                .filter(|action| action.affects_task())
                .cloned()
                .collect();

            let mut updates = vec![Update::Apply(Action::set_task_state(
                session.clone(),
                task_state,
            ))];
            if !replay.is_empty() {
                updates.push(Update::Apply(
                    Action::sequential(session.clone(), replay).frontend_only(),
                ));
            }
            effects.push(Effect::Dispatch(updates));
        }

        for packet in self.pending.iter() {
            effects.extend(self.send_packet(packet));
        }

        if self.options.autosave {
            effects.extend(self.flush(connected));
        }
        effects
    }

    /// Handle a channel drop. Buffered, pending and tracked state is kept.
    pub fn on_disconnect(&mut self) -> Vec<Effect> {
        self.transition(LifecycleEvent::Disconnected)
            .into_iter()
            .filter(|step| *step == LifecycleStep::ReportReconnecting)
            .map(|_| Effect::Dispatch(vec![Update::Status(SyncStatus::Reconnecting)]))
            .collect()
    }

    // ===========================================
    // Acknowledgments
    // ===========================================

    /// Handle an acknowledgment broadcast by the backend.
    ///
    /// Re-delivered acknowledgments produce no effects at all.
    pub fn on_acknowledgment(&mut self, ack: SyncAck) -> Vec<Effect> {
        let SyncAck {
            session_id: sender,
            actions: packet,
        } = ack;
        let id = packet.id();

        self.pending.remove(&id);

        if !self.ledger.mark_processed(id) {
            tracing::debug!("Ignoring duplicate acknowledgment for packet {}", id);
            return Vec::new();
        }

        let contains_submit = packet.contains_submit();
        let trigger_id = packet.trigger_id();
        let local = &self.context.session_id;
        let mut staged = Vec::new();

        for action in packet.into_actions() {
            if &action.session_id != local && action.affects_task() {
                staged.push(Update::Apply(action.clone()));
            }
            self.ledger.append(action);
        }

        if self.predictions.contains(&id) {
            staged.push(Update::Status(SyncStatus::ComputeStarted));
        } else if let Some(trigger) = trigger_id.filter(|t| self.predictions.contains(t)) {
            self.predictions.finish(&trigger);
            if self.predictions.is_empty() {
                staged.push(Update::Status(SyncStatus::ComputeFinished));
            }
        } else if &sender == local {
            if contains_submit {
                staged.push(Update::Status(SyncStatus::Submitted));
            } else if self.pending.is_empty() {
                staged.push(Update::Status(SyncStatus::Saved));
            }
        }

        if staged.is_empty() {
            Vec::new()
        } else {
            vec![Effect::Dispatch(staged)]
        }
    }

    // ===========================================
    // Queries
    // ===========================================

    /// Pending packets in original send order.
    pub fn list_pending(&self) -> Vec<&ActionPacket> {
        self.pending.list_pending()
    }

    /// Number of actions confirmed by the backend.
    pub fn confirmed_count(&self) -> usize {
        self.ledger.len()
    }

    /// Number of packets awaiting acknowledgment.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Number of packets awaiting backend compute.
    pub fn prediction_count(&self) -> usize {
        self.predictions.len()
    }

    /// Number of actions buffered but not yet packaged.
    pub fn buffered_count(&self) -> usize {
        self.buffer.len()
    }

    /// True when nothing is buffered and nothing awaits acknowledgment.
    ///
    /// Hosts use this to warn before discarding the session.
    pub fn is_everything_saved(&self) -> bool {
        self.buffer.is_empty() && self.pending.is_empty()
    }

    /// Confirmed actions in backend order.
    pub fn confirmed_actions(&self) -> &[Action] {
        self.ledger.actions()
    }

    /// Current registration state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Session identity.
    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Current options.
    pub fn options(&self) -> SyncOptions {
        self.options
    }

    /// Toggle autosave.
    pub fn set_autosave(&mut self, autosave: bool) {
        self.options.autosave = autosave;
    }

    /// Toggle compute tracking for packets flushed from now on.
    pub fn set_compute_enabled(&mut self, enabled: bool) {
        self.options.compute_enabled = enabled;
    }
}
