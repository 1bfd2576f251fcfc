//! SyncClient - the main interface for actsync.
//!
//! This module provides [`SyncClient`], the API applications use to keep a
//! task's actions synchronized with the backend.
//!
//! # Architecture
//!
//! SyncClient uses a pure synchronizer (from actsync-core) for protocol logic
//! and interprets the effects it returns to perform actual I/O via the
//! Transport trait. Store updates go to the application over an unbounded
//! channel so none is ever dropped; status transitions are additionally
//! broadcast to any number of observers.
//!
//! ```text
//! Application → SyncClient → Transport → Network
//!      ↑            ↓
//!  ClientEvent   actsync-core (pure synchronizer)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use actsync_client::{MockTransport, SyncClient, SyncConfig};
//!
//! let config = SyncConfig::new("demo", 3, "task-3", "alice");
//! let (client, mut store_events) = SyncClient::new(config, MockTransport::new());
//!
//! client.connect().await?;
//! client.enqueue(action).await;
//! client.save().await?;
//! client.run().await?;
//! ```

use std::path::Path;

use actsync_core::{
    ActionNameTrigger, ComputeTrigger, ConnectionState, Effect, SyncStatus, Synchronizer, Update,
};
use actsync_types::{Action, Inbound, PacketId, SyncError};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, Mutex};

use crate::config::{ConfigError, SyncConfig};
use crate::transport::{ChannelEvent, Transport, TransportError};

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Malformed or unexpected protocol message.
    #[error("protocol error: {0}")]
    Protocol(#[from] SyncError),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
}

/// Work for the application store, delivered in order.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// First registration completed; set the session up from this state.
    SessionReady(Value),
    /// Apply these updates to the store as one atomic dispatch, in order.
    Dispatch(Vec<Update>),
}

/// Receiving end of the store channel, returned by [`SyncClient::new`].
pub type StoreEvents = mpsc::UnboundedReceiver<ClientEvent>;

/// The main sync client.
///
/// Owns the synchronizer for one session. Every call and channel event
/// holds the synchronizer lock while it computes its effects and carries
/// them out, so handlers never interleave.
pub struct SyncClient<T: Transport> {
    config: SyncConfig,
    transport: T,
    sync: Mutex<Synchronizer>,
    store: mpsc::UnboundedSender<ClientEvent>,
    status: broadcast::Sender<SyncStatus>,
}

impl<T: Transport> SyncClient<T> {
    /// Create a new SyncClient and the channel its store updates arrive on.
    ///
    /// Packets containing an action named in `compute_actions` are tracked
    /// for backend compute when compute is enabled.
    pub fn new(config: SyncConfig, transport: T) -> (Self, StoreEvents) {
        let trigger = ActionNameTrigger::new(config.sync.compute_actions.iter().cloned());
        Self::with_trigger(config, transport, trigger)
    }

    /// Create a new SyncClient with a custom compute trigger.
    pub fn with_trigger(
        config: SyncConfig,
        transport: T,
        trigger: impl ComputeTrigger + 'static,
    ) -> (Self, StoreEvents) {
        let sync =
            Synchronizer::new(config.session_context(), config.options()).with_trigger(trigger);
        let (store, store_events) = mpsc::unbounded_channel();
        let (status, _) = broadcast::channel(config.sync.event_capacity.max(1));
        let client = Self {
            config,
            transport,
            sync: Mutex::new(sync),
            store,
            status,
        };
        (client, store_events)
    }

    /// Create a SyncClient from a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path, transport: T) -> Result<(Self, StoreEvents), ClientError> {
        let config = SyncConfig::from_file(path)?;
        Ok(Self::new(config, transport))
    }

    /// Observe status transitions (saving, saved, reconnecting, ...).
    ///
    /// Slow observers may miss statuses; store updates are unaffected.
    pub fn subscribe_status(&self) -> broadcast::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    // ===========================================
    // Connection
    // ===========================================

    /// Connect to the backend and request registration.
    pub async fn connect(&self) -> Result<(), ClientError> {
        self.transport
            .connect(&self.config.sync.endpoint)
            .await
            .map_err(|e| ClientError::ConnectionFailed(e.to_string()))?;

        tracing::info!(
            "Connected to {} as session {}",
            self.config.sync.endpoint,
            self.config.session.session_id
        );
        self.register().await
    }

    /// Request registration. Normally driven by `Connected` events.
    pub async fn register(&self) -> Result<(), ClientError> {
        let mut sync = self.sync.lock().await;
        let effects = sync.register();
        self.execute(effects).await;
        Ok(())
    }

    /// Close the channel. Buffered and pending work is kept.
    pub async fn disconnect(&self) -> Result<(), ClientError> {
        self.transport.close().await?;
        Ok(())
    }

    /// Check if the channel is connected.
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    // ===========================================
    // Actions
    // ===========================================

    /// Buffer an action. Returns how many leaf actions were accepted.
    pub async fn enqueue(&self, action: Action) -> usize {
        self.sync.lock().await.enqueue(action)
    }

    /// Send everything buffered as one packet (no-op while disconnected).
    pub async fn save(&self) -> Result<(), ClientError> {
        let mut sync = self.sync.lock().await;
        let effects = sync.flush(self.transport.is_connected());
        self.execute(effects).await;
        Ok(())
    }

    // ===========================================
    // Channel events
    // ===========================================

    /// Process channel events until the channel closes for good.
    ///
    /// Undecodable messages are logged and skipped.
    pub async fn run(&self) -> Result<(), ClientError> {
        loop {
            match self.transport.next_event().await {
                Ok(event) => {
                    if let Err(e) = self.handle_event(event).await {
                        tracing::warn!("Dropping inbound event: {}", e);
                    }
                }
                Err(TransportError::ConnectionClosed) => {
                    tracing::debug!("Channel closed, stopping event loop");
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Process one channel event.
    pub async fn handle_event(&self, event: ChannelEvent) -> Result<(), ClientError> {
        match event {
            ChannelEvent::Connected => {
                tracing::info!("Channel connected, registering");
                self.register().await
            }
            ChannelEvent::Disconnected { reason } => {
                tracing::info!("Channel disconnected: {}", reason);
                let mut sync = self.sync.lock().await;
                let effects = sync.on_disconnect();
                self.execute(effects).await;
                Ok(())
            }
            ChannelEvent::Message { event, payload } => {
                tracing::debug!("Received {} ({} bytes)", event, payload.len());
                let message = Inbound::decode(&event, &payload)?;

                let mut sync = self.sync.lock().await;
                let effects = match message {
                    Inbound::Registered(ack) => {
                        sync.complete_registration(ack.task_state, self.transport.is_connected())
                    }
                    Inbound::Synced(ack) => sync.on_acknowledgment(ack),
                };
                self.execute(effects).await;
                Ok(())
            }
        }
    }

    /// Carry out every effect in order. A failing effect is logged and the
    /// rest still run.
    async fn execute(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Emit(message) => {
                    let event = message.event();
                    let bytes = match message.to_bytes() {
                        Ok(bytes) => bytes,
                        Err(e) => {
                            tracing::warn!("Failed to encode {}: {}", event, e);
                            continue;
                        }
                    };
                    // Losses are recovered by the resend on reconnect.
                    if let Err(e) = self.transport.emit(event.as_str(), &bytes).await {
                        tracing::warn!("Failed to emit {}: {}", event, e);
                    }
                }
                Effect::Dispatch(updates) => {
                    for update in &updates {
                        if let Update::Status(status) = update {
                            tracing::debug!("Status: {}", status);
                            // No observers is fine.
                            let _ = self.status.send(*status);
                        }
                    }
                    self.deliver(ClientEvent::Dispatch(updates));
                }
                Effect::SetupSession(state) => self.deliver(ClientEvent::SessionReady(state)),
            }
        }
    }

    fn deliver(&self, event: ClientEvent) {
        if self.store.send(event).is_err() {
            tracing::debug!("Store channel closed, dropping update");
        }
    }

    // ===========================================
    // Queries
    // ===========================================

    /// Number of actions confirmed by the backend.
    pub async fn confirmed_count(&self) -> usize {
        self.sync.lock().await.confirmed_count()
    }

    /// Number of packets awaiting acknowledgment.
    pub async fn pending_count(&self) -> usize {
        self.sync.lock().await.pending_count()
    }

    /// Number of packets awaiting backend compute.
    pub async fn prediction_count(&self) -> usize {
        self.sync.lock().await.prediction_count()
    }

    /// Ids of pending packets in original send order.
    pub async fn pending_ids(&self) -> Vec<PacketId> {
        self.sync
            .lock()
            .await
            .list_pending()
            .iter()
            .map(|packet| packet.id())
            .collect()
    }

    /// True when nothing is buffered and nothing awaits acknowledgment.
    ///
    /// Hosts query this before discarding the session (page unload, app
    /// exit) to warn about unsaved work.
    pub async fn is_everything_saved(&self) -> bool {
        self.sync.lock().await.is_everything_saved()
    }

    /// Current registration state.
    pub async fn connection_state(&self) -> ConnectionState {
        self.sync.lock().await.state()
    }

    /// The client configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Get the transport (for testing).
    pub fn transport(&self) -> &T {
        &self.transport
    }
}
