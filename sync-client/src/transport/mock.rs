//! Mock transport for testing.
//!
//! Allows queueing inbound events and capturing emitted messages for
//! verification.

use super::{ChannelEvent, Transport, TransportError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Mock transport for testing.
///
/// Clones share state, so a test can keep a handle while the client owns
/// another.
#[derive(Debug, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

#[derive(Debug, Default)]
struct MockTransportInner {
    connected: bool,
    connected_address: Option<String>,
    emitted: Vec<(String, Vec<u8>)>,
    events: VecDeque<ChannelEvent>,
    fail_next_connect: Option<String>,
    fail_next_emit: Option<String>,
}

impl MockTransport {
    /// Create a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event to be returned by `next_event()`.
    pub fn queue_event(&self, event: ChannelEvent) {
        let mut inner = self.inner.lock().unwrap();
        inner.events.push_back(event);
    }

    /// Queue a named message to be returned by `next_event()`.
    pub fn queue_message(&self, event: &str, payload: Vec<u8>) {
        self.queue_event(ChannelEvent::Message {
            event: event.to_string(),
            payload,
        });
    }

    /// Simulate the connection dropping.
    ///
    /// Marks the transport disconnected and queues a `Disconnected` event.
    pub fn drop_connection(&self, reason: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.connected = false;
        inner.events.push_back(ChannelEvent::Disconnected {
            reason: reason.to_string(),
        });
    }

    /// Simulate the connection coming back.
    ///
    /// Marks the transport connected and queues a `Connected` event.
    pub fn restore_connection(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.connected = true;
        inner.events.push_back(ChannelEvent::Connected);
    }

    /// Get every emitted `(event, payload)` pair.
    pub fn emitted(&self) -> Vec<(String, Vec<u8>)> {
        let inner = self.inner.lock().unwrap();
        inner.emitted.clone()
    }

    /// Get the payloads emitted under `event`.
    pub fn emitted_for(&self, event: &str) -> Vec<Vec<u8>> {
        let inner = self.inner.lock().unwrap();
        inner
            .emitted
            .iter()
            .filter(|(name, _)| name == event)
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    /// Get the last emitted `(event, payload)` pair.
    pub fn last_emitted(&self) -> Option<(String, Vec<u8>)> {
        let inner = self.inner.lock().unwrap();
        inner.emitted.last().cloned()
    }

    /// Get the address that was connected to.
    pub fn connected_address(&self) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner.connected_address.clone()
    }

    /// Cause the next connect() to fail with the given error.
    pub fn fail_next_connect(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_connect = Some(error.to_string());
    }

    /// Cause the next emit() to fail with the given error.
    pub fn fail_next_emit(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_emit = Some(error.to_string());
    }

    /// Clear all state (emits, queue, connection).
    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap();
        *inner = MockTransportInner::default();
    }
}

impl Clone for MockTransport {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&self, address: &str) -> Result<(), TransportError> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(error) = inner.fail_next_connect.take() {
            return Err(TransportError::ConnectionFailed(error));
        }

        inner.connected = true;
        inner.connected_address = Some(address.to_string());
        Ok(())
    }

    async fn emit(&self, event: &str, payload: &[u8]) -> Result<(), TransportError> {
        let mut inner = self.inner.lock().unwrap();

        if !inner.connected {
            return Err(TransportError::NotConnected);
        }

        if let Some(error) = inner.fail_next_emit.take() {
            return Err(TransportError::EmitFailed(error));
        }

        inner.emitted.push((event.to_string(), payload.to_vec()));
        Ok(())
    }

    async fn next_event(&self) -> Result<ChannelEvent, TransportError> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .events
            .pop_front()
            .ok_or(TransportError::ConnectionClosed)
    }

    fn is_connected(&self) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.connected
    }

    async fn close(&self) -> Result<(), TransportError> {
        let mut inner = self.inner.lock().unwrap();
        inner.connected = false;
        Ok(())
    }
}
