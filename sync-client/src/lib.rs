//! # actsync-client
//!
//! Async client for the actsync action synchronization protocol.
//!
//! This is the library applications embed to keep a task's actions in sync
//! with the backend.
//!
//! ## Features
//!
//! - **Atomic packets**: buffered actions leave as one packet per save
//! - **At-least-once delivery**: pending packets are resent after reconnect
//! - **Idempotent acknowledgments**: re-delivered acks are ignored
//! - **Transport Abstraction**: Pluggable channel layer (mock included)
//! - **Pure State Machine**: Uses actsync-core for side-effect-free logic
//!
//! ## Example
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

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod transport;

pub use client::{ClientError, ClientEvent, StoreEvents, SyncClient};
pub use config::{ConfigError, SessionConfig, SyncConfig, SyncSettings};
pub use transport::{ChannelEvent, MockTransport, Transport, TransportError};
