//! # actsync-types
//!
//! Data model and wire messages for the actsync action synchronization protocol.
//!
//! This crate provides the foundational types used across all actsync crates:
//! - [`SessionId`], [`PacketId`] - Identity types
//! - [`Action`], [`ActionKind`] - Mutation records produced by the application
//! - [`ActionPacket`] - The unit of transmission and acknowledgment
//! - [`Outbound`], [`Inbound`] - Channel messages and their event names
//! - [`SyncError`] - Error types

#![warn(missing_docs)]
#![warn(clippy::all)]

mod action;
mod error;
mod ids;
mod messages;
mod packet;

pub use action::{Action, ActionKind, SET_TASK_STATE};
pub use error::SyncError;
pub use ids::{PacketId, SessionId};
pub use messages::{EventName, Inbound, Outbound, RegisterAck, RegisterRequest, SyncAck, SyncRequest};
pub use packet::ActionPacket;
