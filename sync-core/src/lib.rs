//! # actsync-core
//!
//! Pure protocol logic for actsync (no I/O, instant tests).
//!
//! This crate implements the buffers, ledgers and state machines of the
//! action synchronization protocol without any network or disk I/O.
//!
//! ## Design Philosophy
//!
//! Every operation on [`Synchronizer`] mutates state owned by the instance
//! and returns a list of [`Effect`]s instead of performing them:
//! - Instant unit tests (no mocks, no async)
//! - Deterministic behavior (same input → same output)
//! - Easy reasoning about ordering guarantees
//!
//! The actual I/O (emitting on the channel, applying updates to the
//! application store) is performed by `actsync-client`, which interprets
//! the effects produced here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod buffer;
pub mod ledger;
pub mod lifecycle;
pub mod prediction;
pub mod registry;
pub mod synchronizer;

pub use buffer::ActionBuffer;
pub use ledger::AckLedger;
pub use lifecycle::{ConnectionState, LifecycleEvent, LifecycleStep};
pub use prediction::{ActionNameTrigger, ComputeTrigger, NeverTriggers, PredictionTracker};
pub use registry::PendingRegistry;
pub use synchronizer::{Effect, SessionContext, SyncOptions, SyncStatus, Synchronizer, Update};
