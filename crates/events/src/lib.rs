#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for transaction progress reporting
//!
//! Every observable effect of a transaction is an event on an unbounded
//! channel. Events carry an [`EventMeta`] envelope so consumers can
//! correlate them with the transaction that produced them.
//!
//! ## Architecture
//!
//! - **Single event enum**: [`TransactionEvent`] covers status, progress,
//!   package results, trust prompts, errors and the terminal `finished`
//! - **Unified `EventEmitter` trait**: one API for raw senders and
//!   per-transaction emitters
//! - **Stream guarantees**: [`TransactionEmitter`] enforces a single
//!   `finished`, package de-duplication and monotonic percentages

pub mod emitter;
pub mod event;
pub mod meta;
pub mod progress;

pub use emitter::{EventEmitter, TransactionEmitter};
pub use event::{EventMessage, ExitKind, TransactionEvent};
pub use meta::{EventLevel, EventMeta, EventSource};
pub use progress::{ProgressState, ProgressUpdate};

use tokio::sync::mpsc::UnboundedSender;

/// Type alias for the event sender
pub type EventSender = UnboundedSender<EventMessage>;

/// Type alias for the event receiver
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<EventMessage>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}
