#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for bgdl
//!
//! Two families of events live here:
//!
//! - **Transfer events** (`TransferEvent`): the typed, per-transfer sequence a
//!   caller consumes after `start`. Zero or more `Progress` values followed by
//!   exactly one terminal `Completed` or `Failed`.
//! - **Session events** (`SessionEvent`): diagnostics about what the session
//!   adapter did (created, reattached, reconciled, cancelled), delivered over an
//!   unbounded channel and mapped onto tracing levels by the CLI.

pub mod events;
pub use events::{FailureContext, ProgressSnapshot, ResponseInfo, SessionEvent, TransferEvent};

use tokio::sync::mpsc::UnboundedSender;

/// Type alias for the session event sender
pub type EventSender = UnboundedSender<SessionEvent>;

/// Type alias for the session event receiver
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<SessionEvent>;

/// Create a new session event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting session events
///
/// Implemented for the raw `EventSender` and for any struct that carries an
/// optional sender, so emission sites never need to check for a listener.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event through this emitter
    fn emit(&self, event: SessionEvent) {
        if let Some(sender) = self.event_sender() {
            // Ignore send errors - if receiver is dropped, we just continue
            let _ = sender.send(event);
        }
    }

    /// Emit a transfer failure for `uri`
    fn emit_transfer_failed(&self, uri: impl Into<String>, error: &bgdl_errors::Error) {
        self.emit(SessionEvent::TransferFailed {
            uri: uri.into(),
            failure: FailureContext::from_error(error),
        });
    }
}

/// Implementation of `EventEmitter` for the raw `EventSender`
impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}

impl EventEmitter for Option<EventSender> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.as_ref()
    }
}
