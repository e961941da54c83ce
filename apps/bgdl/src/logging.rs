//! Structured logging for session events
//!
//! Maps each `SessionEvent` onto a tracing record at the level the event
//! declares, with the event's fields flattened into structured fields.

use bgdl_events::SessionEvent;
use tracing::{debug, error, info, trace, warn, Level};

/// Log a session event using the tracing infrastructure
pub fn log_event_with_tracing(event: &SessionEvent) {
    let target = event.log_target();
    match event {
        SessionEvent::TransferCreated {
            uri,
            transfer_id,
            user_agent,
        } => {
            info!(
                log_target = target,
                uri = %uri,
                transfer_id = %transfer_id,
                user_agent = ?user_agent,
                "Transfer created"
            );
        }
        SessionEvent::TransferReattached { uri, transfer_id } => {
            info!(
                log_target = target,
                uri = %uri,
                transfer_id = %transfer_id,
                "Transfer reattached"
            );
        }
        SessionEvent::TransferCompleted {
            uri,
            bytes_received,
        } => {
            info!(
                log_target = target,
                uri = %uri,
                bytes_received,
                "Transfer completed"
            );
        }
        SessionEvent::TransferFailed { uri, failure } => {
            error!(
                log_target = target,
                uri = %uri,
                code = ?failure.code,
                retryable = failure.retryable,
                message = %failure.message,
                "Transfer failed"
            );
        }
        _ => match event.log_level() {
            Level::ERROR => error!(log_target = target, event = ?event, "Session event"),
            Level::WARN => warn!(log_target = target, event = ?event, "Session event"),
            Level::INFO => info!(log_target = target, event = ?event, "Session event"),
            Level::DEBUG => debug!(log_target = target, event = ?event, "Session event"),
            Level::TRACE => trace!(log_target = target, event = ?event, "Session event"),
        },
    }
}
