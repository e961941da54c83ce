//! Session event handling

use bgdl_events::SessionEvent;
use console::{Style, Term};

use crate::logging::log_event_with_tracing;

/// Logs every session event and surfaces the noteworthy ones to the user
pub struct EventHandler {
    colors_enabled: bool,
    quiet: bool,
    term: Term,
}

impl EventHandler {
    pub fn new(colors_enabled: bool, quiet: bool) -> Self {
        Self {
            colors_enabled,
            quiet,
            term: Term::stderr(),
        }
    }

    pub fn handle_event(&self, event: &SessionEvent) {
        log_event_with_tracing(event);
        if let Some(message) = Self::status_message(event) {
            self.show_status(&message);
        }
    }

    fn status_message(event: &SessionEvent) -> Option<String> {
        match event {
            SessionEvent::TransferReattached { uri, .. } => {
                Some(format!("Resuming running transfer for {uri}"))
            }
            SessionEvent::Reconciled { registered, .. } if *registered > 0 => Some(format!(
                "Found {registered} transfer(s) still running in the background"
            )),
            SessionEvent::StopRequested { uri, tracked: true } => {
                Some(format!("Cancelled {uri}"))
            }
            _ => None,
        }
    }

    fn show_status(&self, message: &str) {
        if self.quiet {
            return;
        }
        let style = if self.colors_enabled {
            Style::new().cyan()
        } else {
            Style::new()
        };
        let _ = self.term.write_line(&style.apply_to(message).to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_messages() {
        assert!(EventHandler::status_message(&SessionEvent::TransferReattached {
            uri: "https://example.com/f".into(),
            transfer_id: "id".into(),
        })
        .is_some());
        assert!(EventHandler::status_message(&SessionEvent::Reconciled {
            discovered: 0,
            registered: 0,
        })
        .is_none());
        assert!(EventHandler::status_message(&SessionEvent::StopRequested {
            uri: "https://example.com/f".into(),
            tracked: false,
        })
        .is_none());
    }
}
