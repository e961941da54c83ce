use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Diagnostics emitted by the download session adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Startup enumeration registered transfers left running by the host
    Reconciled { discovered: usize, registered: usize },

    /// A new transfer was created and started
    TransferCreated {
        uri: String,
        transfer_id: String,
        user_agent: Option<String>,
    },

    /// An already-running transfer was found and reattached
    TransferReattached { uri: String, transfer_id: String },

    /// A handle was stored in the registry
    Registered { uri: String, replaced: bool },

    /// Terminal success observed on a transfer stream
    TransferCompleted { uri: String, bytes_received: u64 },

    /// Terminal failure, either synchronous (setup) or from the transfer itself
    TransferFailed { uri: String, failure: FailureContext },

    /// `stop` was called; `tracked` tells whether anything was cancelled
    StopRequested { uri: String, tracked: bool },

    /// Registry entries detached at teardown
    Detached { count: usize },
}

impl SessionEvent {
    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::TransferFailed { .. } => Level::ERROR,
            Self::Registered { replaced: true, .. } => Level::WARN,
            Self::Registered { .. } | Self::StopRequested { tracked: false, .. } => Level::DEBUG,
            _ => Level::INFO,
        }
    }

    /// Get the log target for this event (for structured logging)
    #[must_use]
    pub fn log_target(&self) -> &'static str {
        match self {
            Self::Reconciled { .. } | Self::Detached { .. } => "bgdl::events::session",
            Self::Registered { .. } => "bgdl::events::registry",
            _ => "bgdl::events::transfer",
        }
    }

    /// The source URI this event concerns, if any
    #[must_use]
    pub fn uri(&self) -> Option<&str> {
        match self {
            Self::TransferCreated { uri, .. }
            | Self::TransferReattached { uri, .. }
            | Self::Registered { uri, .. }
            | Self::TransferCompleted { uri, .. }
            | Self::TransferFailed { uri, .. }
            | Self::StopRequested { uri, .. } => Some(uri),
            Self::Reconciled { .. } | Self::Detached { .. } => None,
        }
    }
}
