//! A single transfer as exposed by the host subsystem

use async_trait::async_trait;
use bgdl_errors::Error;
use bgdl_events::{ProgressSnapshot, ResponseInfo};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

/// Host-assigned identity of a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransferId(Uuid);

impl TransferId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TransferId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle state of a transfer
#[derive(Debug, Clone)]
pub enum TransferState {
    /// Created but not started
    Pending,
    Running,
    Completed,
    Failed {
        error: Error,
        response: Option<ResponseInfo>,
    },
    /// Aborted through the cancellation capability
    Cancelled,
}

impl TransferState {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed { .. } | Self::Cancelled)
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed { .. } => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Latest published status of a transfer
#[derive(Debug, Clone)]
pub struct TransferStatus {
    pub progress: ProgressSnapshot,
    pub state: TransferState,
}

impl TransferStatus {
    #[must_use]
    pub fn pending() -> Self {
        Self {
            progress: ProgressSnapshot::default(),
            state: TransferState::Pending,
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}

/// Receiving side of a transfer's status channel
pub type StatusReceiver = watch::Receiver<TransferStatus>;

/// One transfer known to the host subsystem
///
/// `start` is valid once, on a freshly created transfer. `attach` resumes
/// observation of a transfer that is already running, including one started
/// by an earlier session.
#[async_trait]
pub trait TransferOperation: Send + Sync + fmt::Debug {
    fn id(&self) -> TransferId;

    /// Source URI exactly as it was requested
    fn requested_uri(&self) -> &str;

    fn destination(&self) -> &Path;

    fn status(&self) -> TransferStatus;

    fn response_information(&self) -> Option<ResponseInfo>;

    /// Begin transferring and return the status channel
    async fn start(&self) -> Result<StatusReceiver, Error>;

    /// Reattach to an already-running transfer
    async fn attach(&self) -> Result<StatusReceiver, Error>;

    /// Request cancellation; does not wait for the transfer to stop
    ///
    /// # Errors
    ///
    /// Returns an error if the host refuses the request.
    fn cancel(&self) -> Result<(), Error>;
}

pub type SharedOperation = Arc<dyn TransferOperation>;
