//! HTTP-backed transfer operations
//!
//! Each transfer runs on its own task once started and publishes its status
//! through a watch channel. The body is written beside the destination and
//! renamed into place only after the last chunk arrives.

mod config;
mod retry;
mod stream;
mod validation;

pub use config::{RetryConfig, TransferConfig};
pub use retry::calculate_backoff_delay;
pub(crate) use validation::validate_url;

use async_trait::async_trait;
use bgdl_errors::{Error, TransferError};
use bgdl_events::{ProgressSnapshot, ResponseInfo};
use bgdl_host::{
    StatusReceiver, TransferId, TransferOperation, TransferRequest, TransferState,
    TransferStatus,
};
use dashmap::DashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::fs as tokio_fs;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::client::NetClient;

pub(crate) type LiveTransfers = DashMap<TransferId, HttpTransfer>;

/// One download driven by [`NetClient`]
#[derive(Debug, Clone)]
pub struct HttpTransfer {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    id: TransferId,
    request: TransferRequest,
    client: NetClient,
    config: TransferConfig,
    status: watch::Sender<TransferStatus>,
    response: Mutex<Option<ResponseInfo>>,
    cancel: CancellationToken,
    started: AtomicBool,
    live: Weak<LiveTransfers>,
}

impl HttpTransfer {
    pub(crate) fn new(
        request: TransferRequest,
        client: NetClient,
        config: TransferConfig,
        live: Weak<LiveTransfers>,
    ) -> Self {
        let (status, _) = watch::channel(TransferStatus::pending());
        Self {
            inner: Arc::new(Inner {
                id: TransferId::new(),
                request,
                client,
                config,
                status,
                response: Mutex::new(None),
                cancel: CancellationToken::new(),
                started: AtomicBool::new(false),
                live,
            }),
        }
    }

    #[must_use]
    pub fn request(&self) -> &TransferRequest {
        &self.inner.request
    }

    /// Whether `start` has been called (or the transfer was cancelled first)
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.inner.started.load(Ordering::SeqCst)
    }

    /// Whether `cancel` was called; the task may still be winding down
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    /// Started, not cancelled and not yet terminal
    pub(crate) fn is_live(&self) -> bool {
        self.is_started() && !self.is_cancelled() && !self.status().is_terminal()
    }
}

#[async_trait]
impl TransferOperation for HttpTransfer {
    fn id(&self) -> TransferId {
        self.inner.id
    }

    fn requested_uri(&self) -> &str {
        &self.inner.request.source_uri
    }

    fn destination(&self) -> &Path {
        &self.inner.request.destination.path
    }

    fn status(&self) -> TransferStatus {
        self.inner.status.borrow().clone()
    }

    fn response_information(&self) -> Option<ResponseInfo> {
        self.inner.response_information()
    }

    async fn start(&self) -> Result<StatusReceiver, Error> {
        if self.inner.started.swap(true, Ordering::SeqCst) {
            return Err(TransferError::TransferStart {
                uri: self.inner.request.source_uri.clone(),
                message: "transfer was already started or cancelled".to_string(),
            }
            .into());
        }

        let receiver = self.inner.status.subscribe();
        let inner = Arc::clone(&self.inner);
        tokio::spawn(inner.run());

        tracing::debug!(
            target: "bgdl::net",
            id = %self.inner.id,
            uri = %self.inner.request.source_uri,
            "transfer started"
        );
        Ok(receiver)
    }

    async fn attach(&self) -> Result<StatusReceiver, Error> {
        if !self.is_started() {
            return Err(TransferError::TransferStart {
                uri: self.inner.request.source_uri.clone(),
                message: "transfer has not been started".to_string(),
            }
            .into());
        }
        Ok(self.inner.status.subscribe())
    }

    fn cancel(&self) -> Result<(), Error> {
        self.inner.cancel.cancel();

        // A transfer that never started has no task to observe the token
        if self
            .inner
            .started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            self.inner.finish(TransferState::Cancelled);
        }
        Ok(())
    }
}

impl Inner {
    fn response_information(&self) -> Option<ResponseInfo> {
        self.response
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record_response(&self, info: ResponseInfo) {
        *self.response.lock().unwrap_or_else(PoisonError::into_inner) = Some(info);
    }

    fn publish_progress(&self, progress: ProgressSnapshot) {
        self.status.send_modify(|status| {
            status.progress = progress;
            status.state = TransferState::Running;
        });
    }

    fn finish(&self, state: TransferState) {
        tracing::debug!(
            target: "bgdl::net",
            id = %self.id,
            uri = %self.request.source_uri,
            state = state.name(),
            "transfer finished"
        );
        // Leave the live map before observers see the terminal state
        if let Some(live) = self.live.upgrade() {
            live.remove(&self.id);
        }
        self.status.send_modify(|status| status.state = state);
    }

    async fn run(self: Arc<Self>) {
        let dest = self.request.destination.path.clone();
        let temp = stream::temp_path(&dest);

        let state = tokio::select! {
            biased;
            () = self.cancel.cancelled() => TransferState::Cancelled,
            result = self.download(&dest, &temp) => match result {
                Ok(()) => TransferState::Completed,
                Err(error) => TransferState::Failed {
                    error,
                    response: self.response_information(),
                },
            },
        };

        if !matches!(state, TransferState::Completed) {
            // Partial bodies are never left behind
            let _ = tokio_fs::remove_file(&temp).await;
        }
        self.finish(state);
    }

    async fn download(&self, dest: &Path, temp: &Path) -> Result<(), Error> {
        let uri = self.request.source_uri.as_str();
        let headers: Vec<(&str, &str)> = self
            .request
            .headers()
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();

        let response = self.client.get_with_headers(uri, &headers).await?;
        self.record_response(validation::response_info(&response));
        validation::validate_response(&response)?;

        self.publish_progress(ProgressSnapshot::new(0, response.content_length()));

        let received =
            stream::stream_to_file(response, temp, &self.config, uri, |progress| {
                self.publish_progress(progress);
            })
            .await?;

        tokio_fs::rename(temp, dest)
            .await
            .map_err(|e| Error::io_with_path(&e, dest))?;

        tracing::debug!(target: "bgdl::net", uri, bytes = received, "body written");
        Ok(())
    }
}
