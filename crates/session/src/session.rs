//! The download session adapter

use bgdl_errors::{Error, TransferError};
use bgdl_events::{EventEmitter, EventSender, SessionEvent, TransferEvent};
use bgdl_host::{
    DestinationResolver, SharedOperation, StatusReceiver, TransferRequest, TransferService,
    TransferStatus, USER_AGENT_HEADER,
};
use std::fmt;
use std::sync::Arc;
use url::Url;

use crate::matcher::UriMatcher;
use crate::registry::{HandleOrigin, TransferHandle, TransferRegistry};
use crate::stream::TransferStream;

/// Arguments of [`DownloadSession::start`]
#[derive(Debug, Clone, Default)]
pub struct StartRequest {
    pub source_uri: String,
    pub destination_uri: String,
    /// Applied as the `user-agent` header of a newly created transfer
    pub user_agent: Option<String>,
    /// Extra request headers for a newly created transfer
    pub headers: Vec<(String, String)>,
    /// Overrides the session's matcher for this call
    pub uri_matcher: Option<UriMatcher>,
}

impl StartRequest {
    #[must_use]
    pub fn new(source_uri: impl Into<String>, destination_uri: impl Into<String>) -> Self {
        Self {
            source_uri: source_uri.into(),
            destination_uri: destination_uri.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_uri_matcher(mut self, matcher: UriMatcher) -> Self {
        self.uri_matcher = Some(matcher);
        self
    }
}

/// Builder for [`DownloadSession`]
pub struct SessionBuilder {
    service: Arc<dyn TransferService>,
    resolver: Arc<dyn DestinationResolver>,
    registry: Option<Arc<TransferRegistry>>,
    event_sender: Option<EventSender>,
    uri_matcher: UriMatcher,
}

impl SessionBuilder {
    #[must_use]
    pub fn new(service: Arc<dyn TransferService>, resolver: Arc<dyn DestinationResolver>) -> Self {
        Self {
            service,
            resolver,
            registry: None,
            event_sender: None,
            uri_matcher: UriMatcher::Exact,
        }
    }

    /// Use an existing registry instead of a fresh one
    #[must_use]
    pub fn registry(mut self, registry: Arc<TransferRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    #[must_use]
    pub fn event_sender(mut self, sender: EventSender) -> Self {
        self.event_sender = Some(sender);
        self
    }

    /// Default matcher for calls that do not supply their own
    #[must_use]
    pub fn uri_matcher(mut self, matcher: UriMatcher) -> Self {
        self.uri_matcher = matcher;
        self
    }

    /// Build the session and reconcile it with the host's live transfers
    ///
    /// # Errors
    ///
    /// Returns `Enumeration` if the host cannot list its transfers.
    pub async fn build(self) -> Result<DownloadSession, Error> {
        let session = DownloadSession {
            service: self.service,
            resolver: self.resolver,
            registry: self.registry.unwrap_or_default(),
            uri_matcher: self.uri_matcher,
            event_sender: self.event_sender,
        };
        session.reconcile().await?;
        Ok(session)
    }
}

/// Starts, resumes and stops background downloads keyed by source URI
pub struct DownloadSession {
    service: Arc<dyn TransferService>,
    resolver: Arc<dyn DestinationResolver>,
    registry: Arc<TransferRegistry>,
    uri_matcher: UriMatcher,
    event_sender: Option<EventSender>,
}

impl EventEmitter for DownloadSession {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

impl fmt::Debug for DownloadSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadSession")
            .field("registry", &self.registry)
            .field("uri_matcher", &self.uri_matcher)
            .finish_non_exhaustive()
    }
}

impl DownloadSession {
    #[must_use]
    pub fn builder(
        service: Arc<dyn TransferService>,
        resolver: Arc<dyn DestinationResolver>,
    ) -> SessionBuilder {
        SessionBuilder::new(service, resolver)
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<TransferRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn is_tracked(&self, source_uri: &str) -> bool {
        self.registry.contains(source_uri)
    }

    #[must_use]
    pub fn tracked_uris(&self) -> Vec<String> {
        self.registry.uris()
    }

    /// Start or resume the download of `request.source_uri`
    ///
    /// Setup failures never escape as errors; they arrive as the single
    /// `Failed` event of the returned stream.
    pub async fn start(&self, request: StartRequest) -> TransferStream {
        let uri = request.source_uri.clone();

        let gate = self.registry.lock_uri(&uri).await;
        let outcome = self.begin(&request).await;
        drop(gate);
        self.registry.prune_gates();

        match outcome {
            Ok((handle, receiver)) => {
                // Dropping the stream undrained must not leave the entry behind
                self.release_when_terminal(uri.clone(), handle.clone(), receiver.clone());
                self.stream_for(uri, handle, receiver)
            }
            Err(error) => {
                tracing::warn!(uri = %uri, error = %error, "transfer could not be started");
                self.emit_transfer_failed(&uri, &error);
                TransferStream::failed(error)
            }
        }
    }

    async fn begin(
        &self,
        request: &StartRequest,
    ) -> Result<(TransferHandle, StatusReceiver), Error> {
        let uri = request.source_uri.as_str();

        Url::parse(uri).map_err(|e| TransferError::InvalidUri {
            uri: uri.to_string(),
            message: e.to_string(),
        })?;

        let destination = self.resolver.resolve(&request.destination_uri).await.map_err(|e| {
            classify(
                e,
                |t| matches!(t, TransferError::DestinationResolution { .. }),
                |reason| TransferError::DestinationResolution {
                    uri: request.destination_uri.clone(),
                    reason,
                },
            )
        })?;

        let current = self.enumerate().await?;
        let matcher = request.uri_matcher.as_ref().unwrap_or(&self.uri_matcher);
        let existing = current
            .into_iter()
            .find(|operation| matcher.matches(operation.requested_uri(), uri));

        let (handle, receiver) = if let Some(operation) = existing {
            let receiver = operation.attach().await.map_err(|e| start_error(uri, e))?;
            self.emit(SessionEvent::TransferReattached {
                uri: uri.to_string(),
                transfer_id: operation.id().to_string(),
            });
            tracing::info!(uri, id = %operation.id(), "reattached to running transfer");
            (TransferHandle::new(operation, HandleOrigin::Reattached), receiver)
        } else {
            let mut transfer = TransferRequest::new(uri, destination);
            for (name, value) in &request.headers {
                transfer.set_request_header(name.as_str(), value.as_str());
            }
            let user_agent = request.user_agent.as_deref().filter(|ua| !ua.is_empty());
            if let Some(user_agent) = user_agent {
                transfer.set_request_header(USER_AGENT_HEADER, user_agent);
            }

            let operation = self.service.create_transfer(transfer).await.map_err(|e| {
                classify(
                    e,
                    |t| matches!(t, TransferError::TransferCreation { .. }),
                    |message| TransferError::TransferCreation {
                        uri: uri.to_string(),
                        message,
                    },
                )
            })?;
            let receiver = operation.start().await.map_err(|e| start_error(uri, e))?;
            self.emit(SessionEvent::TransferCreated {
                uri: uri.to_string(),
                transfer_id: operation.id().to_string(),
                user_agent: user_agent.map(str::to_string),
            });
            tracing::info!(uri, id = %operation.id(), "created transfer");
            (TransferHandle::new(operation, HandleOrigin::Created), receiver)
        };

        let replaced = self.registry.register(uri, handle.clone());
        self.emit(SessionEvent::Registered {
            uri: uri.to_string(),
            replaced: replaced.is_some(),
        });

        Ok((handle, receiver))
    }

    fn stream_for(
        &self,
        uri: String,
        handle: TransferHandle,
        receiver: StatusReceiver,
    ) -> TransferStream {
        let registry = Arc::clone(&self.registry);
        let events = self.event_sender.clone();
        let id = handle.id();
        let hook_uri = uri.clone();

        TransferStream::watch(
            uri,
            Arc::clone(handle.operation()),
            receiver,
            Box::new(move |event, last| {
                registry.release(&hook_uri, id);
                match event {
                    TransferEvent::Completed => {
                        tracing::info!(uri = %hook_uri, "transfer completed");
                        events.emit(SessionEvent::TransferCompleted {
                            uri: hook_uri,
                            bytes_received: last.map_or(0, |p| p.bytes_received),
                        });
                    }
                    TransferEvent::Failed { error, .. } => {
                        tracing::warn!(uri = %hook_uri, error = %error, "transfer failed");
                        events.emit_transfer_failed(hook_uri, error);
                    }
                    TransferEvent::Progress(_) => {}
                }
            }),
        )
    }

    /// Cancel and forget the transfer tracked for `source_uri`
    ///
    /// Succeeds without side effects when nothing is tracked.
    ///
    /// # Errors
    ///
    /// Returns `Cancellation` if the host rejects the cancel request; the
    /// entry is kept in that case.
    pub async fn stop(&self, source_uri: &str) -> Result<(), Error> {
        let gate = self.registry.lock_uri(source_uri).await;
        let outcome = self.cancel_tracked(source_uri);
        drop(gate);
        self.registry.prune_gates();
        outcome
    }

    fn cancel_tracked(&self, source_uri: &str) -> Result<(), Error> {
        let Some(handle) = self.registry.get(source_uri) else {
            self.emit(SessionEvent::StopRequested {
                uri: source_uri.to_string(),
                tracked: false,
            });
            return Ok(());
        };

        handle.cancel().map_err(|e| {
            let error = classify(
                e,
                |t| matches!(t, TransferError::Cancellation { .. }),
                |message| TransferError::Cancellation {
                    uri: source_uri.to_string(),
                    message,
                },
            );
            tracing::warn!(uri = source_uri, error = %error, "cancel rejected");
            error
        })?;

        self.registry.take(source_uri);
        self.emit(SessionEvent::StopRequested {
            uri: source_uri.to_string(),
            tracked: true,
        });
        tracing::info!(uri = source_uri, id = %handle.id(), "transfer cancelled");
        Ok(())
    }

    /// Track every live host transfer that is not tracked yet
    ///
    /// Returns the number of newly registered transfers.
    ///
    /// # Errors
    ///
    /// Returns `Enumeration` if the host cannot list its transfers.
    pub async fn reconcile(&self) -> Result<usize, Error> {
        let current = self.enumerate().await?;
        let discovered = current.len();
        let mut registered = 0;

        for operation in current {
            let uri = operation.requested_uri().to_string();
            let gate = self.registry.lock_uri(&uri).await;
            if !self.registry.contains(&uri) {
                match operation.attach().await {
                    Ok(receiver) => {
                        let handle = TransferHandle::new(operation, HandleOrigin::Reconciled);
                        self.registry.register(uri.clone(), handle.clone());
                        self.release_when_terminal(uri, handle, receiver);
                        registered += 1;
                    }
                    Err(error) => {
                        tracing::warn!(uri = %uri, error = %error, "could not attach to live transfer");
                    }
                }
            }
            drop(gate);
        }
        self.registry.prune_gates();

        self.emit(SessionEvent::Reconciled {
            discovered,
            registered,
        });
        tracing::info!(discovered, registered, "reconciled with host transfers");
        Ok(registered)
    }

    /// Drop the entry for `handle` once its transfer finishes
    fn release_when_terminal(
        &self,
        uri: String,
        handle: TransferHandle,
        mut receiver: StatusReceiver,
    ) {
        let registry = Arc::clone(&self.registry);
        tokio::spawn(async move {
            // An error means the host dropped the transfer
            let _ = receiver.wait_for(TransferStatus::is_terminal).await;
            registry.release(&uri, handle.id());
        });
    }

    /// Forget every tracked transfer without cancelling it
    ///
    /// The transfers keep running in the host and are picked up again by the
    /// next session's reconciliation.
    pub fn shutdown(&self) -> Vec<TransferHandle> {
        let handles: Vec<TransferHandle> = self
            .registry
            .drain()
            .into_iter()
            .map(|(_, handle)| handle)
            .collect();
        self.emit(SessionEvent::Detached {
            count: handles.len(),
        });
        tracing::debug!(count = handles.len(), "detached tracked transfers");
        handles
    }

    async fn enumerate(&self) -> Result<Vec<SharedOperation>, Error> {
        self.service.current_transfers().await.map_err(|e| {
            classify(
                e,
                |t| matches!(t, TransferError::Enumeration { .. }),
                |message| TransferError::Enumeration { message },
            )
        })
    }
}

/// Keep `error` if it already has the expected kind, otherwise wrap its text
fn classify(
    error: Error,
    expected: impl Fn(&TransferError) -> bool,
    wrap: impl FnOnce(String) -> TransferError,
) -> Error {
    match error.as_transfer() {
        Some(transfer) if expected(transfer) => error,
        _ => wrap(error.to_string()).into(),
    }
}

fn start_error(uri: &str, error: Error) -> Error {
    classify(
        error,
        |t| matches!(t, TransferError::TransferStart { .. }),
        |message| TransferError::TransferStart {
            uri: uri.to_string(),
            message,
        },
    )
}
