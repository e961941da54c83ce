//! Typed per-transfer event stream

use bgdl_errors::{Error, TransferError};
use bgdl_events::{ProgressSnapshot, ResponseInfo, TransferEvent};
use bgdl_host::{SharedOperation, StatusReceiver, TransferState, TransferStatus};
use futures::stream::{self, BoxStream};
use futures::{Stream, StreamExt};
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Called once with the terminal event and the last progress seen
pub(crate) type TerminalHook = Box<dyn FnOnce(&TransferEvent, Option<ProgressSnapshot>) + Send>;

/// Events of one transfer: zero or more `Progress`, then exactly one
/// `Completed` or `Failed`, then the end of the stream
pub struct TransferStream {
    inner: BoxStream<'static, TransferEvent>,
}

impl TransferStream {
    /// A stream holding a single failure
    #[must_use]
    pub fn failed(error: Error) -> Self {
        Self {
            inner: stream::once(async move {
                TransferEvent::Failed {
                    error,
                    response: None,
                }
            })
            .boxed(),
        }
    }

    /// Follow `receiver` until the transfer reaches a terminal state
    pub(crate) fn watch(
        uri: String,
        operation: SharedOperation,
        receiver: StatusReceiver,
        on_terminal: TerminalHook,
    ) -> Self {
        let watcher = Watcher {
            uri,
            operation,
            receiver,
            first_read: true,
            last: None,
            pending_terminal: None,
            on_terminal: Some(on_terminal),
            done: false,
        };

        Self {
            inner: stream::unfold(watcher, |mut watcher| async move {
                let event = watcher.next_event().await?;
                Some((event, watcher))
            })
            .boxed(),
        }
    }

    /// Wait for the next event
    pub async fn next_event(&mut self) -> Option<TransferEvent> {
        self.next().await
    }

    /// Drive the stream to its end, passing every event to `handler`
    ///
    /// # Errors
    ///
    /// Returns the error carried by a terminal `Failed` event.
    pub async fn for_each_event<F>(mut self, mut handler: F) -> Result<(), Error>
    where
        F: FnMut(&TransferEvent),
    {
        let mut outcome = Err(Error::internal("transfer stream ended without a terminal event"));
        while let Some(event) = self.next().await {
            handler(&event);
            match event {
                TransferEvent::Progress(_) => {}
                TransferEvent::Completed => outcome = Ok(()),
                TransferEvent::Failed { error, .. } => outcome = Err(error),
            }
        }
        outcome
    }

    /// Drive the stream to its end, discarding progress
    ///
    /// # Errors
    ///
    /// Returns the error carried by a terminal `Failed` event.
    pub async fn finish(self) -> Result<(), Error> {
        self.for_each_event(|_| {}).await
    }
}

impl Stream for TransferStream {
    type Item = TransferEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl fmt::Debug for TransferStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferStream").finish_non_exhaustive()
    }
}

struct Watcher {
    uri: String,
    operation: SharedOperation,
    receiver: StatusReceiver,
    first_read: bool,
    last: Option<ProgressSnapshot>,
    pending_terminal: Option<TransferEvent>,
    on_terminal: Option<TerminalHook>,
    done: bool,
}

impl Watcher {
    async fn next_event(&mut self) -> Option<TransferEvent> {
        if let Some(event) = self.pending_terminal.take() {
            return Some(self.terminate(event));
        }
        if self.done {
            return None;
        }

        loop {
            let status = self.next_status().await;
            match status.state {
                TransferState::Pending => {}
                TransferState::Running => {
                    if self.accept(status.progress) {
                        return Some(TransferEvent::Progress(status.progress));
                    }
                }
                state => {
                    let event = self.terminal_event(state);
                    // A final snapshot coalesced into the terminal update is
                    // still delivered ahead of it
                    if self.advances(status.progress) {
                        self.last = Some(status.progress);
                        self.pending_terminal = Some(event);
                        self.done = true;
                        return Some(TransferEvent::Progress(status.progress));
                    }
                    return Some(self.terminate(event));
                }
            }
        }
    }

    async fn next_status(&mut self) -> TransferStatus {
        if self.first_read {
            self.first_read = false;
            return self.receiver.borrow_and_update().clone();
        }

        if self.receiver.changed().await.is_ok() {
            return self.receiver.borrow_and_update().clone();
        }

        // Sender gone; its last value is final
        let last = self.receiver.borrow().clone();
        if last.is_terminal() {
            return last;
        }
        TransferStatus {
            progress: last.progress,
            state: TransferState::Failed {
                error: TransferError::TransferFailure {
                    uri: self.uri.clone(),
                    status: None,
                    message: "transfer ended without a terminal status".to_string(),
                }
                .into(),
                response: None,
            },
        }
    }

    /// Record `progress` if it may be yielded
    fn accept(&mut self, progress: ProgressSnapshot) -> bool {
        if let Some(last) = self.last {
            if progress.bytes_received < last.bytes_received || progress == last {
                return false;
            }
        }
        self.last = Some(progress);
        true
    }

    fn advances(&self, progress: ProgressSnapshot) -> bool {
        match self.last {
            Some(last) => progress.bytes_received > last.bytes_received,
            None => progress.bytes_received > 0,
        }
    }

    fn terminal_event(&self, state: TransferState) -> TransferEvent {
        match state {
            TransferState::Completed => TransferEvent::Completed,
            TransferState::Failed { error, response } => {
                let response = response.or_else(|| self.operation.response_information());
                TransferEvent::Failed {
                    error: classify_failure(&self.uri, error, response.as_ref()),
                    response,
                }
            }
            TransferState::Cancelled | TransferState::Pending | TransferState::Running => {
                TransferEvent::Failed {
                    error: TransferError::Cancelled {
                        uri: self.uri.clone(),
                    }
                    .into(),
                    response: self.operation.response_information(),
                }
            }
        }
    }

    fn terminate(&mut self, event: TransferEvent) -> TransferEvent {
        self.done = true;
        if let Some(hook) = self.on_terminal.take() {
            hook(&event, self.last);
        }
        event
    }
}

fn classify_failure(uri: &str, error: Error, response: Option<&ResponseInfo>) -> Error {
    if matches!(error, Error::Transfer(_)) {
        return error;
    }
    let status = error.http_status().or_else(|| {
        response
            .and_then(|r| r.status_code)
            .filter(|status| *status >= 400)
    });
    TransferError::TransferFailure {
        uri: uri.to_string(),
        status,
        message: error.to_string(),
    }
    .into()
}
