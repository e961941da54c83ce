//! In-memory host transfer service for session tests

#![allow(dead_code)]

use async_trait::async_trait;
use bgdl_errors::Error;
use bgdl_events::{ProgressSnapshot, ResponseInfo};
use bgdl_host::*;
use bgdl_session::{DownloadSession, SessionBuilder};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::sync::watch;

#[derive(Debug)]
pub struct FakeTransfer {
    id: TransferId,
    request: TransferRequest,
    status: watch::Sender<TransferStatus>,
    response: Mutex<Option<ResponseInfo>>,
    started: AtomicBool,
    pub start_calls: AtomicUsize,
    pub attach_calls: AtomicUsize,
    pub cancel_calls: AtomicUsize,
    cancel_error: Mutex<Option<Error>>,
}

impl FakeTransfer {
    fn new(request: TransferRequest) -> Self {
        let (status, _) = watch::channel(TransferStatus::pending());
        Self {
            id: TransferId::new(),
            request,
            status,
            response: Mutex::new(None),
            started: AtomicBool::new(false),
            start_calls: AtomicUsize::new(0),
            attach_calls: AtomicUsize::new(0),
            cancel_calls: AtomicUsize::new(0),
            cancel_error: Mutex::new(None),
        }
    }

    pub fn request(&self) -> &TransferRequest {
        &self.request
    }

    fn mark_running(&self) {
        self.started.store(true, Ordering::SeqCst);
        self.status.send_modify(|s| s.state = TransferState::Running);
    }

    pub fn progress(&self, bytes_received: u64, total: Option<u64>) {
        self.status.send_modify(|s| {
            s.progress = ProgressSnapshot::new(bytes_received, total);
            s.state = TransferState::Running;
        });
    }

    pub fn complete(&self) {
        self.status.send_modify(|s| s.state = TransferState::Completed);
    }

    pub fn fail(&self, error: Error, response: Option<ResponseInfo>) {
        *self.response.lock().unwrap() = response.clone();
        self.status
            .send_modify(|s| s.state = TransferState::Failed { error, response });
    }

    pub fn reject_cancel(&self, error: Error) {
        *self.cancel_error.lock().unwrap() = Some(error);
    }

    pub fn cancels(&self) -> usize {
        self.cancel_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransferOperation for FakeTransfer {
    fn id(&self) -> TransferId {
        self.id
    }

    fn requested_uri(&self) -> &str {
        &self.request.source_uri
    }

    fn destination(&self) -> &Path {
        &self.request.destination.path
    }

    fn status(&self) -> TransferStatus {
        self.status.borrow().clone()
    }

    fn response_information(&self) -> Option<ResponseInfo> {
        self.response.lock().unwrap().clone()
    }

    async fn start(&self) -> Result<StatusReceiver, Error> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        let receiver = self.status.subscribe();
        self.mark_running();
        Ok(receiver)
    }

    async fn attach(&self) -> Result<StatusReceiver, Error> {
        self.attach_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.status.subscribe())
    }

    fn cancel(&self) -> Result<(), Error> {
        self.cancel_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.cancel_error.lock().unwrap().clone() {
            return Err(error);
        }
        self.status.send_modify(|s| s.state = TransferState::Cancelled);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FakeService {
    transfers: Mutex<Vec<Arc<FakeTransfer>>>,
    created: Mutex<Vec<TransferRequest>>,
    enumerations: AtomicUsize,
    enumeration_error: Mutex<Option<Error>>,
    creation_error: Mutex<Option<Error>>,
}

impl FakeService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A transfer left running by an earlier session
    pub fn seed_running(&self, uri: &str) -> Arc<FakeTransfer> {
        let destination = DestinationFile::new("app-data:///seeded.bin", "/tmp/seeded.bin");
        let transfer = Arc::new(FakeTransfer::new(TransferRequest::new(uri, destination)));
        transfer.mark_running();
        self.transfers.lock().unwrap().push(Arc::clone(&transfer));
        transfer
    }

    pub fn created(&self) -> Vec<TransferRequest> {
        self.created.lock().unwrap().clone()
    }

    pub fn enumerations(&self) -> usize {
        self.enumerations.load(Ordering::SeqCst)
    }

    /// Most recently created or seeded transfer for `uri`
    pub fn transfer(&self, uri: &str) -> Arc<FakeTransfer> {
        self.transfers
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|t| t.requested_uri() == uri)
            .cloned()
            .expect("no transfer for uri")
    }

    pub fn fail_enumeration(&self, error: Error) {
        *self.enumeration_error.lock().unwrap() = Some(error);
    }

    pub fn fail_creation(&self, error: Error) {
        *self.creation_error.lock().unwrap() = Some(error);
    }
}

#[async_trait]
impl TransferService for FakeService {
    async fn current_transfers(&self) -> Result<Vec<SharedOperation>, Error> {
        self.enumerations.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.enumeration_error.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(self
            .transfers
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.started.load(Ordering::SeqCst) && !t.status().is_terminal())
            .map(|t| Arc::clone(t) as SharedOperation)
            .collect())
    }

    async fn create_transfer(&self, request: TransferRequest) -> Result<SharedOperation, Error> {
        if let Some(error) = self.creation_error.lock().unwrap().clone() {
            return Err(error);
        }
        self.created.lock().unwrap().push(request.clone());
        let transfer = Arc::new(FakeTransfer::new(request));
        self.transfers.lock().unwrap().push(Arc::clone(&transfer));
        Ok(transfer)
    }
}

pub struct Harness {
    pub service: Arc<FakeService>,
    pub session: Arc<DownloadSession>,
    pub temp: TempDir,
}

impl Harness {
    pub fn destination(&self, name: &str) -> String {
        format!("app-data:///{name}")
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.temp.path().join(name)
    }
}

pub async fn harness_with(service: Arc<FakeService>) -> Harness {
    let temp = tempfile::tempdir().unwrap();
    let resolver = Arc::new(AppStorageResolver::new(temp.path()));
    let session = SessionBuilder::new(service.clone(), resolver)
        .build()
        .await
        .unwrap();
    Harness {
        service,
        session: Arc::new(session),
        temp,
    }
}

pub async fn harness() -> Harness {
    harness_with(FakeService::new()).await
}
