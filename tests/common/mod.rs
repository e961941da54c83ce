//! Shared setup for end-to-end download tests
//!
//! Wires a real `HttpTransferService` and `AppStorageResolver` into a
//! `DownloadSession`, with an httpmock server standing in for the origin.

#![allow(dead_code)]

use bgdl_events::{EventReceiver, SessionEvent};
use bgdl_host::AppStorageResolver;
use bgdl_net::{HttpTransferService, NetClient, NetConfig, RetryConfig, TransferConfig};
use bgdl_session::{DownloadSession, SessionBuilder};
use httpmock::MockServer;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Test environment for end-to-end downloads
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub server: MockServer,
    pub service: Arc<HttpTransferService>,
    pub session: Arc<DownloadSession>,
    pub events: EventReceiver,
}

pub fn http_service() -> HttpTransferService {
    let client = NetClient::new(NetConfig {
        retry: RetryConfig {
            max_retries: 0,
            ..RetryConfig::default()
        },
        ..NetConfig::default()
    })
    .unwrap();
    HttpTransferService::new(
        client,
        TransferConfig {
            chunk_timeout: Duration::from_secs(5),
            progress_interval: Duration::ZERO,
        },
    )
}

impl TestEnvironment {
    pub async fn new() -> Self {
        let temp_dir = tempfile::tempdir().unwrap();
        let server = MockServer::start_async().await;
        let service = Arc::new(http_service());
        let (session, events) = Self::session_for(&service, &temp_dir).await;

        Self {
            temp_dir,
            server,
            service,
            session: Arc::new(session),
            events,
        }
    }

    /// Another session over the same host service, as after an app restart
    pub async fn restart(&self) -> (DownloadSession, EventReceiver) {
        Self::session_for(&self.service, &self.temp_dir).await
    }

    async fn session_for(
        service: &Arc<HttpTransferService>,
        temp_dir: &TempDir,
    ) -> (DownloadSession, EventReceiver) {
        let (tx, rx) = bgdl_events::channel();
        let session = SessionBuilder::new(
            service.clone(),
            Arc::new(AppStorageResolver::new(temp_dir.path())),
        )
        .event_sender(tx)
        .build()
        .await
        .unwrap();
        (session, rx)
    }

    pub fn destination(name: &str) -> String {
        format!("app-data:///downloads/{name}")
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join("downloads").join(name)
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}
