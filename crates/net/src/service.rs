//! In-process transfer service backed by reqwest

use async_trait::async_trait;
use bgdl_config::Config;
use bgdl_errors::Error;
use bgdl_host::{SharedOperation, TransferOperation, TransferRequest, TransferService};
use std::sync::Arc;

use crate::client::{NetClient, NetConfig};
use crate::transfer::{validate_url, HttpTransfer, LiveTransfers, TransferConfig};

/// Creates and tracks HTTP transfers for the lifetime of the process
///
/// Transfers stay enumerable from creation until they reach a terminal
/// state; enumeration only reports those already started.
#[derive(Debug, Clone)]
pub struct HttpTransferService {
    client: NetClient,
    config: TransferConfig,
    live: Arc<LiveTransfers>,
}

impl HttpTransferService {
    #[must_use]
    pub fn new(client: NetClient, config: TransferConfig) -> Self {
        Self {
            client,
            config,
            live: Arc::new(LiveTransfers::new()),
        }
    }

    /// Build the client and transfer settings from loaded configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let client = NetClient::new(NetConfig::from_config(&config.network))?;
        Ok(Self::new(
            client,
            TransferConfig::from_config(&config.network),
        ))
    }

    /// Number of transfers that have not reached a terminal state
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

#[async_trait]
impl TransferService for HttpTransferService {
    async fn current_transfers(&self) -> Result<Vec<SharedOperation>, Error> {
        let transfers = self
            .live
            .iter()
            .filter(|entry| entry.value().is_live())
            .map(|entry| Arc::new(entry.value().clone()) as SharedOperation)
            .collect();
        Ok(transfers)
    }

    async fn create_transfer(&self, request: TransferRequest) -> Result<SharedOperation, Error> {
        validate_url(&request.source_uri)?;

        let transfer = HttpTransfer::new(
            request,
            self.client.clone(),
            self.config.clone(),
            Arc::downgrade(&self.live),
        );
        self.live.insert(transfer.id(), transfer.clone());

        tracing::debug!(
            target: "bgdl::net",
            id = %transfer.id(),
            uri = %transfer.requested_uri(),
            user_agent = ?transfer.request().user_agent(),
            "transfer created"
        );
        Ok(Arc::new(transfer))
    }
}
