//! Transfer creation and enumeration

use async_trait::async_trait;
use bgdl_errors::Error;

use crate::destination::DestinationFile;
use crate::operation::SharedOperation;

pub const USER_AGENT_HEADER: &str = "user-agent";

/// Everything the host needs to create a new transfer
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub source_uri: String,
    pub destination: DestinationFile,
    headers: Vec<(String, String)>,
}

impl TransferRequest {
    #[must_use]
    pub fn new(source_uri: impl Into<String>, destination: DestinationFile) -> Self {
        Self {
            source_uri: source_uri.into(),
            destination,
            headers: Vec::new(),
        }
    }

    /// Set a request header, replacing any existing value for the same
    /// name (compared case-insensitively)
    pub fn set_request_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(slot) => slot.1 = value,
            None => self.headers.push((name, value)),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_request_header(name, value);
        self
    }

    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn user_agent(&self) -> Option<&str> {
        self.header(USER_AGENT_HEADER)
    }
}

/// The host's background-transfer subsystem
#[async_trait]
pub trait TransferService: Send + Sync {
    /// All transfers the host currently knows about that have not reached a
    /// terminal state
    async fn current_transfers(&self) -> Result<Vec<SharedOperation>, Error>;

    /// Create (but do not start) a transfer
    async fn create_transfer(&self, request: TransferRequest) -> Result<SharedOperation, Error>;
}
