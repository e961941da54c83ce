//! In-memory registry of active transfers keyed by source URI

use bgdl_errors::Error;
use bgdl_host::{SharedOperation, TransferId};
use dashmap::DashMap;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// How a handle came to be tracked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOrigin {
    /// Created and started by this session
    Created,
    /// Found running during `start` and reattached
    Reattached,
    /// Picked up by startup enumeration
    Reconciled,
}

/// Reference to one active transfer
#[derive(Clone)]
pub struct TransferHandle {
    operation: SharedOperation,
    origin: HandleOrigin,
}

impl TransferHandle {
    #[must_use]
    pub fn new(operation: SharedOperation, origin: HandleOrigin) -> Self {
        Self { operation, origin }
    }

    #[must_use]
    pub fn id(&self) -> TransferId {
        self.operation.id()
    }

    /// Source URI the host recorded for the transfer
    #[must_use]
    pub fn requested_uri(&self) -> &str {
        self.operation.requested_uri()
    }

    #[must_use]
    pub fn destination(&self) -> &Path {
        self.operation.destination()
    }

    #[must_use]
    pub fn origin(&self) -> HandleOrigin {
        self.origin
    }

    #[must_use]
    pub fn operation(&self) -> &SharedOperation {
        &self.operation
    }

    /// Invoke the transfer's cancellation capability
    ///
    /// # Errors
    ///
    /// Returns whatever error the host reports for the cancel request.
    pub fn cancel(&self) -> Result<(), Error> {
        self.operation.cancel()
    }
}

impl fmt::Debug for TransferHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferHandle")
            .field("id", &self.id())
            .field("uri", &self.requested_uri())
            .field("origin", &self.origin)
            .finish()
    }
}

/// Map from source URI to the transfer currently tracked for it
///
/// Holds at most one handle per URI. Every mutation of a URI's entry made
/// by the session happens while that URI's gate is held (see
/// [`TransferRegistry::lock_uri`]).
#[derive(Default)]
pub struct TransferRegistry {
    entries: Mutex<HashMap<String, TransferHandle>>,
    gates: DashMap<String, Arc<AsyncMutex<()>>>,
}

impl TransferRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, TransferHandle>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Serialize work on `uri`; the gate is released when the guard drops
    pub async fn lock_uri(&self, uri: &str) -> OwnedMutexGuard<()> {
        let gate = Arc::clone(self.gates.entry(uri.to_string()).or_default().value());
        gate.lock_owned().await
    }

    /// Drop gates nobody holds or waits on
    pub fn prune_gates(&self) {
        self.gates.retain(|_, gate| Arc::strong_count(gate) > 1);
    }

    /// Store `handle` under `uri`, returning the handle it replaced
    pub fn register(&self, uri: impl Into<String>, handle: TransferHandle) -> Option<TransferHandle> {
        self.entries().insert(uri.into(), handle)
    }

    #[must_use]
    pub fn get(&self, uri: &str) -> Option<TransferHandle> {
        self.entries().get(uri).cloned()
    }

    #[must_use]
    pub fn contains(&self, uri: &str) -> bool {
        self.entries().contains_key(uri)
    }

    /// Remove and return the entry for `uri`
    pub fn take(&self, uri: &str) -> Option<TransferHandle> {
        self.entries().remove(uri)
    }

    /// Remove the entry for `uri` only if it still refers to transfer `id`
    pub fn release(&self, uri: &str, id: TransferId) -> bool {
        let mut entries = self.entries();
        if entries.get(uri).is_some_and(|handle| handle.id() == id) {
            entries.remove(uri);
            true
        } else {
            false
        }
    }

    /// Remove every entry
    pub fn drain(&self) -> Vec<(String, TransferHandle)> {
        self.entries().drain().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Tracked URIs in sorted order
    #[must_use]
    pub fn uris(&self) -> Vec<String> {
        let mut uris: Vec<String> = self.entries().keys().cloned().collect();
        uris.sort();
        uris
    }
}

impl fmt::Debug for TransferRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferRegistry")
            .field("entries", &self.uris())
            .finish_non_exhaustive()
    }
}
