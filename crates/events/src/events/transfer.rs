use std::collections::BTreeMap;

use bgdl_errors::Error;
use serde::{Deserialize, Serialize};

/// Bytes received so far for one transfer.
///
/// `total_bytes_to_receive` is `None` while the size is unknown (no
/// content-length, or the response has not arrived yet).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub bytes_received: u64,
    pub total_bytes_to_receive: Option<u64>,
}

impl ProgressSnapshot {
    #[must_use]
    pub fn new(bytes_received: u64, total_bytes_to_receive: Option<u64>) -> Self {
        Self {
            bytes_received,
            total_bytes_to_receive,
        }
    }

    /// Completed fraction in `0.0..=1.0`, when the total is known and non-zero
    #[must_use]
    pub fn fraction(&self) -> Option<f64> {
        match self.total_bytes_to_receive {
            Some(total) if total > 0 => {
                #[allow(clippy::cast_precision_loss)]
                let fraction = self.bytes_received as f64 / total as f64;
                Some(fraction.min(1.0))
            }
            _ => None,
        }
    }
}

/// Diagnostic information the host exposes about a transfer's response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Final URI after redirects
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_uri: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

/// One element of a transfer's event sequence
#[derive(Debug, Clone)]
pub enum TransferEvent {
    /// Non-terminal progress update; more events follow
    Progress(ProgressSnapshot),

    /// Terminal: the file is complete at its destination
    Completed,

    /// Terminal: the transfer ended abnormally
    Failed {
        error: Error,
        response: Option<ResponseInfo>,
    },
}

impl TransferEvent {
    /// Whether no further events follow this one
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress(_))
    }

    #[must_use]
    pub fn progress(&self) -> Option<&ProgressSnapshot> {
        match self {
            Self::Progress(snapshot) => Some(snapshot),
            _ => None,
        }
    }
}
