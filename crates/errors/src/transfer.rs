//! Transfer session error types
//!
//! One variant per boundary of the start/stop operations: every failure
//! observed by a caller maps onto exactly one of these.

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransferError {
    #[error("cannot resolve destination {uri}: {reason}")]
    DestinationResolution { uri: String, reason: String },

    #[error("failed to enumerate current transfers: {message}")]
    Enumeration { message: String },

    #[error("failed to create transfer for {uri}: {message}")]
    TransferCreation { uri: String, message: String },

    #[error("failed to start transfer for {uri}: {message}")]
    TransferStart { uri: String, message: String },

    #[error("transfer of {uri} failed: {message}")]
    TransferFailure {
        uri: String,
        status: Option<u16>,
        message: String,
    },

    #[error("transfer of {uri} was cancelled")]
    Cancelled { uri: String },

    #[error("failed to cancel transfer for {uri}: {message}")]
    Cancellation { uri: String, message: String },

    #[error("invalid source URI {uri}: {message}")]
    InvalidUri { uri: String, message: String },

    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },
}

impl TransferError {
    /// Source URI the error relates to, when there is one
    #[must_use]
    pub fn uri(&self) -> Option<&str> {
        match self {
            Self::DestinationResolution { uri, .. }
            | Self::TransferCreation { uri, .. }
            | Self::TransferStart { uri, .. }
            | Self::TransferFailure { uri, .. }
            | Self::Cancelled { uri }
            | Self::Cancellation { uri, .. }
            | Self::InvalidUri { uri, .. } => Some(uri),
            Self::Enumeration { .. } | Self::InvalidArguments { .. } => None,
        }
    }
}

impl UserFacingError for TransferError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::DestinationResolution { .. } => Some(
                "Use a file:/// or app-data:/// destination inside a writable directory.",
            ),
            Self::InvalidUri { .. } => Some("Pass an absolute http:// or https:// source URI."),
            Self::InvalidArguments { .. } => {
                Some("Check the positional arguments passed to the bridge.")
            }
            Self::TransferFailure {
                status: Some(status),
                ..
            } if *status >= 500 => Some("The server reported an error; try again later."),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Self::Enumeration { .. } | Self::TransferStart { .. } | Self::Cancelled { .. } => true,
            Self::TransferFailure { status, .. } => status.is_none_or(|s| s >= 500 || s == 429),
            _ => false,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::DestinationResolution { .. } => "transfer.destination_resolution",
            Self::Enumeration { .. } => "transfer.enumeration",
            Self::TransferCreation { .. } => "transfer.creation",
            Self::TransferStart { .. } => "transfer.start",
            Self::TransferFailure { .. } => "transfer.failure",
            Self::Cancelled { .. } => "transfer.cancelled",
            Self::Cancellation { .. } => "transfer.cancellation",
            Self::InvalidUri { .. } => "transfer.invalid_uri",
            Self::InvalidArguments { .. } => "transfer.invalid_arguments",
        };
        Some(code)
    }
}
