#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network transfers for bgdl
//!
//! This crate provides the HTTP implementation of the host transfer
//! subsystem: a pooled client with retry logic and background transfers
//! that stream to disk while publishing progress.

mod client;
mod service;
mod transfer;

pub use client::{NetClient, NetConfig};
pub use service::HttpTransferService;
pub use transfer::{calculate_backoff_delay, HttpTransfer, RetryConfig, TransferConfig};

use bgdl_errors::Error;
use url::Url;

/// Parse and validate a source URL
///
/// # Errors
///
/// Returns an error if the URL is malformed or does not use http or https.
pub fn parse_source_url(url: &str) -> Result<Url, Error> {
    transfer::validate_url(url)
}
