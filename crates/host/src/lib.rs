#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Host background-transfer subsystem surface
//!
//! The session adapter never talks to a concrete downloader. It reaches the
//! host through three seams defined here:
//!
//! - [`DestinationResolver`]: turns a destination URI into a writable file
//! - [`TransferService`]: enumerates live transfers and creates new ones
//! - [`TransferOperation`]: one transfer, observable through a status channel
//!
//! `bgdl-net` provides the HTTP implementation; tests plug in fakes.

pub mod destination;
pub mod operation;
pub mod service;

pub use destination::{AppStorageResolver, DestinationFile, DestinationResolver, APP_DATA_SCHEME};
pub use operation::{
    SharedOperation, StatusReceiver, TransferId, TransferOperation, TransferState, TransferStatus,
};
pub use service::{TransferRequest, TransferService, USER_AGENT_HEADER};
