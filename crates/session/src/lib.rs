#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Download session adapter
//!
//! Ties a host transfer service to a caller that thinks in source URIs:
//! `start` reattaches to a transfer already running for the URI or creates a
//! new one, and hands back a typed [`TransferStream`]; `stop` cancels whatever
//! is tracked for the URI. The [`bridge`] module exposes the same operations
//! through a positional-argument callback interface.

pub mod bridge;
mod matcher;
mod registry;
mod session;
mod stream;

pub use bridge::{Bridge, CallbackContext, StartArgs, ACTION_START, ACTION_STOP};
pub use matcher::UriMatcher;
pub use registry::{HandleOrigin, TransferHandle, TransferRegistry};
pub use session::{DownloadSession, SessionBuilder, StartRequest};
pub use stream::TransferStream;
