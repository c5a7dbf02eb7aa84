//! HTTP chunk receiver.
//!
//! Accepts one chunk per `POST /upload` request and appends it to the
//! output file named by the `file-name` header. Appends to a given name
//! are serialized, so interleaved requests cannot corrupt the file.
//! Everything else (the entry page, client script) is plain static file
//! serving.

mod app;
mod server;

pub use app::{AppState, router};
pub use server::{Receiver, ReceiverConfig};

/// Errors produced by the receiver.
#[derive(Debug, thiserror::Error)]
pub enum ReceiverError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
